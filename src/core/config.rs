//! Configuration of loggers from key-path sources
//!
//! Settings are addressed by dotted paths (`log.file.size`). A
//! [`ConfigSource`] resolves a path to a value; [`TomlConfig`] reads a TOML
//! document and [`MapConfig`] holds values set in code.
//!
//! ```toml
//! [log]
//! level = "debug"
//! time.format = "unixms"
//!
//! [log.file]
//! enable = true
//! directory = "/var/log/app"
//! name = "app.log"
//! size = 10            # megabytes
//! level = "warn"
//!
//! [log.file.retention]
//! age = 14             # days
//! backups = 10
//! ```

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::logger::{Logger, LoggerBuilder};
use super::output_format::OutputFormat;
use super::timestamp::TimestampFormat;
use crate::writers::{shared, LevelWriter, RotatingFile, RotationPolicy};
use crate::writers::rotating_file::{DEFAULT_MAX_AGE_DAYS, DEFAULT_MAX_BACKUPS, DEFAULT_MAX_SIZE_MB};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Minimum level of the logger
pub const LEVEL: &str = "log.level";
/// Timestamp layout name or strftime pattern
pub const TIME_FORMAT: &str = "log.time.format";
/// Root of the file output settings
pub const FILE: &str = "log.file";
pub const FILE_ENABLE: &str = "log.file.enable";
pub const FILE_DIRECTORY: &str = "log.file.directory";
pub const FILE_NAME: &str = "log.file.name";
/// Size of the active file in megabytes before rotation
pub const FILE_SIZE: &str = "log.file.size";
/// Days a rotated backup is kept
pub const FILE_RETENTION_AGE: &str = "log.file.retention.age";
/// Number of rotated backups kept
pub const FILE_RETENTION_BACKUPS: &str = "log.file.retention.backups";
/// Minimum level written to the file output
pub const FILE_LEVEL: &str = "log.file.level";
pub const FILE_COMPRESS: &str = "log.file.compress";
pub const FILE_LOCAL_TIME: &str = "log.file.localtime";

/// File name used when `log.file.name` is absent or blank
pub const DEFAULT_FILE_NAME: &str = "app.log";

/// Resolves dotted key paths to values.
pub trait ConfigSource {
    fn int(&self, path: &str) -> Option<i64>;
    fn string(&self, path: &str) -> Option<String>;
    fn bool(&self, path: &str) -> Option<bool>;
}

/// Configuration read from a TOML document.
#[derive(Debug, Clone, Default)]
pub struct TomlConfig {
    root: toml::Table,
}

impl TomlConfig {
    /// Load and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid TOML
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "read configuration",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        content.parse()
    }

    fn lookup(&self, path: &str) -> Option<&toml::Value> {
        let mut segments = path.split('.');
        let mut value = self.root.get(segments.next()?)?;
        for segment in segments {
            value = value.as_table()?.get(segment)?;
        }
        Some(value)
    }
}

impl FromStr for TomlConfig {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self { root: s.parse()? })
    }
}

impl ConfigSource for TomlConfig {
    fn int(&self, path: &str) -> Option<i64> {
        match self.lookup(path)? {
            toml::Value::Integer(i) => Some(*i),
            toml::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn string(&self, path: &str) -> Option<String> {
        match self.lookup(path)? {
            toml::Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn bool(&self, path: &str) -> Option<bool> {
        match self.lookup(path)? {
            toml::Value::Boolean(b) => Some(*b),
            toml::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Configuration held in memory as strings.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: impl Into<String>, value: impl ToString) -> Self {
        self.set(path, value);
        self
    }

    pub fn set(&mut self, path: impl Into<String>, value: impl ToString) {
        self.values.insert(path.into(), value.to_string());
    }
}

impl ConfigSource for MapConfig {
    fn int(&self, path: &str) -> Option<i64> {
        self.values.get(path)?.trim().parse().ok()
    }

    fn string(&self, path: &str) -> Option<String> {
        self.values.get(path).cloned()
    }

    fn bool(&self, path: &str) -> Option<bool> {
        self.values.get(path)?.trim().parse().ok()
    }
}

/// Integer at `path`, or `default` when it is absent or negative.
pub fn int_value(source: &dyn ConfigSource, path: &str, default: i64) -> i64 {
    match source.int(path) {
        Some(value) if value >= 0 => value,
        _ => default,
    }
}

fn unsigned_value(source: &dyn ConfigSource, path: &str, default: u64) -> u64 {
    let default_signed = i64::try_from(default).unwrap_or(i64::MAX);
    u64::try_from(int_value(source, path, default_signed)).unwrap_or(default)
}

/// Rotation settings for the file output.
pub fn file_policy(source: &dyn ConfigSource) -> RotationPolicy {
    RotationPolicy::new()
        .with_max_size_mb(unsigned_value(source, FILE_SIZE, DEFAULT_MAX_SIZE_MB))
        .with_max_age_days(unsigned_value(source, FILE_RETENTION_AGE, DEFAULT_MAX_AGE_DAYS))
        .with_max_backups(
            usize::try_from(unsigned_value(
                source,
                FILE_RETENTION_BACKUPS,
                DEFAULT_MAX_BACKUPS as u64,
            ))
            .unwrap_or(DEFAULT_MAX_BACKUPS),
        )
        .with_compression(source.bool(FILE_COMPRESS).unwrap_or(false))
        .with_local_time(source.bool(FILE_LOCAL_TIME).unwrap_or(false))
}

/// Check that `path` exists, is a directory and accepts new files.
///
/// # Errors
///
/// Returns [`LoggerError::DirectoryError`] describing the first failed check
pub fn check_dir(path: &Path) -> Result<()> {
    let display = path.display().to_string();
    let metadata = fs::metadata(path).map_err(|e| LoggerError::directory(&display, e.to_string()))?;
    if !metadata.is_dir() {
        return Err(LoggerError::directory(display, "not a directory"));
    }
    tempfile::Builder::new()
        .prefix(".log-probe")
        .tempfile_in(path)
        .map_err(|e| LoggerError::directory(&display, format!("not writable: {}", e)))?;
    Ok(())
}

/// Directory for log files: `path` trimmed if usable, otherwise the
/// platform temporary directory.
///
/// Falling back is reported on stderr and never fails.
pub fn prepare_dir(path: &str) -> PathBuf {
    let dir = path.trim();
    match check_dir(Path::new(dir)) {
        Ok(()) => PathBuf::from(dir),
        Err(e) => {
            let fallback = std::env::temp_dir();
            eprintln!(
                "[LOGGER WARNING] {}; using default directory: {}",
                e,
                fallback.display()
            );
            fallback
        }
    }
}

/// One rotating file at `path` behind a [`LevelWriter`] per threshold.
///
/// All returned writers share the same file. No levels means no writers and
/// no file is opened.
///
/// # Errors
///
/// Returns error if the file cannot be opened
pub fn prepare_file_writers<P: AsRef<Path>>(
    path: P,
    levels: &[LogLevel],
    source: &dyn ConfigSource,
) -> Result<Vec<LevelWriter>> {
    if levels.is_empty() {
        return Ok(Vec::new());
    }

    let file = shared(RotatingFile::with_policy(path, file_policy(source))?);
    Ok(levels
        .iter()
        .map(|&level| LevelWriter::new(Arc::clone(&file), level))
        .collect())
}

fn level_at(source: &dyn ConfigSource, path: &str, default: LogLevel) -> LogLevel {
    source
        .string(path)
        .map_or(default, |name| LogLevel::from_name_or_default(&name))
}

impl LoggerBuilder {
    /// Apply the `log.*` settings of `source`: the minimum level, the
    /// timestamp layout and, when enabled, a JSON file output.
    ///
    /// # Errors
    ///
    /// Returns error if file output is enabled and the file cannot be opened
    pub fn configure(self, source: &dyn ConfigSource) -> Result<Self> {
        let mut builder = self.min_level(level_at(source, LEVEL, LogLevel::Info));

        if let Some(name) = source.string(TIME_FORMAT) {
            match name.parse::<TimestampFormat>() {
                Ok(format) => builder = builder.timestamp_format(format),
                Err(e) => eprintln!("[LOGGER WARNING] {}; keeping default timestamp format", e),
            }
        }

        if source.bool(FILE_ENABLE).unwrap_or(false) {
            let dir = prepare_dir(&source.string(FILE_DIRECTORY).unwrap_or_default());
            let name = source
                .string(FILE_NAME)
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
            let file_level = level_at(source, FILE_LEVEL, LogLevel::Trace);

            for writer in prepare_file_writers(dir.join(name), &[file_level], source)? {
                builder = builder.output(writer, OutputFormat::Json);
            }
        }
        Ok(builder)
    }
}

impl Logger {
    /// Console logger configured from `source`, with file output when
    /// `log.file.enable` is set.
    ///
    /// # Errors
    ///
    /// Returns error if file output is enabled and the file cannot be opened
    pub fn from_config(source: &dyn ConfigSource) -> Result<Logger> {
        Ok(Logger::builder().console().configure(source)?.build())
    }
}
