//! Size-rotated log file
//!
//! [`RotatingFile`] is a plain [`std::io::Write`] destination. Before a write
//! that would push the active file past its size limit, the active file is
//! renamed to a timestamped backup (`app-2025-01-08T10-30-45.123.log`) and a
//! fresh file is opened. After each rotation old backups are pruned by count
//! and age and, optionally, gzip-compressed.

use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const MEGABYTE: u64 = 1024 * 1024;
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESS_SUFFIX: &str = ".gz";
// Keeps the age cutoff inside chrono's representable range
const MAX_RETENTION_DAYS: i64 = 1_000_000;

/// Default maximum size of the active file in megabytes
pub const DEFAULT_MAX_SIZE_MB: u64 = 10;
/// Default retention age of backups in days
pub const DEFAULT_MAX_AGE_DAYS: u64 = 14;
/// Default number of backups kept
pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// Rotation and retention settings
///
/// A zero `max_age_days` or `max_backups` disables that retention rule.
///
/// # Examples
///
/// ```
/// use rust_log_facade::writers::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size_mb(50)
///     .with_max_backups(7)
///     .with_compression(true);
/// assert_eq!(policy.max_bytes, 50 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size in bytes at which the active file is rotated
    pub max_bytes: u64,
    pub max_age_days: u64,
    pub max_backups: usize,
    /// Gzip backups after rotation
    pub compress: bool,
    /// Use local time rather than UTC in backup names
    pub local_time: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_SIZE_MB * MEGABYTE,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            max_backups: DEFAULT_MAX_BACKUPS,
            compress: false,
            local_time: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Size limit in megabytes. Zero selects the default of
    /// `DEFAULT_MAX_SIZE_MB`, since no write could fit a zero-byte file.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size_mb(mut self, megabytes: u64) -> Self {
        let megabytes = if megabytes == 0 { DEFAULT_MAX_SIZE_MB } else { megabytes };
        self.max_bytes = megabytes.saturating_mul(MEGABYTE);
        self
    }

    /// Byte-granular size limit, mostly useful in tests
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age_days(mut self, days: u64) -> Self {
        self.max_age_days = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_local_time(mut self, enabled: bool) -> Self {
        self.local_time = enabled;
        self
    }
}

/// A backup file found next to the active file.
#[derive(Debug)]
struct Backup {
    path: PathBuf,
    taken_at: DateTime<Utc>,
    compressed: bool,
}

/// Log file that rotates itself by size.
///
/// # Examples
///
/// ```no_run
/// use rust_log_facade::writers::{RotatingFile, RotationPolicy};
/// use std::io::Write;
///
/// let mut file = RotatingFile::with_policy(
///     "/var/log/app/app.log",
///     RotationPolicy::new().with_max_backups(3),
/// ).unwrap();
/// file.write_all(b"started\n").unwrap();
/// ```
pub struct RotatingFile {
    base_path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
}

impl RotatingFile {
    /// Open `path` with the default policy.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or the file opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Open `path`, appending to it if it already exists.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or the file opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size) = Self::open_append(&base_path)?;

        Ok(Self {
            base_path,
            policy,
            writer: Some(BufWriter::new(file)),
            current_size,
        })
    }

    fn open_append(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "open log file",
                    format!("Failed to open '{}'", path.display()),
                    e,
                )
            })?;
        let size = file.metadata().map(|m| m.len()).map_err(|e| {
            LoggerError::io_operation(
                "open log file",
                format!("Cannot access metadata of '{}'", path.display()),
                e,
            )
        })?;
        Ok((file, size))
    }

    /// Rotate now, regardless of size.
    ///
    /// # Errors
    ///
    /// Returns error if the active file cannot be renamed or reopened
    pub fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.base_path.exists() {
            let backup = self.next_backup_path();
            fs::rename(&self.base_path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rename to '{}': {}", backup.display(), e),
                )
            })?;
        }

        let (file, size) = Self::open_append(&self.base_path).map_err(|e| {
            LoggerError::file_rotation(self.base_path.display().to_string(), e.to_string())
        })?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = size;

        self.prune_backups();
        Ok(())
    }

    /// `(stem-, .ext)` pair that brackets backup timestamps
    fn name_parts(&self) -> (String, String) {
        let stem = self
            .base_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("app");
        let ext = self
            .base_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        (format!("{}-", stem), ext)
    }

    fn backup_name(&self, at: DateTime<Utc>) -> String {
        let (prefix, ext) = self.name_parts();
        let stamp = if self.policy.local_time {
            at.with_timezone(&Local).format(BACKUP_TIME_FORMAT).to_string()
        } else {
            at.format(BACKUP_TIME_FORMAT).to_string()
        };
        format!("{}{}{}", prefix, stamp, ext)
    }

    /// Backup path for now, nudged forward a millisecond at a time on collision.
    fn next_backup_path(&self) -> PathBuf {
        let mut at = Utc::now();
        loop {
            let candidate = self.base_path.with_file_name(self.backup_name(at));
            let compressed = append_suffix(&candidate, COMPRESS_SUFFIX);
            if !candidate.exists() && !compressed.exists() {
                return candidate;
            }
            at += chrono::Duration::milliseconds(1);
        }
    }

    fn parse_backup_time(&self, stamp: &str) -> Option<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()?;
        if self.policy.local_time {
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.with_timezone(&Utc))
        } else {
            Some(Utc.from_utc_datetime(&naive))
        }
    }

    /// Backups of this file, newest first
    fn backups(&self) -> Vec<Backup> {
        let dir = match self.base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!(
                    "[LOGGER WARNING] Cannot list log directory {}: {}",
                    dir.display(),
                    e
                );
                return Vec::new();
            }
        };

        let (prefix, ext) = self.name_parts();
        let mut backups: Vec<Backup> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let rest = name.strip_prefix(&prefix)?;
                let (stamp, compressed) = match rest.strip_suffix(COMPRESS_SUFFIX) {
                    Some(inner) => (inner.strip_suffix(ext.as_str())?, true),
                    None => (rest.strip_suffix(ext.as_str())?, false),
                };
                let taken_at = self.parse_backup_time(stamp)?;
                Some(Backup {
                    path: entry.path(),
                    taken_at,
                    compressed,
                })
            })
            .collect();

        backups.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
        backups
    }

    /// Apply retention and compression to existing backups.
    ///
    /// Failures are reported on stderr; they never fail the write that
    /// triggered the rotation.
    fn prune_backups(&self) {
        if self.policy.max_backups == 0 && self.policy.max_age_days == 0 && !self.policy.compress {
            return;
        }

        let mut keep = self.backups();
        let mut remove = Vec::new();

        if self.policy.max_backups > 0 && keep.len() > self.policy.max_backups {
            remove.extend(keep.split_off(self.policy.max_backups));
        }

        if self.policy.max_age_days > 0 {
            let days = i64::try_from(self.policy.max_age_days)
                .unwrap_or(i64::MAX)
                .min(MAX_RETENTION_DAYS);
            let cutoff = Utc::now() - chrono::Duration::days(days);
            let (fresh, stale): (Vec<Backup>, Vec<Backup>) =
                keep.into_iter().partition(|b| b.taken_at >= cutoff);
            keep = fresh;
            remove.extend(stale);
        }

        for backup in &remove {
            if let Err(e) = fs::remove_file(&backup.path) {
                eprintln!(
                    "[LOGGER WARNING] Failed to remove old backup {}: {}",
                    backup.path.display(),
                    e
                );
            }
        }

        if self.policy.compress {
            for backup in keep.iter().filter(|b| !b.compressed) {
                if let Err(e) = compress_file(&backup.path) {
                    eprintln!("[LOGGER WARNING] {}", e);
                }
            }
        }
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len() as u64;
        if len > self.policy.max_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "write length {} exceeds maximum file size {}",
                    len, self.policy.max_bytes
                ),
            ));
        }

        if self.writer.is_none() || self.current_size + len > self.policy.max_bytes {
            self.rotate().map_err(io::Error::other)?;
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("log file is not open"))?;
        let n = writer.write(buf)?;
        self.current_size += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

/// Gzip `path` to `path.gz`, removing the original only once the
/// compressed copy is complete.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, Read};

    let gz_path = append_suffix(path, COMPRESS_SUFFIX);
    let temp_gz_path = append_suffix(&gz_path, ".tmp");

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create {}", temp_gz_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let mut buffer = vec![0u8; 64 * 1024];
    let streamed: io::Result<()> = (|| {
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            encoder.write_all(&buffer[..bytes_read])?;
        }
        encoder.finish()?.flush()
    })();

    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compressed {} but failed to remove the original: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    fn backup_files(dir: &Path, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().into_string().unwrap())
            .filter(|n| n.starts_with(prefix))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_policy_defaults() {
        let policy = RotationPolicy::default();
        assert_eq!(policy.max_bytes, 10 * 1024 * 1024);
        assert_eq!(policy.max_age_days, 14);
        assert_eq!(policy.max_backups, 10);
        assert!(!policy.compress);
        assert!(!policy.local_time);
    }

    #[test]
    fn test_zero_size_limit_uses_default() {
        let policy = RotationPolicy::new().with_max_size_mb(0);
        assert_eq!(policy.max_bytes, DEFAULT_MAX_SIZE_MB * 1024 * 1024);

        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::with_policy(&path, policy).unwrap();
        file.write_all(b"first line\n").unwrap();
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first line\n");
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("app.log");

        let file = RotatingFile::new(&path).unwrap();

        assert!(path.exists());
        assert_eq!(file.current_size(), 0);
        assert_eq!(file.path(), path);
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, b"previous\n").unwrap();

        let mut file = RotatingFile::new(&path).unwrap();
        assert_eq!(file.current_size(), 9);
        file.write_all(b"next\n").unwrap();
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "previous\nnext\n");
    }

    #[test]
    fn test_rotates_before_exceeding_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let policy = RotationPolicy::new().with_max_size_bytes(10).with_max_backups(0);
        let mut file = RotatingFile::with_policy(&path, policy).unwrap();

        file.write_all(b"12345678\n").unwrap();
        file.write_all(b"abc\n").unwrap();
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "abc\n");
        let backups = backup_files(dir.path(), "app-");
        assert_eq!(backups.len(), 1);
        assert!(backups[0].ends_with(".log"));
        assert_eq!(
            fs::read_to_string(dir.path().join(&backups[0])).unwrap(),
            "12345678\n"
        );
    }

    #[test]
    fn test_oversized_write_rejected() {
        let dir = tempdir().unwrap();
        let policy = RotationPolicy::new().with_max_size_bytes(4);
        let mut file = RotatingFile::with_policy(dir.path().join("app.log"), policy).unwrap();

        let err = file.write(b"too long").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_prunes_by_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let policy = RotationPolicy::new().with_max_size_bytes(4).with_max_backups(2);
        let mut file = RotatingFile::with_policy(&path, policy).unwrap();

        for line in [b"one\n", b"two\n", b"thr\n", b"fou\n", b"fiv\n"] {
            file.write_all(line).unwrap();
        }
        file.flush().unwrap();

        let backups = backup_files(dir.path(), "app-");
        assert_eq!(backups.len(), 2);
        // The newest two survive
        let kept: Vec<String> = backups
            .iter()
            .map(|b| fs::read_to_string(dir.path().join(b)).unwrap())
            .collect();
        assert_eq!(kept, vec!["thr\n", "fou\n"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "fiv\n");
    }

    #[test]
    fn test_prunes_by_age() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let stale = dir.path().join("app-2001-02-03T04-05-06.000.log");
        let unrelated = dir.path().join("other-2001-02-03T04-05-06.000.log");
        fs::write(&stale, b"old").unwrap();
        fs::write(&unrelated, b"keep").unwrap();

        let policy = RotationPolicy::new().with_max_age_days(1).with_max_backups(0);
        let mut file = RotatingFile::with_policy(&path, policy).unwrap();
        file.write_all(b"current\n").unwrap();
        file.rotate().unwrap();

        assert!(!stale.exists());
        assert!(unrelated.exists());
        assert_eq!(backup_files(dir.path(), "app-").len(), 1);
    }

    #[test]
    fn test_compresses_backups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let policy = RotationPolicy::new().with_compression(true);
        let mut file = RotatingFile::with_policy(&path, policy).unwrap();

        file.write_all(b"compress me\n").unwrap();
        file.rotate().unwrap();

        let backups = backup_files(dir.path(), "app-");
        assert_eq!(backups.len(), 1);
        assert!(backups[0].ends_with(".log.gz"));

        let mut decoded = String::new();
        GzDecoder::new(File::open(dir.path().join(&backups[0])).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "compress me\n");
    }

    #[test]
    fn test_backup_name_format() {
        let dir = tempdir().unwrap();
        let file = RotatingFile::new(dir.path().join("server.log")).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap()
            + chrono::Duration::milliseconds(123);

        assert_eq!(file.backup_name(at), "server-2025-01-08T10-30-45.123.log");
        assert_eq!(
            file.parse_backup_time("2025-01-08T10-30-45.123"),
            Some(at)
        );
    }
}
