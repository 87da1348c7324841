//! Main logger implementation
//!
//! [`Logger`] is the concrete event sink behind the facade. It owns a minimum
//! level, a list of outputs (each a [`LevelWriter`] with an output format), a
//! record pool and metrics. Outputs are written synchronously on the calling
//! thread.

use super::{
    context::RequestContext,
    dispatch::dispatch,
    error::{LoggerError, Result},
    field_value::FieldValue,
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    output_format::OutputFormat,
    pool::{RecordPool, DEFAULT_POOL_CAPACITY},
    record::Field,
    sink::{Event, EventSink},
    timestamp::TimestampFormat,
};
use crate::writers::{LevelWrite, LevelWriter};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

/// Called after a `Fatal` event has been written and outputs flushed.
///
/// The default hook exits the process with status 1.
pub type FatalHook = Arc<dyn Fn() + Send + Sync>;

fn exit_process() {
    std::process::exit(1);
}

#[derive(Clone)]
struct Output {
    writer: LevelWriter,
    format: OutputFormat,
}

#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    outputs: Arc<Vec<Output>>,
    pool: Arc<RecordPool>,
    /// Metrics for observability (events written, write failures)
    metrics: Arc<LoggerMetrics>,
    timestamp_format: Arc<TimestampFormat>,
    fatal_hook: FatalHook,
}

impl Logger {
    /// Logger writing coloured console lines to stderr at `Info` and above.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().console().build()
    }

    /// Emit `msg` at `level` with the given fields.
    ///
    /// Suppressed levels return before any record is taken from the pool.
    #[track_caller]
    pub fn log<I>(&self, level: LogLevel, msg: &str, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        dispatch(self, &self.pool, level, msg, fields);
    }

    #[track_caller]
    #[inline]
    pub fn trace<I: IntoIterator<Item = Field>>(&self, msg: &str, fields: I) {
        self.log(LogLevel::Trace, msg, fields);
    }

    #[track_caller]
    #[inline]
    pub fn debug<I: IntoIterator<Item = Field>>(&self, msg: &str, fields: I) {
        self.log(LogLevel::Debug, msg, fields);
    }

    #[track_caller]
    #[inline]
    pub fn info<I: IntoIterator<Item = Field>>(&self, msg: &str, fields: I) {
        self.log(LogLevel::Info, msg, fields);
    }

    #[track_caller]
    #[inline]
    pub fn warn<I: IntoIterator<Item = Field>>(&self, msg: &str, fields: I) {
        self.log(LogLevel::Warn, msg, fields);
    }

    #[track_caller]
    #[inline]
    pub fn error<I: IntoIterator<Item = Field>>(&self, msg: &str, fields: I) {
        self.log(LogLevel::Error, msg, fields);
    }

    /// Log at `Fatal`, flush every output, then run the fatal hook.
    ///
    /// With the default hook this call does not return.
    #[track_caller]
    pub fn fatal<I: IntoIterator<Item = Field>>(&self, msg: &str, fields: I) {
        self.log(LogLevel::Fatal, msg, fields);
    }

    /// Log at `Panic`, then panic with the message.
    #[track_caller]
    pub fn panic<I: IntoIterator<Item = Field>>(&self, msg: &str, fields: I) {
        self.log(LogLevel::Panic, msg, fields);
    }

    /// Whether an event at `level` would be written.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.is_enabled(self.min_level)
    }

    #[inline]
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// A logger sharing this one's outputs, pool and metrics at another level.
    #[must_use]
    pub fn with_level(&self, level: LogLevel) -> Logger {
        Logger {
            min_level: level,
            ..self.clone()
        }
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn pool(&self) -> &RecordPool {
        &self.pool
    }

    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.timestamp_format
    }

    /// Flush every output.
    ///
    /// # Errors
    ///
    /// Returns the first flush failure; remaining outputs are still flushed.
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for (idx, output) in self.outputs.iter().enumerate() {
            if let Err(e) = output.writer.flush() {
                self.metrics.record_flush_error();
                if first_error.is_none() {
                    first_error = Some(LoggerError::io_operation(
                        "flush",
                        format!("output #{} failed to flush", idx),
                        e,
                    ));
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Format and write a finished entry to each accepting output.
    fn write_entry(&self, entry: &LogEntry) {
        for (idx, output) in self.outputs.iter().enumerate() {
            if !output.writer.accepts(entry.level) {
                continue;
            }
            let mut line = output.format.format(entry, &self.timestamp_format);
            line.push('\n');
            if let Err(e) = output.writer.write_all_level(entry.level, line.as_bytes()) {
                let failures = self.metrics.record_write_error();
                // First failure and every 1000th after that
                if failures == 0 || (failures + 1) % 1000 == 0 {
                    eprintln!(
                        "[LOGGER ERROR] Output #{} failed to write ({} failures): {}",
                        idx,
                        failures + 1,
                        e
                    );
                }
            }
        }
        self.metrics.record_logged();
    }

    fn flush_quietly(&self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush: {}", e);
        }
    }

    /// Terminal behaviour of `Fatal` and `Panic`, run after emission.
    fn terminate(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Fatal => {
                self.flush_quietly();
                (self.fatal_hook)();
            }
            LogLevel::Panic => {
                self.flush_quietly();
                panic!("{}", message);
            }
            _ => {}
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .field("outputs", &self.outputs.len())
            .field("timestamp_format", &self.timestamp_format)
            .finish_non_exhaustive()
    }
}

impl EventSink for Logger {
    type Event<'a> = LogEvent<'a>;

    fn level(&self) -> LogLevel {
        self.min_level
    }

    fn event(&self, level: LogLevel) -> Option<LogEvent<'_>> {
        if level.is_enabled(self.min_level) {
            return Some(LogEvent {
                logger: self,
                entry: LogEntry::new(level),
            });
        }
        // Terminal levels end execution even when their output is filtered
        self.terminate(level, "");
        None
    }
}

/// An event being built by a [`Logger`].
///
/// Finalising it with [`Event::msg`] writes it to the logger's outputs.
pub struct LogEvent<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl LogEvent<'_> {
    fn push(&mut self, key: &str, value: FieldValue) {
        self.entry.push_field(key, value);
    }
}

impl Event for LogEvent<'_> {
    fn caller(&mut self, location: &'static Location<'static>) {
        self.entry.set_location(location);
    }

    fn context(&mut self, ctx: &Arc<RequestContext>) {
        self.entry.context = Some(Arc::clone(ctx));
    }

    fn error(&mut self, err: &(dyn Error + Send + Sync + 'static)) {
        self.entry.error = Some(err.to_string());
    }

    fn any(&mut self, key: &str, value: &serde_json::Value) {
        self.push(key, FieldValue::Json(value.clone()));
    }

    fn bool(&mut self, key: &str, value: bool) {
        self.push(key, FieldValue::Bool(value));
    }

    fn duration(&mut self, key: &str, value: Duration) {
        self.push(key, FieldValue::Duration(value));
    }

    fn float32(&mut self, key: &str, value: f32) {
        self.push(key, FieldValue::Float32(value));
    }

    fn float64(&mut self, key: &str, value: f64) {
        self.push(key, FieldValue::Float(value));
    }

    fn int64(&mut self, key: &str, value: i64) {
        self.push(key, FieldValue::Int(value));
    }

    fn str(&mut self, key: &str, value: &str) {
        self.push(key, FieldValue::from(value));
    }

    fn time(&mut self, key: &str, value: &DateTime<Utc>) {
        self.push(key, FieldValue::Time(*value));
    }

    fn uint64(&mut self, key: &str, value: u64) {
        self.push(key, FieldValue::Uint(value));
    }

    fn msg(mut self, message: &str) {
        self.entry.set_message(message);
        self.logger.write_entry(&self.entry);
        self.logger.terminate(self.entry.level, &self.entry.message);
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_log_facade::prelude::*;
/// use rust_log_facade::writers::{LevelWriter, MemoryWriter};
///
/// let out = MemoryWriter::new();
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .output(LevelWriter::from_writer(out.clone(), LogLevel::Trace), OutputFormat::Logfmt)
///     .build();
///
/// logger.info("ready", [string("service", "api")]);
/// assert!(out.contents().contains("service=api"));
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    outputs: Vec<Output>,
    timestamp_format: TimestampFormat,
    pool_capacity: usize,
    fatal_hook: Option<FatalHook>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            outputs: Vec::new(),
            timestamp_format: TimestampFormat::default(),
            pool_capacity: DEFAULT_POOL_CAPACITY,
            fatal_hook: None,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set minimum log level by name; unknown names select `Info`
    #[must_use = "builder methods return a new value"]
    pub fn level_name(mut self, name: &str) -> Self {
        self.min_level = LogLevel::from_name_or_default(name);
        self
    }

    /// Add an output
    #[must_use = "builder methods return a new value"]
    pub fn output(mut self, writer: LevelWriter, format: OutputFormat) -> Self {
        self.outputs.push(Output { writer, format });
        self
    }

    /// Add a coloured console output on stderr
    #[must_use = "builder methods return a new value"]
    pub fn console(self) -> Self {
        self.output(LevelWriter::stderr(LogLevel::Trace), OutputFormat::Console)
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Number of idle records kept for reuse
    #[must_use = "builder methods return a new value"]
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Replace the default process exit run after `Fatal` events
    #[must_use = "builder methods return a new value"]
    pub fn on_fatal<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.fatal_hook = Some(Arc::new(hook));
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        Logger {
            min_level: self.min_level,
            outputs: Arc::new(self.outputs),
            pool: Arc::new(RecordPool::new(self.pool_capacity)),
            metrics: Arc::new(LoggerMetrics::new()),
            timestamp_format: Arc::new(self.timestamp_format),
            fatal_hook: self.fatal_hook.unwrap_or_else(|| Arc::new(exit_process)),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
