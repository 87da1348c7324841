//! # Rust Log Facade
//!
//! A structured-logging facade: typed key/value events, gated by severity
//! before any formatting work happens, routed to console and rotating file
//! outputs with per-output minimum levels.
//!
//! ## Features
//!
//! - **Cheap when disabled**: a suppressed level costs one comparison and
//!   touches no record
//! - **Typed fields**: `string`, `int`, `float64`, `duration`, `time`, `any`, ...
//! - **Pooled records**: enabled calls reuse cleared records instead of
//!   allocating
//! - **Process-wide default**: lazily initialised, atomically replaceable
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::writers::{LevelWriter, MemoryWriter};
//!
//! let out = MemoryWriter::new();
//! let logger = Logger::builder()
//!     .min_level(LogLevel::Info)
//!     .output(LevelWriter::from_writer(out.clone(), LogLevel::Trace), OutputFormat::Logfmt)
//!     .build();
//!
//! logger.warn("login failed", [string("user", "alice"), int("attempt", 3)]);
//! logger.debug("not written", []);
//!
//! assert_eq!(out.lines().len(), 1);
//! assert!(out.contents().contains("level=warn"));
//! ```

pub mod core;
pub mod macros;
pub mod writers;

pub mod prelude {
    pub use crate::core::record::{
        any, bool, context, duration, err, float32, float64, int, int64, string, time, uint64,
    };
    pub use crate::core::{
        Field, LogLevel, Logger, LoggerBuilder, LoggerError, OutputFormat, RequestContext,
        Result, TimestampFormat,
    };
}

pub use crate::core::default_logger::{
    debug, default_logger, error, fatal, info, init, log, panic, set_default, trace, warn,
};
pub use crate::core::record::{
    any, bool, context, duration, err, float32, float64, int, int64, shared_err, string, time,
    uint64,
};
pub use crate::core::{
    dispatch, Attribute, ConfigSource, DefaultLogger, Event, EventSink, FatalHook, Field,
    FieldValue, Kind, LogEntry, LogEvent, LogLevel, Logger, LoggerBuilder, LoggerError,
    LoggerMetrics, MapConfig, OutputFormat, PoolStats, PooledRecord, Record, RecordPool,
    RequestContext, Result, SharedError, TimestampFormat, TomlConfig,
};
