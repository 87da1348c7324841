//! Core logger types and the event pipeline

pub mod attribute;
pub mod config;
pub mod context;
pub mod default_logger;
pub mod dispatch;
pub mod error;
pub mod field_value;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod pool;
pub mod record;
pub mod sink;
pub mod timestamp;

pub use attribute::{Attribute, Kind};
pub use config::{ConfigSource, MapConfig, TomlConfig};
pub use context::RequestContext;
pub use default_logger::DefaultLogger;
pub use dispatch::dispatch;
pub use error::{LoggerError, Result};
pub use field_value::FieldValue;
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{FatalHook, LogEvent, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use output_format::OutputFormat;
pub use pool::{PoolStats, PooledRecord, RecordPool};
pub use record::{Field, Record, SharedError};
pub use sink::{Event, EventSink};
pub use timestamp::TimestampFormat;
