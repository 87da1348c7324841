//! Timestamp layouts for emitted entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the `timestamp` of an entry is rendered.
///
/// Numeric layouts are written as JSON numbers by the JSON output and as bare
/// digits elsewhere.
///
/// ```
/// use rust_log_facade::TimestampFormat;
///
/// let format: TimestampFormat = "unixms".parse().unwrap();
/// assert_eq!(format, TimestampFormat::UnixMillis);
///
/// let custom: TimestampFormat = "%Y-%m-%d".parse().unwrap();
/// assert_eq!(custom, TimestampFormat::Custom("%Y-%m-%d".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,
    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,
    /// `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,
    /// Seconds since the epoch
    Unix,
    UnixMillis,
    UnixMicros,
    /// `10:30AM`, for interactive consoles
    Kitchen,
    /// Any strftime layout understood by chrono
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Kitchen => datetime.format("%-I:%M%p").to_string(),
            TimestampFormat::Custom(layout) => datetime.format(layout).to_string(),
        }
    }

    /// Epoch offset in this layout's unit, or `None` for textual layouts.
    #[must_use]
    pub fn numeric(&self, datetime: &DateTime<Utc>) -> Option<i64> {
        match self {
            TimestampFormat::Unix => Some(datetime.timestamp()),
            TimestampFormat::UnixMillis => Some(datetime.timestamp_millis()),
            TimestampFormat::UnixMicros => Some(datetime.timestamp_micros()),
            _ => None,
        }
    }
}

impl FromStr for TimestampFormat {
    type Err = String;

    /// Parse a layout name. Anything containing `%` is taken as a strftime
    /// layout.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.contains('%') {
            return Ok(TimestampFormat::Custom(name.to_string()));
        }
        match name.to_lowercase().as_str() {
            "iso8601" | "" => Ok(TimestampFormat::Iso8601),
            "iso8601micros" | "iso8601us" => Ok(TimestampFormat::Iso8601Micros),
            "rfc3339" | "rfc3339nano" => Ok(TimestampFormat::Rfc3339),
            "unix" => Ok(TimestampFormat::Unix),
            "unixms" | "unixmillis" => Ok(TimestampFormat::UnixMillis),
            "unixmicro" | "unixmicros" => Ok(TimestampFormat::UnixMicros),
            "kitchen" => Ok(TimestampFormat::Kitchen),
            _ => Err(format!("Invalid timestamp format: '{}'", s)),
        }
    }
}
