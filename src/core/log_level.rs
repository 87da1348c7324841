//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log event.
///
/// Levels are totally ordered: `Trace < Debug < Info < Warn < Error < Fatal < Panic`.
/// `NoLevel` and `Disabled` are sentinels sorting above every real severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
    Panic = 6,
    /// Event carries no explicit severity
    NoLevel = 7,
    /// Logging disabled; as a threshold it admits nothing
    Disabled = 8,
}

impl LogLevel {
    /// All real severities in ascending order.
    pub const SEVERITIES: [LogLevel; 7] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Panic,
    ];

    /// Whether an event at `self` passes a threshold of `min`.
    ///
    /// A `Disabled` threshold admits no level, including `Disabled` itself.
    #[inline]
    #[must_use]
    pub fn is_enabled(self, min: LogLevel) -> bool {
        if min == LogLevel::Disabled || self == LogLevel::Disabled {
            return false;
        }
        self >= min
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Panic => "panic",
            LogLevel::NoLevel => "",
            LogLevel::Disabled => "disabled",
        }
    }

    /// Three-letter tag used by the console layout.
    pub fn short_tag(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRC",
            LogLevel::Debug => "DBG",
            LogLevel::Info => "INF",
            LogLevel::Warn => "WRN",
            LogLevel::Error => "ERR",
            LogLevel::Fatal => "FTL",
            LogLevel::Panic => "PNC",
            LogLevel::NoLevel => "???",
            LogLevel::Disabled => "OFF",
        }
    }

    /// Parse a level name, falling back to `Info` for anything unrecognised.
    #[must_use]
    pub fn from_name_or_default(name: &str) -> Self {
        match name.parse() {
            Ok(LogLevel::NoLevel) | Err(_) => LogLevel::Info,
            Ok(level) => level,
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => Magenta,
            LogLevel::Debug => Yellow,
            LogLevel::Info => Green,
            LogLevel::Warn => BrightRed,
            LogLevel::Error | LogLevel::Fatal | LogLevel::Panic => Red,
            LogLevel::NoLevel | LogLevel::Disabled => BrightBlack,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            "panic" => Ok(LogLevel::Panic),
            "" | "none" => Ok(LogLevel::NoLevel),
            "disabled" | "off" => Ok(LogLevel::Disabled),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        for pair in LogLevel::SEVERITIES.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(LogLevel::Panic < LogLevel::NoLevel);
        assert!(LogLevel::NoLevel < LogLevel::Disabled);
    }

    #[test]
    fn test_is_enabled() {
        assert!(LogLevel::Warn.is_enabled(LogLevel::Info));
        assert!(LogLevel::Info.is_enabled(LogLevel::Info));
        assert!(!LogLevel::Debug.is_enabled(LogLevel::Info));
        assert!(LogLevel::NoLevel.is_enabled(LogLevel::Panic));
    }

    #[test]
    fn test_disabled_admits_nothing() {
        for level in LogLevel::SEVERITIES {
            assert!(!level.is_enabled(LogLevel::Disabled));
        }
        assert!(!LogLevel::NoLevel.is_enabled(LogLevel::Disabled));
        assert!(!LogLevel::Disabled.is_enabled(LogLevel::Disabled));
        assert!(!LogLevel::Disabled.is_enabled(LogLevel::Trace));
    }

    #[test]
    fn test_parse() {
        assert_eq!(" WARNING ".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("Panic".parse::<LogLevel>(), Ok(LogLevel::Panic));
        assert_eq!("off".parse::<LogLevel>(), Ok(LogLevel::Disabled));
        assert_eq!("".parse::<LogLevel>(), Ok(LogLevel::NoLevel));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_from_name_or_default() {
        assert_eq!(LogLevel::from_name_or_default("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_name_or_default("  trace"), LogLevel::Trace);
        assert_eq!(LogLevel::from_name_or_default(""), LogLevel::Info);
        assert_eq!(LogLevel::from_name_or_default("bogus"), LogLevel::Info);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        let level: LogLevel = serde_json::from_str("\"fatal\"").unwrap();
        assert_eq!(level, LogLevel::Fatal);
    }
}
