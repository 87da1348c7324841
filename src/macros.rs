//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. An optional
//! bracketed list of fields may precede the format string. The message is only
//! formatted when the logger would write the event.
//!
//! # Examples
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::info;
//!
//! let logger = Logger::new();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With fields
//! let user_id = 42;
//! info!(logger, [int64("user_id", user_id), string("action", "login")], "User {} logged in", user_id);
//! ```

/// Log a message with automatic formatting.
///
/// `Fatal` and `Panic` reach the logger even when filtered, so their
/// terminal behaviour still runs. Use this macro for `Panic`; there is no
/// `panic!` counterpart.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_facade::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, [string("code", "E500")], "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {{
        let logger = &$logger;
        let level: $crate::LogLevel = $level;
        if logger.enabled(level)
            || matches!(level, $crate::LogLevel::Fatal | $crate::LogLevel::Panic)
        {
            logger.log(level, &::std::format!($($arg)+), [$($field),*]);
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $crate::log!($logger, $level, [], $($arg)+)
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::builder().min_level(LogLevel::Trace).build();
/// use rust_log_facade::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_facade::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, [uint64("counter", 10)], "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_facade::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_facade::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::new();
/// use rust_log_facade::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, [err("connection refused")], "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message, then run the logger's fatal hook.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::builder().on_fatal(|| {}).build();
/// use rust_log_facade::fatal;
/// fatal!(logger, "Critical system failure");
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::record::{int, string};
    use crate::core::{LogLevel, Logger, OutputFormat};
    use crate::writers::{LevelWriter, MemoryWriter};
    use std::cell::Cell;
    use std::fmt;

    fn capture(min: LogLevel) -> (Logger, MemoryWriter) {
        let out = MemoryWriter::new();
        let logger = Logger::builder()
            .min_level(min)
            .output(LevelWriter::from_writer(out.clone(), LogLevel::Trace), OutputFormat::Logfmt)
            .build();
        (logger, out)
    }

    /// Counts how often it is formatted.
    struct Probe<'a>(&'a Cell<usize>);

    impl fmt::Display for Probe<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.set(self.0.get() + 1);
            f.write_str("probe")
        }
    }

    #[test]
    fn test_macro_formats_message() {
        let (logger, out) = capture(LogLevel::Info);

        info!(logger, "Processing {} items", 100);

        assert!(out.contents().contains("message=\"Processing 100 items\""));
    }

    #[test]
    fn test_macro_with_fields() {
        let (logger, out) = capture(LogLevel::Info);

        warn!(logger, [string("user", "alice"), int("attempt", 3)], "login failed");

        let line = out.contents();
        assert!(line.contains("level=warn"));
        assert!(line.contains("user=alice"));
        assert!(line.contains("attempt=3"));
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        let (logger, out) = capture(LogLevel::Warn);
        let formatted = Cell::new(0);

        debug!(logger, "value {}", Probe(&formatted));
        info!(&logger, "value {}", Probe(&formatted));
        error!(logger, "value {}", Probe(&formatted));

        assert_eq!(formatted.get(), 1);
        assert_eq!(out.lines().len(), 1);
    }

    #[test]
    fn test_log_macro_with_level() {
        let (logger, out) = capture(LogLevel::Trace);

        log!(logger, LogLevel::Trace, "t");
        trace!(logger, [string("k", "v")], "t{}", 2);

        assert_eq!(out.lines().len(), 2);
        assert!(out.contents().contains("k=v"));
    }
}
