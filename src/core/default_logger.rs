//! Process-wide default logger
//!
//! A [`DefaultLogger`] holds one published [`Logger`]. Readers load it without
//! locking; replacing it is a single atomic publish, so a reader sees either
//! the old logger or the new one and never a partially built value.
//!
//! The crate keeps one instance behind [`init`], [`set_default`] and
//! [`default_logger`]. Tests that need isolation can create their own.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::logger::Logger;
use super::record::Field;
use arc_swap::ArcSwapOption;
use parking_lot::Once;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Lazily constructed, replaceable logger slot.
pub struct DefaultLogger {
    current: ArcSwapOption<Logger>,
    once: Once,
    factory: fn() -> Logger,
    constructions: AtomicUsize,
}

impl DefaultLogger {
    /// Slot whose lazy value is [`Logger::new`].
    pub const fn new() -> Self {
        Self::with_factory(Logger::new)
    }

    /// Slot whose lazy value is built by `factory`.
    pub const fn with_factory(factory: fn() -> Logger) -> Self {
        Self {
            current: ArcSwapOption::const_empty(),
            once: Once::new(),
            factory,
            constructions: AtomicUsize::new(0),
        }
    }

    /// Build the lazy logger unless one is already installed.
    ///
    /// The factory runs at most once per slot, however many threads race
    /// here. A logger installed with [`set`](Self::set) first is kept.
    pub fn init(&self) {
        self.once.call_once(|| {
            if self.current.load().is_some() {
                return;
            }
            self.constructions.fetch_add(1, Ordering::SeqCst);
            let logger = Arc::new((self.factory)());
            // Lose to a concurrent `set`
            self.current
                .compare_and_swap(&None::<Arc<Logger>>, Some(logger));
        });
    }

    /// Replace the current logger.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidArgument`] when `logger` is `None`
    pub fn set(&self, logger: Option<Arc<Logger>>) -> Result<()> {
        let logger = logger.ok_or_else(|| {
            LoggerError::invalid_argument("logger", "default logger cannot be empty")
        })?;
        self.current.store(Some(logger));
        Ok(())
    }

    /// Current logger, initialising the slot first if needed.
    pub fn get(&self) -> Arc<Logger> {
        if let Some(logger) = self.current.load_full() {
            return logger;
        }
        self.init();
        match self.current.load_full() {
            Some(logger) => logger,
            // `init` always leaves a logger behind; rebuild rather than fail
            None => Arc::new((self.factory)()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.current.load().is_some()
    }

    /// Number of times the factory has run.
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DefaultLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultLogger")
            .field("initialized", &self.is_initialized())
            .field("constructions", &self.constructions())
            .finish()
    }
}

static DEFAULT: DefaultLogger = DefaultLogger::new();

/// Initialise the process-wide logger. Idempotent.
pub fn init() {
    DEFAULT.init();
}

/// Install `logger` as the process-wide logger.
///
/// # Errors
///
/// Returns [`LoggerError::InvalidArgument`] when `logger` is `None`
pub fn set_default(logger: Option<Arc<Logger>>) -> Result<()> {
    DEFAULT.set(logger)
}

/// The process-wide logger, initialised on first use.
pub fn default_logger() -> Arc<Logger> {
    DEFAULT.get()
}

/// Log through the process-wide logger.
#[track_caller]
pub fn log<I: IntoIterator<Item = Field>>(level: LogLevel, msg: &str, fields: I) {
    DEFAULT.get().log(level, msg, fields);
}

#[track_caller]
pub fn trace<I: IntoIterator<Item = Field>>(msg: &str, fields: I) {
    log(LogLevel::Trace, msg, fields);
}

#[track_caller]
pub fn debug<I: IntoIterator<Item = Field>>(msg: &str, fields: I) {
    log(LogLevel::Debug, msg, fields);
}

#[track_caller]
pub fn info<I: IntoIterator<Item = Field>>(msg: &str, fields: I) {
    log(LogLevel::Info, msg, fields);
}

#[track_caller]
pub fn warn<I: IntoIterator<Item = Field>>(msg: &str, fields: I) {
    log(LogLevel::Warn, msg, fields);
}

#[track_caller]
pub fn error<I: IntoIterator<Item = Field>>(msg: &str, fields: I) {
    log(LogLevel::Error, msg, fields);
}

/// Log at `Fatal`; with the default fatal hook the process exits.
#[track_caller]
pub fn fatal<I: IntoIterator<Item = Field>>(msg: &str, fields: I) {
    log(LogLevel::Fatal, msg, fields);
}

/// Log at `Panic`, then panic.
#[track_caller]
pub fn panic<I: IntoIterator<Item = Field>>(msg: &str, fields: I) {
    log(LogLevel::Panic, msg, fields);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output_format::OutputFormat;
    use crate::core::record::string;
    use crate::writers::{LevelWriter, MemoryWriter};
    use std::thread;

    fn quiet() -> Logger {
        Logger::builder().min_level(LogLevel::Warn).build()
    }

    #[test]
    fn test_get_initialises_once() {
        let slot = DefaultLogger::with_factory(quiet);
        assert!(!slot.is_initialized());

        let first = slot.get();
        let second = slot.get();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.min_level(), LogLevel::Warn);
        assert_eq!(slot.constructions(), 1);
    }

    #[test]
    fn test_set_before_init_skips_factory() {
        let slot = DefaultLogger::with_factory(quiet);
        let installed = Arc::new(Logger::builder().min_level(LogLevel::Debug).build());

        slot.set(Some(Arc::clone(&installed))).unwrap();
        slot.init();

        assert!(Arc::ptr_eq(&slot.get(), &installed));
        assert_eq!(slot.constructions(), 0);
    }

    #[test]
    fn test_set_none_rejected() {
        let slot = DefaultLogger::with_factory(quiet);
        slot.init();

        let err = slot.set(None).unwrap_err();

        assert!(matches!(err, LoggerError::InvalidArgument { .. }));
        assert!(slot.is_initialized());
    }

    #[test]
    fn test_set_replaces_for_later_readers() {
        let slot = DefaultLogger::with_factory(quiet);
        let before = slot.get();
        let out = MemoryWriter::new();
        let replacement = Logger::builder()
            .output(LevelWriter::from_writer(out.clone(), LogLevel::Trace), OutputFormat::Logfmt)
            .build();

        slot.set(Some(Arc::new(replacement))).unwrap();
        slot.get().info("after swap", [string("k", "v")]);

        assert!(!Arc::ptr_eq(&before, &slot.get()));
        assert!(out.contents().contains("k=v"));
        // The old handle keeps working
        before.warn("still usable", []);
    }

    #[test]
    fn test_concurrent_init_constructs_once() {
        static SLOT: DefaultLogger = DefaultLogger::with_factory(quiet);

        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| SLOT.get()))
            .collect();
        let loggers: Vec<Arc<Logger>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(SLOT.constructions(), 1);
        assert!(loggers.iter().all(|l| Arc::ptr_eq(l, &loggers[0])));
    }
}
