//! Level-filtered writers
//!
//! A [`LevelWriter`] puts a minimum severity in front of a byte sink. Several
//! writers with different thresholds can share one underlying destination,
//! which is how per-destination minimum levels are expressed (for example a
//! file that only receives warnings while the console receives everything).

use crate::core::log_level::LogLevel;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// A byte sink shared between writers and threads.
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Wrap any writer so it can be shared by several [`LevelWriter`]s.
pub fn shared<W: Write + Send + 'static>(writer: W) -> SharedWriter {
    Arc::new(Mutex::new(Box::new(writer)))
}

/// A writer that is told the level of each payload.
pub trait LevelWrite: Send + Sync {
    /// Write `buf` produced at `level`.
    ///
    /// Implementations that filter must report a filtered payload as fully
    /// written so callers never retry or fail on intentionally dropped output.
    fn write_level(&self, level: LogLevel, buf: &[u8]) -> io::Result<usize>;

    fn flush(&self) -> io::Result<()>;

    /// Write the whole of `buf`, retrying short writes.
    fn write_all_level(&self, level: LogLevel, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write_level(level, buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole log line",
                    ))
                }
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Forwards payloads at or above `threshold` to the wrapped writer.
#[derive(Clone)]
pub struct LevelWriter {
    inner: SharedWriter,
    threshold: LogLevel,
}

impl LevelWriter {
    pub fn new(inner: SharedWriter, threshold: LogLevel) -> Self {
        Self { inner, threshold }
    }

    /// Wrap an owned writer.
    pub fn from_writer<W: Write + Send + 'static>(writer: W, threshold: LogLevel) -> Self {
        Self::new(shared(writer), threshold)
    }

    /// Console writer on standard error.
    pub fn stderr(threshold: LogLevel) -> Self {
        Self::from_writer(io::stderr(), threshold)
    }

    /// Console writer on standard output.
    pub fn stdout(threshold: LogLevel) -> Self {
        Self::from_writer(io::stdout(), threshold)
    }

    #[must_use]
    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    /// Same destination, different threshold.
    #[must_use]
    pub fn with_threshold(&self, threshold: LogLevel) -> Self {
        Self::new(Arc::clone(&self.inner), threshold)
    }

    pub fn inner(&self) -> &SharedWriter {
        &self.inner
    }

    #[must_use]
    pub fn accepts(&self, level: LogLevel) -> bool {
        level.is_enabled(self.threshold)
    }
}

impl LevelWrite for LevelWriter {
    fn write_level(&self, level: LogLevel, buf: &[u8]) -> io::Result<usize> {
        if !self.accepts(level) {
            return Ok(buf.len());
        }
        self.inner.lock().write(buf)
    }

    fn flush(&self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl fmt::Debug for LevelWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelWriter")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
