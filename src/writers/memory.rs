//! In-memory writer for capturing output

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// A cloneable writer whose clones share one growable buffer.
///
/// Useful for capturing formatted log output in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Written output split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let writer = MemoryWriter::new();
        let mut clone = writer.clone();

        clone.write_all(b"one\ntwo\n").unwrap();

        assert_eq!(writer.lines(), vec!["one", "two"]);
        writer.clear();
        assert!(clone.contents().is_empty());
    }
}
