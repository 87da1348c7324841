//! Record pooling for the logging hot path
//!
//! Records are recycled through a bounded lock-free queue so an enabled log
//! call does not allocate a fresh attribute map each time. Each acquired record
//! is exclusively owned by its [`PooledRecord`] guard until the guard drops.

use super::record::Record;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Default number of idle records retained by a pool
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Pool usage counters
#[derive(Debug, Default)]
pub struct PoolStats {
    acquired: AtomicU64,
    created: AtomicU64,
    released: AtomicU64,
}

impl PoolStats {
    /// Records handed out, fresh or reused
    #[inline]
    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::Relaxed)
    }

    /// Records constructed because the pool was empty
    #[inline]
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    /// Records returned by their guard
    #[inline]
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    /// Records currently held by callers
    pub fn outstanding(&self) -> u64 {
        self.acquired().saturating_sub(self.released())
    }
}

pub struct RecordPool {
    idle_tx: Sender<Box<Record>>,
    idle_rx: Receiver<Box<Record>>,
    stats: PoolStats,
}

impl RecordPool {
    /// Create a pool retaining at most `capacity` idle records.
    pub fn new(capacity: usize) -> Self {
        let (idle_tx, idle_rx) = bounded(capacity.max(1));
        Self {
            idle_tx,
            idle_rx,
            stats: PoolStats::default(),
        }
    }

    /// Take a cleared record, reusing an idle one when available.
    pub fn acquire(&self) -> PooledRecord<'_> {
        self.stats.acquired.fetch_add(1, Ordering::Relaxed);
        let record = match self.idle_rx.try_recv() {
            Ok(record) => record,
            Err(_) => {
                self.stats.created.fetch_add(1, Ordering::Relaxed);
                Box::default()
            }
        };
        PooledRecord {
            pool: self,
            record: Some(record),
        }
    }

    fn release(&self, mut record: Box<Record>) {
        record.clear();
        self.stats.released.fetch_add(1, Ordering::Relaxed);
        // A full queue means enough idle records already; let this one drop.
        let _ = self.idle_tx.try_send(record);
    }

    /// Number of idle records ready for reuse
    pub fn idle(&self) -> usize {
        self.idle_rx.len()
    }

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }
}

impl Default for RecordPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

impl std::fmt::Debug for RecordPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordPool")
            .field("idle", &self.idle())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Scoped ownership of a pooled [`Record`].
///
/// Dropping the guard clears the record and returns it to the pool, including
/// when the owner unwinds.
pub struct PooledRecord<'a> {
    pool: &'a RecordPool,
    record: Option<Box<Record>>,
}

impl Deref for PooledRecord<'_> {
    type Target = Record;

    fn deref(&self) -> &Record {
        self.record.as_deref().expect("record present until drop")
    }
}

impl DerefMut for PooledRecord<'_> {
    fn deref_mut(&mut self) -> &mut Record {
        self.record.as_deref_mut().expect("record present until drop")
    }
}

impl Drop for PooledRecord<'_> {
    fn drop(&mut self) {
        if let Some(record) = self.record.take() {
            self.pool.release(record);
        }
    }
}
