use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use crate::automaton::MatchRecord;
use crate::metrics::PoolMetrics;

/// Buffers created up front so the first scans don't allocate
pub const DEFAULT_PREWARM: usize = 64;
/// Initial capacity of each pooled buffer
pub const DEFAULT_BUFFER_CAPACITY: usize = 16;
/// Buffers that grew beyond this many records are freed instead of retained
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Thread-safe pool of scratch buffers for match records.
///
/// [`MatchPool::acquire`] hands out a [`PooledMatches`] guard that the caller owns
/// exclusively. Dropping the guard clears the buffer and returns it, so a buffer can
/// neither leak nor be touched after release.
#[derive(Debug)]
pub struct MatchPool {
    free: Mutex<Vec<Vec<MatchRecord>>>,
    buffer_capacity: usize,
    metrics: PoolMetrics,
}

impl Default for MatchPool {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchPool {
    /// Creates a pool pre-warmed with the default number of buffers
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PREWARM, DEFAULT_BUFFER_CAPACITY)
    }

    /// Creates a pool holding `prewarm` buffers of `buffer_capacity` records each
    pub fn with_capacity(prewarm: usize, buffer_capacity: usize) -> Self {
        let free = (0..prewarm)
            .map(|_| Vec::with_capacity(buffer_capacity))
            .collect();
        Self {
            free: Mutex::new(free),
            buffer_capacity,
            metrics: PoolMetrics::new(),
        }
    }

    /// Takes a buffer from the pool, allocating a new one if the pool is empty
    pub fn acquire(&self) -> PooledMatches<'_> {
        let reused = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();

        let buffer = match reused {
            Some(buffer) => {
                self.metrics.record_acquire(true);
                buffer
            }
            None => {
                self.metrics.record_acquire(false);
                Vec::with_capacity(self.buffer_capacity)
            }
        };

        PooledMatches { buffer, pool: self }
    }

    /// Number of buffers currently available
    pub fn available(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Hit/miss counters for this pool
    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }

    fn release(&self, mut buffer: Vec<MatchRecord>) {
        if buffer.capacity() > MAX_RETAINED_CAPACITY {
            debug!(
                "Dropping oversized match buffer ({} records)",
                buffer.capacity()
            );
            self.metrics.record_release(false);
            return;
        }
        buffer.clear();
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(buffer);
        self.metrics.record_release(true);
    }
}

/// A pooled buffer of match records, returned to its pool on drop
#[derive(Debug)]
pub struct PooledMatches<'p> {
    buffer: Vec<MatchRecord>,
    pool: &'p MatchPool,
}

impl PooledMatches<'_> {
    /// Copies the records out, releasing the buffer
    pub fn into_vec(self) -> Vec<MatchRecord> {
        self.as_slice().to_vec()
    }
}

impl Deref for PooledMatches<'_> {
    type Target = Vec<MatchRecord>;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PooledMatches<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for PooledMatches<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}
