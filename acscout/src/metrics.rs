use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::scan::processor::LARGE_FILE_THRESHOLD;

/// Counters for a [`crate::pool::MatchPool`]
#[derive(Debug, Default)]
pub struct PoolMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    released: AtomicU64,
    discarded: AtomicU64,
}

impl PoolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an acquire served from the free list (`hit`) or by a fresh allocation
    pub fn record_acquire(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a buffer coming back, either retained or discarded
    pub fn record_release(&self, retained: bool) {
        if retained {
            self.released.fetch_add(1, Ordering::Relaxed);
        } else {
            self.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_stats(&self) -> PoolStats {
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Match pool stats: hits/misses: {}/{}, released/discarded: {}/{}",
            stats.hits, stats.misses, stats.released, stats.discarded
        );
    }
}

/// Snapshot of [`PoolMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub hits: u64,
    pub misses: u64,
    pub released: u64,
    pub discarded: u64,
}

/// Tracks how much input a scan processed and how it was read
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    bytes_scanned: Arc<AtomicU64>,
    matches_found: Arc<AtomicU64>,
    read_files_processed: Arc<AtomicU64>,
    mmap_files_processed: Arc<AtomicU64>,
    files_failed: Arc<AtomicU64>,
}

impl ScanMetrics {
    /// Creates a new ScanMetrics instance
    pub fn new() -> Self {
        Self {
            bytes_scanned: Arc::new(AtomicU64::new(0)),
            matches_found: Arc::new(AtomicU64::new(0)),
            read_files_processed: Arc::new(AtomicU64::new(0)),
            mmap_files_processed: Arc::new(AtomicU64::new(0)),
            files_failed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records one scanned file by size, which also decides how it was read
    pub fn record_file(&self, size: u64, matches: usize) {
        self.bytes_scanned.fetch_add(size, Ordering::Relaxed);
        self.matches_found
            .fetch_add(matches as u64, Ordering::Relaxed);

        if size >= LARGE_FILE_THRESHOLD {
            self.mmap_files_processed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.read_files_processed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a file that could not be read
    pub fn record_failure(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            bytes_scanned: self.bytes_scanned.load(Ordering::Relaxed),
            matches_found: self.matches_found.load(Ordering::Relaxed),
            read_files: self.read_files_processed.load(Ordering::Relaxed),
            mmap_files: self.mmap_files_processed.load(Ordering::Relaxed),
            failed_files: self.files_failed.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Bytes scanned: {}\n\
             Matches found: {}\n\
             Files processed (read/mmap): {}/{}\n\
             Files failed: {}",
            stats.bytes_scanned,
            stats.matches_found,
            stats.read_files,
            stats.mmap_files,
            stats.failed_files
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub bytes_scanned: u64,
    pub matches_found: u64,
    pub read_files: u64,
    pub mmap_files: u64,
    pub failed_files: u64,
}
