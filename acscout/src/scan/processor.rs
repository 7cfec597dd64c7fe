use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::{trace, warn};

use crate::automaton::{Automaton, MatchRecord};
use crate::errors::{AcError, AcResult};
use crate::metrics::ScanMetrics;
use crate::results::FileResult;

/// Files at or above this size are memory-mapped instead of read
pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Scans individual files against a shared automaton
#[derive(Debug)]
pub struct FileProcessor<'a> {
    automaton: &'a Automaton,
    metrics: ScanMetrics,
    first_only: bool,
}

impl<'a> FileProcessor<'a> {
    /// Creates a new FileProcessor over the given automaton
    pub fn new(automaton: &'a Automaton, first_only: bool) -> Self {
        Self {
            automaton,
            metrics: ScanMetrics::new(),
            first_only,
        }
    }

    /// Gets the scan metrics
    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Runs the automaton over one in-memory buffer
    pub fn scan_bytes(&self, bytes: &[u8]) -> Vec<MatchRecord> {
        if self.first_only {
            return self
                .automaton
                .find_first(bytes)
                .map(|m| vec![m.to_record()])
                .unwrap_or_default();
        }
        self.automaton
            .find_all(bytes)
            .iter()
            .map(|m| m.to_record())
            .collect()
    }

    /// Reads the whole file into memory in one call
    fn process_read_file(&self, path: &Path) -> AcResult<Vec<MatchRecord>> {
        trace!("Reading file into memory: {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| AcError::from_io(path, e))?;
        Ok(self.scan_bytes(&bytes))
    }

    /// Process a file using memory mapping
    fn process_mmap_file(&self, path: &Path) -> AcResult<Vec<MatchRecord>> {
        let file = File::open(path).map_err(|e| AcError::from_io(path, e))?;
        // The map is read-only and dropped before this function returns
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(self.scan_bytes(&mmap))
    }

    /// Scans a file and returns any matches found
    pub fn process_file(&self, path: &Path) -> AcResult<FileResult> {
        trace!("Processing file: {}", path.display());

        // Choose processing strategy based on file size
        let (size, matches) = match path.metadata() {
            Ok(metadata) => {
                let size = metadata.len();
                let matches = if size >= LARGE_FILE_THRESHOLD {
                    self.process_mmap_file(path)
                } else {
                    self.process_read_file(path)
                };
                (size, matches)
            }
            Err(e) => {
                warn!("Failed to get metadata for {}: {}", path.display(), e);
                (0, self.process_read_file(path))
            }
        };

        match matches {
            Ok(matches) => {
                self.metrics.record_file(size, matches.len());
                Ok(FileResult {
                    path: path.to_path_buf(),
                    matches,
                })
            }
            Err(e) => {
                self.metrics.record_failure();
                Err(e)
            }
        }
    }
}
