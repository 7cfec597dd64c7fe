/// Concurrent directory scanning against a single compiled automaton.
///
/// # Processing Strategy
///
/// Files are collected with the `ignore` walker (honouring `.gitignore` and any extra
/// ignore globs) and then split into chunks for Rayon's work-stealing pool. Every worker
/// shares the same [`Automaton`](crate::Automaton) by reference and collects owned
/// [`MatchRecord`](crate::MatchRecord)s per file.
///
/// Each file is read according to its size:
/// 1. **Files under 10MB**: read into memory in one call
/// 2. **Large files** (>= 10MB): memory-mapped
///
/// Results are sorted by path before they are returned, so output does not depend on
/// thread scheduling.
pub mod engine;
pub mod processor;

pub use engine::{load_automaton, scan};
pub use processor::FileProcessor;
