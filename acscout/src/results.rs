use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::automaton::MatchRecord;

/// Represents all matches found in a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    /// The path to the file
    pub path: PathBuf,
    /// Matches in the order the automaton reported them
    pub matches: Vec<MatchRecord>,
}

/// Represents the complete scan results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutput {
    /// Results per file
    pub file_results: Vec<FileResult>,
    /// Total number of matches found
    pub total_matches: usize,
    /// Total number of files scanned
    pub files_searched: usize,
    /// Total number of files with matches
    pub files_with_matches: usize,
}

impl ScanOutput {
    /// Creates a new empty scan result
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a file result to the scan results
    pub fn add_file_result(&mut self, file_result: FileResult) {
        self.files_searched += 1;
        if !file_result.matches.is_empty() {
            self.total_matches += file_result.matches.len();
            self.files_with_matches += 1;
        }
        self.file_results.push(file_result);
    }

    /// Merges another scan result into this one
    pub fn merge(&mut self, other: ScanOutput) {
        self.total_matches += other.total_matches;
        self.files_searched += other.files_searched;
        self.files_with_matches += other.files_with_matches;
        self.file_results.extend(other.file_results);
    }

    /// Orders file results by path so output is stable across thread schedules
    pub fn sort_by_path(&mut self) {
        self.file_results.sort_by(|a, b| a.path.cmp(&b.path));
    }
}
