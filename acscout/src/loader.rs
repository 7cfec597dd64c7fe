use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::builder::TrieBuilder;
use crate::errors::{AcError, AcResult};

/// Reads hex-encoded byte patterns, one per line, into `builder`.
///
/// Lines are trimmed and blank lines skipped. The first line that is not valid hex
/// fails the load with its 1-based line number; patterns before it stay added.
pub fn read_patterns<R: BufRead>(builder: &mut TrieBuilder, reader: R) -> AcResult<usize> {
    let mut added = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let pattern = hex::decode(text).map_err(|e| AcError::invalid_hex(index + 1, e))?;
        builder.add_pattern(pattern);
        added += 1;
    }
    Ok(added)
}

/// Reads literal patterns, one per line, into `builder`.
///
/// Lines are taken as raw bytes, so they need not be UTF-8. ASCII whitespace (including a
/// trailing `\r`) is trimmed and blank lines skipped.
pub fn read_strings<R: BufRead>(builder: &mut TrieBuilder, reader: R) -> AcResult<usize> {
    let mut added = 0;
    for line in reader.split(b'\n') {
        let line = line?;
        let pattern = line.trim_ascii();
        if !pattern.is_empty() {
            builder.add_pattern(pattern);
            added += 1;
        }
    }
    Ok(added)
}

/// Loads hex-encoded patterns from the file at `path`
pub fn load_patterns(builder: &mut TrieBuilder, path: &Path) -> AcResult<usize> {
    let file = File::open(path).map_err(|e| AcError::from_io(path, e))?;
    let added = read_patterns(builder, BufReader::new(file))?;
    debug!("Loaded {} hex patterns from {}", added, path.display());
    Ok(added)
}

/// Loads string patterns from the file at `path`
pub fn load_strings(builder: &mut TrieBuilder, path: &Path) -> AcResult<usize> {
    let file = File::open(path).map_err(|e| AcError::from_io(path, e))?;
    let added = read_strings(builder, BufReader::new(file))?;
    debug!("Loaded {} string patterns from {}", added, path.display());
    Ok(added)
}
