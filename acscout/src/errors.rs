/// Error types for acscout.
///
/// Building an automaton and scanning with it cannot fail: any finite set of byte patterns
/// produces a valid automaton, and every input scans cleanly. Errors only come from the
/// edges of the library, where bytes cross an I/O boundary:
///
/// - pattern loaders reading one pattern per line (missing file, malformed hex)
/// - the persistence codec reading a compiled automaton (truncated or corrupt container)
/// - configuration loading
///
/// These are surfaced to the caller unmodified:
/// ```rust,ignore
/// match Automaton::load(path) {
///     Ok(automaton) => // scan with it,
///     Err(AcError::Decode(reason)) => // container is corrupt,
///     Err(AcError::FileNotFound(path)) => // nothing to load,
///     Err(e) => // other I/O errors
/// }
/// ```
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for acscout operations
pub type AcResult<T> = Result<T, AcError>;

/// Errors that can occur while loading patterns, decoding automata or reading config
#[derive(Error, Debug)]
pub enum AcError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Invalid hex pattern on line {line}: {source}")]
    InvalidHex {
        line: usize,
        source: hex::FromHexError,
    },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AcError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn invalid_hex(line: usize, source: hex::FromHexError) -> Self {
        Self::InvalidHex { line, source }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Maps an I/O error raised while opening `path` onto the path-carrying variants.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }
}
