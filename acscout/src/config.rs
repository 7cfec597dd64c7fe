use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{AcError, AcResult};

/// Configuration for a scan.
///
/// # Configuration Locations
///
/// Loaded from these locations, later ones overriding earlier ones:
/// 1. Global `$CONFIG_DIR/acscout/config.yaml`
/// 2. Local `.acscout.yaml` in the current directory
/// 3. Custom config file specified via `--config`
///
/// # Configuration Format
///
/// ```yaml
/// # Pattern file, one pattern per line
/// patterns_file: "signatures.txt"
///
/// # Treat each line of the pattern file as hex-encoded bytes
/// hex_patterns: false
///
/// # Or: a compiled automaton written by `acscout compile`
/// automaton_path: "signatures.acs"
///
/// # Root directory to scan
/// root_path: "."
///
/// # Extra ignore globs (gitignore syntax)
/// ignore_patterns:
///   - "target/"
///
/// # Report only the first match in each file
/// first_only: false
///
/// # Show only statistics
/// stats_only: false
///
/// # Thread count (default: CPU cores)
/// thread_count: 4
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// Command-line arguments take precedence; see [`ScanConfig::merge_with_cli`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Pattern file, one pattern per line
    #[serde(default)]
    pub patterns_file: Option<PathBuf>,

    /// Decode each pattern line as hex
    #[serde(default)]
    pub hex_patterns: bool,

    /// Compiled automaton to load instead of building from `patterns_file`
    #[serde(default)]
    pub automaton_path: Option<PathBuf>,

    /// Root directory to start scanning from
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Extra ignore globs applied on top of .gitignore rules
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Stop scanning each file at its first match
    #[serde(default)]
    pub first_only: bool,

    /// Whether to only show statistics instead of individual matches
    #[serde(default)]
    pub stats_only: bool,

    /// Number of threads to use for scanning
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where a scan gets its automaton from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSource {
    /// A compiled container
    Automaton(PathBuf),
    /// Hex-encoded patterns, one per line
    HexFile(PathBuf),
    /// Literal patterns, one per line
    StringFile(PathBuf),
}

pub fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

pub fn default_log_level() -> String {
    "warn".to_string()
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            patterns_file: None,
            hex_patterns: false,
            automaton_path: None,
            root_path: default_root_path(),
            ignore_patterns: Vec::new(),
            first_only: false,
            stats_only: false,
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

impl ScanConfig {
    /// Loads configuration from the default locations
    pub fn load() -> AcResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus a specific file
    pub fn load_from(config_path: Option<&Path>) -> AcResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("acscout/config.yaml")),
            Some(PathBuf::from(".acscout.yaml")),
        ];
        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit path must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AcError::config_error(e.to_string()))
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli_config: ScanConfig) -> Self {
        // CLI values take precedence over config file values
        if cli_config.patterns_file.is_some() {
            self.patterns_file = cli_config.patterns_file;
            self.automaton_path = None;
        }
        if cli_config.automaton_path.is_some() {
            self.automaton_path = cli_config.automaton_path;
            self.patterns_file = None;
        }
        if cli_config.hex_patterns {
            self.hex_patterns = true;
        }
        if cli_config.root_path != default_root_path() {
            self.root_path = cli_config.root_path;
        }
        if !cli_config.ignore_patterns.is_empty() {
            self.ignore_patterns = cli_config.ignore_patterns;
        }
        if cli_config.first_only {
            self.first_only = true;
        }
        if cli_config.stats_only {
            self.stats_only = true;
        }
        if cli_config.thread_count != default_thread_count() {
            self.thread_count = cli_config.thread_count;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }

    /// Resolves where patterns come from. A compiled automaton wins over a pattern file.
    pub fn pattern_source(&self) -> AcResult<PatternSource> {
        match (&self.automaton_path, &self.patterns_file) {
            (Some(path), _) => Ok(PatternSource::Automaton(path.clone())),
            (None, Some(path)) if self.hex_patterns => Ok(PatternSource::HexFile(path.clone())),
            (None, Some(path)) => Ok(PatternSource::StringFile(path.clone())),
            (None, None) => Err(AcError::config_error(
                "no patterns: set patterns_file or automaton_path",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        config_path
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = write_config(
            &dir,
            r#"
            patterns_file: "signatures.hex"
            hex_patterns: true
            root_path: "src"
            ignore_patterns: ["target/"]
            first_only: true
            stats_only: true
            thread_count: 4
            log_level: "debug"
        "#,
        );

        let config = ScanConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.patterns_file, Some(PathBuf::from("signatures.hex")));
        assert!(config.hex_patterns);
        assert_eq!(config.root_path, PathBuf::from("src"));
        assert_eq!(config.ignore_patterns, vec!["target/".to_string()]);
        assert!(config.first_only);
        assert!(config.stats_only);
        assert_eq!(config.thread_count, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.pattern_source().unwrap(),
            PatternSource::HexFile(PathBuf::from("signatures.hex"))
        );
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = write_config(&dir, "automaton_path: \"sigs.acs\"\n");

        let config = ScanConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.automaton_path, Some(PathBuf::from("sigs.acs")));
        assert_eq!(config.root_path, PathBuf::from("."));
        assert!(config.ignore_patterns.is_empty());
        assert!(!config.first_only);
        assert!(!config.stats_only);
        assert_eq!(config.thread_count, default_thread_count());
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_merge_with_cli() {
        let file_config = ScanConfig {
            automaton_path: Some(PathBuf::from("sigs.acs")),
            root_path: PathBuf::from("src"),
            ignore_patterns: vec!["target/".to_string()],
            thread_count: NonZeroUsize::new(4).unwrap(),
            log_level: "info".to_string(),
            ..ScanConfig::default()
        };

        let cli_config = ScanConfig {
            patterns_file: Some(PathBuf::from("words.txt")),
            first_only: true,
            ..ScanConfig::default()
        };

        let merged = file_config.merge_with_cli(cli_config);
        assert_eq!(merged.patterns_file, Some(PathBuf::from("words.txt"))); // CLI value
        assert_eq!(merged.automaton_path, None); // replaced by CLI pattern file
        assert_eq!(merged.root_path, PathBuf::from("src")); // File value
        assert_eq!(merged.ignore_patterns, vec!["target/".to_string()]); // File value
        assert!(merged.first_only); // CLI value
        assert_eq!(merged.log_level, "info"); // File value
        assert_eq!(
            merged.pattern_source().unwrap(),
            PatternSource::StringFile(PathBuf::from("words.txt"))
        );
    }

    #[test]
    fn test_missing_pattern_source() {
        let err = ScanConfig::default().pattern_source().unwrap_err();
        assert!(matches!(err, AcError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        let config_path = write_config(
            &dir,
            r#"
            root_path: []  # Should be string
            thread_count: "invalid"  # Should be number
        "#,
        );

        let result = ScanConfig::load_from(Some(&config_path));
        assert!(matches!(result, Err(AcError::ConfigError(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ScanConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }
}
