use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::processor::FileProcessor;
use crate::automaton::Automaton;
use crate::builder::TrieBuilder;
use crate::config::{PatternSource, ScanConfig};
use crate::errors::{AcError, AcResult};
use crate::results::{FileResult, ScanOutput};

/// Builds or loads the automaton a config points at
pub fn load_automaton(config: &ScanConfig) -> AcResult<Automaton> {
    match config.pattern_source()? {
        PatternSource::Automaton(path) => Automaton::load(&path),
        PatternSource::HexFile(path) => {
            let mut builder = TrieBuilder::new();
            builder.load_patterns(&path)?;
            Ok(builder.build())
        }
        PatternSource::StringFile(path) => {
            let mut builder = TrieBuilder::new();
            builder.load_strings(&path)?;
            Ok(builder.build())
        }
    }
}

/// Scans every file under `config.root_path` concurrently against one automaton
pub fn scan(automaton: &Automaton, config: &ScanConfig) -> AcResult<ScanOutput> {
    info!(
        "Starting scan of {} with {} states",
        config.root_path.display(),
        automaton.state_count()
    );

    if !config.root_path.exists() {
        return Err(AcError::file_not_found(&config.root_path));
    }

    let processor = FileProcessor::new(automaton, config.first_only);
    let metrics = processor.metrics().clone();

    // Set up file walker with ignore patterns
    let mut walker = WalkBuilder::new(&config.root_path);
    walker
        .hidden(true)
        .ignore(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true);

    let mut overrides = ignore::overrides::OverrideBuilder::new(&config.root_path);
    for pattern in &config.ignore_patterns {
        overrides
            .add(&format!("!{pattern}"))
            .map_err(|e| AcError::config_error(format!("invalid ignore pattern: {e}")))?;
    }
    walker.overrides(
        overrides
            .build()
            .map_err(|e| AcError::config_error(format!("invalid ignore pattern: {e}")))?,
    );

    let files: Vec<PathBuf> = walker
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .collect();

    debug!("Found {} files to scan", files.len());

    let thread_count = config.thread_count.get();
    let chunk_size = (files.len() / thread_count).clamp(16, 256);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .map_err(|e| AcError::config_error(format!("failed to start thread pool: {e}")))?;

    let file_results: Vec<FileResult> = pool.install(|| {
        files
            .par_chunks(chunk_size)
            .flat_map(|chunk| {
                chunk
                    .iter()
                    .filter_map(|path| match processor.process_file(path) {
                        Ok(result) => Some(result),
                        Err(e) => {
                            warn!("Skipping {}: {}", path.display(), e);
                            None
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    });

    let mut result = ScanOutput::new();
    for file_result in file_results {
        result.add_file_result(file_result);
    }
    result.sort_by_path();

    metrics.log_stats();

    info!(
        "Scan complete. Found {} matches in {} of {} files",
        result.total_matches, result.files_with_matches, result.files_searched
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;
    use tempfile::tempdir;

    fn config_for(root: &std::path::Path) -> ScanConfig {
        ScanConfig {
            root_path: root.to_path_buf(),
            thread_count: NonZeroUsize::new(2).unwrap(),
            ..ScanConfig::default()
        }
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "he said she sells").unwrap();
        std::fs::write(dir.path().join("b.txt"), "nothing here").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/c.bin"), [0u8, b's', b'h', b'e']).unwrap();

        let mut builder = TrieBuilder::new();
        builder.add_strings(["he", "she"]);
        let automaton = builder.build();

        let result = scan(&automaton, &config_for(dir.path())).unwrap();
        assert_eq!(result.files_searched, 3);
        assert_eq!(result.files_with_matches, 3);
        // a.txt: he, she+he; b.txt: "he" inside "here"; c.bin: she+he
        assert_eq!(result.total_matches, 6);
        assert!(result.file_results[0].path.ends_with("a.txt"));
    }

    #[test]
    fn test_scan_honours_ignore_patterns() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("keep.txt"), "needle").unwrap();
        std::fs::write(dir.path().join("skip.log"), "needle").unwrap();

        let mut builder = TrieBuilder::new();
        builder.add_string("needle");
        let automaton = builder.build();

        let mut config = config_for(dir.path());
        config.ignore_patterns = vec!["*.log".to_string()];
        let result = scan(&automaton, &config).unwrap();
        assert_eq!(result.files_searched, 1);
        assert!(result.file_results[0].path.ends_with("keep.txt"));
    }

    #[test]
    fn test_scan_missing_root() {
        let automaton = TrieBuilder::new().build();
        let config = config_for(std::path::Path::new("/nonexistent/root"));
        assert!(matches!(
            scan(&automaton, &config),
            Err(AcError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_automaton_from_sources() {
        let dir = tempdir().unwrap();
        let strings = dir.path().join("words.txt");
        std::fs::write(&strings, "alpha\nbeta\n").unwrap();

        let mut config = config_for(dir.path());
        config.patterns_file = Some(strings);
        let built = load_automaton(&config).unwrap();
        assert!(built.is_match("the beta test"));

        let compiled = dir.path().join("words.acs");
        built.save(&compiled).unwrap();
        config.automaton_path = Some(compiled);
        assert_eq!(load_automaton(&config).unwrap(), built);

        assert!(load_automaton(&ScanConfig::default()).is_err());
    }
}
