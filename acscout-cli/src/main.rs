use acscout::{
    config::default_thread_count,
    scan::{load_automaton, scan},
    Automaton, ScanConfig, ScanOutput, TrieBuilder,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::{num::NonZeroUsize, path::PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliScanConfig {
    /// Pattern file, one pattern per line
    #[arg(short = 'p', long = "patterns", conflicts_with = "automaton")]
    patterns: Option<PathBuf>,

    /// Decode each pattern line as hex bytes
    #[arg(long)]
    hex: bool,

    /// Compiled automaton written by `acscout compile`
    #[arg(short = 'a', long)]
    automaton: Option<PathBuf>,

    /// Root directory to scan
    #[arg(short = 'd', long, default_value = ".")]
    root: PathBuf,

    /// Report only the first match in each file
    #[arg(long)]
    first: bool,

    /// Show only statistics, not matches
    #[arg(short, long)]
    stats: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Patterns to ignore (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Number of threads to use
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Configuration file layered over the default locations
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an automaton from a pattern file and write it to disk
    Compile {
        /// Pattern file, one pattern per line
        #[arg(short = 'p', long = "patterns")]
        patterns: PathBuf,

        /// Decode each pattern line as hex bytes
        #[arg(long)]
        hex: bool,

        /// Where to write the compiled automaton
        #[arg(short = 'o', long)]
        output: PathBuf,
    },

    /// Scan a directory tree for every pattern occurrence
    Scan(Box<CliScanConfig>),

    /// Print statistics about a compiled automaton
    Inspect {
        /// Compiled automaton to read
        #[arg(required = true)]
        automaton: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            patterns,
            hex,
            output,
        } => {
            init_tracing(verbosity_level(cli.verbose));

            let mut builder = TrieBuilder::new();
            if hex {
                builder.load_patterns(&patterns)?;
            } else {
                builder.load_strings(&patterns)?;
            }
            let pattern_count = builder.pattern_count();
            let automaton = builder.build();
            automaton
                .save(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;

            println!(
                "Compiled {} patterns into {} states: {}",
                pattern_count,
                automaton.state_count(),
                output.display().to_string().blue()
            );
            Ok(())
        }
        Commands::Scan(args) => {
            let args = *args;
            let cli_config = ScanConfig {
                patterns_file: args.patterns,
                hex_patterns: args.hex,
                automaton_path: args.automaton,
                root_path: args.root,
                ignore_patterns: args.ignore,
                first_only: args.first,
                stats_only: args.stats,
                thread_count: args.threads.unwrap_or_else(default_thread_count),
                ..ScanConfig::default()
            };
            let config = ScanConfig::load_from(args.config.as_deref())?.merge_with_cli(cli_config);

            if cli.verbose > 0 {
                init_tracing(verbosity_level(cli.verbose));
            } else {
                init_tracing(&config.log_level);
            }
            debug!("Effective scan config: {:?}", config);

            let automaton = load_automaton(&config)?;
            let output = scan(&automaton, &config)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_scan_results(&output, config.stats_only);
            }
            Ok(())
        }
        Commands::Inspect { automaton } => {
            init_tracing(verbosity_level(cli.verbose));

            let loaded = Automaton::load(&automaton)?;
            print_automaton_stats(&automaton, &loaded);
            Ok(())
        }
    }
}

fn verbosity_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Logs go to stderr so stdout stays parseable
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_scan_results(output: &ScanOutput, stats_only: bool) {
    if stats_only {
        println!(
            "Found {} matches in {} of {} files",
            output.total_matches, output.files_with_matches, output.files_searched
        );
        return;
    }

    for file_result in &output.file_results {
        if file_result.matches.is_empty() {
            continue;
        }
        println!("\n{}", file_result.path.display().to_string().blue());
        for m in &file_result.matches {
            println!(
                "{}: pattern {} ({} bytes)",
                format!("{}..{}", m.start, m.end()).green(),
                m.pattern,
                m.len
            );
        }
    }

    println!(
        "\nFound {} matches in {} of {} files",
        output.total_matches, output.files_with_matches, output.files_searched
    );
}

fn print_automaton_stats(path: &std::path::Path, automaton: &Automaton) {
    println!("{}", path.display().to_string().blue());
    println!("States:            {}", automaton.state_count());
    println!("Accepting states:  {}", automaton.accepting_count());
    println!("Longest pattern:   {} bytes", automaton.max_pattern_len());
    println!("Table size:        {} bytes", automaton.heap_size());
}
