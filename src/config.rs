//! Configuration types for disk-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - The report-flag table and its lenient parser
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// Compiled-in skip list. Any directory whose full path *contains* one of
/// these substrings is excluded from traversal along with its subtree; note
/// that the match is containment, not a strict prefix, so `/mnt/` also
/// matches `/x/mnt//y`. Extend here at build time, or per run with `--skip`.
pub const SKIP_DIRECTORIES: &[&str] = &["/mnt/"];

/// Default scanner thread count
pub const DEFAULT_WORKERS: usize = 200;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Concurrent filesystem inventory with tree and summary reports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "disk-walker",
    version,
    about = "Concurrent filesystem inventory with tree and summary reports",
    long_about = "Walks a directory subtree with a pool of scanner threads, aggregates sizes up \
                  the ancestry chain, and renders reports over the completed result.\n\n\
                  Report flags follow the two positional arguments and may be combined; the `s` \
                  variants write to the output file instead of stdout.",
    after_help = "REPORT FLAGS:\n    \
        -t   / -ts      tree to stdout / output file\n    \
        -p   / -ps      paths to stdout / output file\n    \
        -pa  / -psa     sorted paths to stdout / output file\n    \
        -i   / -is      per-directory info to stdout / output file\n    \
        -lt N / -lts N  tree limited to N levels below the root\n    \
        -li N / -lis N  info limited to N levels below the root\n\n\
        EXAMPLES:\n    \
        disk-walker /var/log report.txt -t\n    \
        disk-walker / inventory.txt -w 64 --skip /proc/ --skip /sys/ -psa -lt 2"
)]
pub struct CliArgs {
    /// Root directory to inventory
    #[arg(value_name = "ROOT")]
    pub root: String,

    /// Output file for the `s` report variants
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Number of scanner threads
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS, value_name = "NUM")]
    pub workers: usize,

    /// Skip directories whose path contains this substring (can be repeated)
    #[arg(long = "skip", value_name = "SUBSTRING", action = clap::ArgAction::Append)]
    pub skip: Vec<String>,

    /// Quiet mode - suppress progress and summary output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (show traversal logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Report flags (see REPORT FLAGS below)
    #[arg(
        value_name = "REPORTS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub reports: Vec<String>,
}

/// Which view a report renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Box-drawing tree of directories and files
    Tree,

    /// One directory path per line, map order
    Paths,

    /// One directory path per line, lexicographic order
    SortedPaths,

    /// Per-directory info blocks
    Info,
}

/// One requested rendering of the completed map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest {
    /// Which view to render
    pub kind: ReportKind,

    /// Write to the output file instead of stdout
    pub to_file: bool,

    /// Limit to this many levels below the root
    pub max_depth: Option<usize>,
}

impl ReportRequest {
    /// Parse the trailing report arguments against the flag table.
    ///
    /// Unrecognized flags - including depth flags whose level argument is
    /// missing or not a number - are collected separately so the caller can
    /// log them and still run the rest; the exit status reflects the
    /// failure.
    pub fn parse_args(args: &[String]) -> (Vec<ReportRequest>, Vec<String>) {
        let mut requests = Vec::new();
        let mut unknown = Vec::new();
        let mut iter = args.iter().peekable();

        while let Some(arg) = iter.next() {
            let (kind, to_file, wants_depth) = match arg.as_str() {
                "-t" => (ReportKind::Tree, false, false),
                "-ts" => (ReportKind::Tree, true, false),
                "-p" => (ReportKind::Paths, false, false),
                "-ps" => (ReportKind::Paths, true, false),
                "-pa" => (ReportKind::SortedPaths, false, false),
                "-psa" => (ReportKind::SortedPaths, true, false),
                "-i" => (ReportKind::Info, false, false),
                "-is" => (ReportKind::Info, true, false),
                "-lt" => (ReportKind::Tree, false, true),
                "-lts" => (ReportKind::Tree, true, true),
                "-li" => (ReportKind::Info, false, true),
                "-lis" => (ReportKind::Info, true, true),
                other => {
                    unknown.push(other.to_string());
                    continue;
                }
            };

            let max_depth = if wants_depth {
                match iter.peek().and_then(|n| n.parse::<usize>().ok()) {
                    Some(levels) => {
                        iter.next();
                        Some(levels)
                    }
                    None => {
                        unknown.push(arg.clone());
                        continue;
                    }
                }
            } else {
                None
            };

            requests.push(ReportRequest {
                kind,
                to_file,
                max_depth,
            });
        }

        (requests, unknown)
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Traversal root, trailing separator trimmed
    pub root: String,

    /// Output file for the `s` report variants
    pub output_path: PathBuf,

    /// Number of scanner threads
    pub worker_count: usize,

    /// Skip substrings: the compiled-in list plus any `--skip` additions
    pub skip_dirs: Vec<String>,

    /// Show the progress spinner and summary
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,

    /// Requested reports, in flag order
    pub reports: Vec<ReportRequest>,

    /// Report flags that did not parse; already logged, kept for the exit
    /// status
    pub unknown_flags: Vec<String>,
}

impl WalkConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        let root = normalize_root(&args.root);

        // The root must be an openable directory up front; failures on
        // deeper directories are soft, the root is not.
        fs::read_dir(&root).map_err(|e| ConfigError::RootNotReadable {
            path: root.clone(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = args.output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(ConfigError::InvalidOutputPath {
                    path: args.output.clone(),
                    reason: format!("Parent directory '{}' does not exist", parent.display()),
                });
            }
        }

        let (reports, unknown_flags) = ReportRequest::parse_args(&args.reports);

        let mut skip_dirs: Vec<String> =
            SKIP_DIRECTORIES.iter().map(|s| s.to_string()).collect();
        skip_dirs.extend(args.skip);

        Ok(Self {
            root,
            output_path: args.output,
            worker_count: args.workers,
            skip_dirs,
            show_progress: !args.quiet,
            verbose: args.verbose,
            reports,
            unknown_flags,
        })
    }
}

/// Trim a trailing separator so joined child paths stay canonical; the
/// filesystem root stays as-is.
fn normalize_root(root: &str) -> String {
    if root.len() > 1 {
        root.trim_end_matches('/').to_string()
    } else {
        root.to_string()
    }
}
