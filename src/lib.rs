//! disk-walker - Concurrent Filesystem Inventory
//!
//! A tool for walking a rooted directory subtree with a fixed pool of
//! scanner threads, aggregating sizes up the ancestry chain, and rendering
//! reports over the result.
//!
//! # Features
//!
//! - **Parallel Scanning**: A worker pool (200 threads by default) drains a
//!   LIFO frontier of discovered directories, so the traversal behaves
//!   depth-first and the frontier stays small on deep trees.
//!
//! - **Order-Independent Totals**: A deferred-credit protocol keeps every
//!   directory's aggregate size correct no matter which order parent and
//!   child scans finish in.
//!
//! - **Resilient**: A directory that cannot be opened costs only its own
//!   subtree; the rest of the traversal continues and the failure is
//!   reflected in the exit status.
//!
//! - **Reports**: Box-drawing tree, path listings (raw or sorted), and
//!   per-directory summaries, each to stdout or the output file, optionally
//!   limited to a number of levels below the root.
//!
//! # Architecture
//!
//! ```text
//! frontier (LIFO) ──► producer loop ──► worker pool (N threads)
//!                                            │ scan directory (no lock)
//!                                            ▼
//!                                   merge under one lock:
//!                                   absorb credit → push children
//!                                   → credit ancestors → insert
//!                                            │
//!                                            ▼
//!                                completed map ──► reports
//! ```
//!
//! # Example
//!
//! ```bash
//! # Tree of /var/log to stdout
//! disk-walker /var/log report.txt -t
//!
//! # Whole volume, sorted path dump to file, info limited to 2 levels
//! disk-walker / inventory.txt -w 64 --skip /proc/ --skip /sys/ -psa -li 2
//! ```

pub mod config;
pub mod error;
pub mod probe;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod walker;

pub use config::{CliArgs, ReportKind, ReportRequest, WalkConfig};
pub use error::{Result, WalkerError};
pub use probe::{EntryKind, FileRecord};
pub use report::ReportGenerator;
pub use scanner::DirRecord;
pub use walker::{WalkCoordinator, WalkProgress, WalkResult};
