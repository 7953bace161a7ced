//! Aggregation coordinator - orchestrates the parallel traversal
//!
//! The coordinator runs a producer loop on the calling thread: it pops
//! directories off the frontier and submits scan-and-merge tasks to the
//! worker pool. Each task scans its directory outside any lock, then merges
//! the result under the single coordinator lock:
//!
//! 1. absorb any deferred credit left by children that finished first
//! 2. push discovered sub-directories onto the frontier
//! 3. credit the parent chain with this directory's total
//! 4. insert the record into the completed map
//!
//! Crediting walks the ancestry: every already-inserted ancestor takes the
//! delta into `sub_dir_total_size`/`total_size` directly; the first ancestor
//! not yet in the map takes it as a deferred credit and the walk stops
//! there. A credit absorbed at insertion is included in the record's own
//! contribution at step 3, so totals compose no matter how the scans
//! interleave.
//!
//! Termination: the frontier is empty and no submitted task is still
//! running. The producer waits on a condition variable signaled by every
//! merge, with a short timeout as a fallback for merges that push nothing.

use crate::config::WalkConfig;
use crate::error::{Result, ScanOutcome};
use crate::scanner::{self, DirRecord};
use crate::walker::frontier::{Frontier, FrontierEntry};
use crate::walker::pool::ThreadPool;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long the producer waits on the wakeup condvar before re-checking the
/// termination predicate
const PRODUCER_WAIT: Duration = Duration::from_millis(5);

/// Shared traversal state, guarded by the single coordinator lock
#[derive(Debug, Default)]
pub(crate) struct WalkState {
    /// Discovered-but-unscanned directories
    pub(crate) frontier: Frontier,

    /// Finished directories keyed by path
    pub(crate) completed: HashMap<String, DirRecord>,

    /// Size credits for parents that were not yet inserted when a child
    /// finished; drained at the parent's own insertion
    pub(crate) deferred: HashMap<String, u64>,
}

impl WalkState {
    /// Merge one scanned record. The caller holds the coordinator lock.
    pub(crate) fn merge(&mut self, mut record: DirRecord) {
        if let Some(credit) = self.deferred.remove(&record.path) {
            record.sub_dir_total_size += credit;
            record.total_size += credit;
        }

        for child in &record.sub_dirs {
            self.frontier.push(child.clone(), record.path.clone());
        }

        if !record.parent_path.is_empty() {
            self.credit(&record.parent_path, record.total_size);
        }

        self.completed.insert(record.path.clone(), record);
    }

    /// Apply a completed directory's total up its ancestry chain.
    fn credit(&mut self, parent: &str, delta: u64) {
        if delta == 0 {
            return;
        }
        let mut current = parent.to_string();
        loop {
            match self.completed.get_mut(&current) {
                Some(ancestor) => {
                    ancestor.sub_dir_total_size += delta;
                    ancestor.total_size += delta;
                    if ancestor.parent_path.is_empty() {
                        return;
                    }
                    current = ancestor.parent_path.clone();
                }
                None => {
                    *self.deferred.entry(current).or_insert(0) += delta;
                    return;
                }
            }
        }
    }
}

/// Counters updated by scan tasks, read by progress reporting
#[derive(Debug, Default)]
struct WalkCounters {
    dirs: AtomicU64,
    files: AtomicU64,
    bytes: AtomicU64,
    errors: AtomicU64,
}

/// Result of a completed traversal
#[derive(Debug)]
pub struct WalkResult {
    /// Final map from directory path to its record
    pub completed: HashMap<String, DirRecord>,

    /// Directories scanned
    pub dirs: u64,

    /// Files probed
    pub files: u64,

    /// Total bytes across probed files
    pub bytes: u64,

    /// Directory scans that failed
    pub errors: u64,

    /// Time taken for the traversal
    pub duration: Duration,
}

/// Progress information for display
#[derive(Debug, Clone, Default)]
pub struct WalkProgress {
    /// Directories scanned so far
    pub dirs: u64,

    /// Files probed so far
    pub files: u64,

    /// Bytes across probed files so far
    pub bytes: u64,

    /// Failed directory scans so far
    pub errors: u64,

    /// Current frontier length
    pub frontier_len: usize,

    /// Submitted-but-not-finished scan tasks
    pub active_jobs: usize,

    /// Total worker threads
    pub total_workers: usize,

    /// Elapsed time
    pub elapsed: Duration,
}

impl WalkProgress {
    /// Files probed per second
    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.files as f64 / secs
        } else {
            0.0
        }
    }

    /// Directories scanned per second
    pub fn dirs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.dirs as f64 / secs
        } else {
            0.0
        }
    }
}

/// Coordinates the parallel traversal
pub struct WalkCoordinator {
    config: Arc<WalkConfig>,
    pool: ThreadPool,
    state: Arc<Mutex<WalkState>>,
    wakeup: Arc<Condvar>,
    counters: Arc<WalkCounters>,
}

impl WalkCoordinator {
    /// Create a coordinator and spawn its worker pool
    pub fn new(config: WalkConfig) -> Result<Self> {
        let pool = ThreadPool::new(config.worker_count)?;
        Ok(Self {
            config: Arc::new(config),
            pool,
            state: Arc::new(Mutex::new(WalkState::default())),
            wakeup: Arc::new(Condvar::new()),
            counters: Arc::new(WalkCounters::default()),
        })
    }

    /// Run the traversal to completion
    pub fn run(&self) -> WalkResult {
        let start = Instant::now();

        info!(
            root = %self.config.root,
            workers = self.config.worker_count,
            "Starting traversal"
        );

        let mut guard = self.state.lock();
        guard.frontier.push(self.config.root.clone(), String::new());

        loop {
            if let Some(entry) = guard.frontier.pop() {
                drop(guard);
                self.submit_scan(entry);
                guard = self.state.lock();
                continue;
            }
            if self.pool.active_jobs() == 0 {
                break;
            }
            self.wakeup.wait_for(&mut guard, PRODUCER_WAIT);
        }
        drop(guard);

        // The predicate already guarantees idleness; this is the formal wait
        self.pool.wait_idle();

        let mut state = self.state.lock();
        debug_assert!(state.frontier.is_empty());
        debug_assert!(state.deferred.is_empty());
        let completed = std::mem::take(&mut state.completed);
        drop(state);

        let duration = start.elapsed();
        let dirs = self.counters.dirs.load(Ordering::Relaxed);
        let files = self.counters.files.load(Ordering::Relaxed);
        let bytes = self.counters.bytes.load(Ordering::Relaxed);
        let errors = self.counters.errors.load(Ordering::Relaxed);

        info!(
            dirs = dirs,
            files = files,
            bytes = bytes,
            errors = errors,
            duration_ms = duration.as_millis() as u64,
            "Traversal complete"
        );

        WalkResult {
            completed,
            dirs,
            files,
            bytes,
            errors,
            duration,
        }
    }

    /// Run the traversal, invoking `callback` with a progress snapshot every
    /// 100 ms until completion
    pub fn run_with_progress<F>(&self, callback: F) -> WalkResult
    where
        F: Fn(WalkProgress) + Send + 'static,
    {
        let start = Instant::now();
        let done = Arc::new(AtomicBool::new(false));

        let thread_done = Arc::clone(&done);
        let counters = Arc::clone(&self.counters);
        let state = Arc::clone(&self.state);
        let active_jobs = self.pool.active_jobs_counter();
        let total_workers = self.pool.size();

        let reporter = thread::spawn(move || {
            while !thread_done.load(Ordering::Relaxed) {
                let frontier_len = state.lock().frontier.len();
                callback(WalkProgress {
                    dirs: counters.dirs.load(Ordering::Relaxed),
                    files: counters.files.load(Ordering::Relaxed),
                    bytes: counters.bytes.load(Ordering::Relaxed),
                    errors: counters.errors.load(Ordering::Relaxed),
                    frontier_len,
                    active_jobs: active_jobs.load(Ordering::Relaxed),
                    total_workers,
                    elapsed: start.elapsed(),
                });
                thread::sleep(Duration::from_millis(100));
            }
        });

        let result = self.run();

        done.store(true, Ordering::SeqCst);
        let _ = reporter.join();

        result
    }

    /// Submit one scan-and-merge task for a frontier entry
    fn submit_scan(&self, entry: FrontierEntry) {
        let config = Arc::clone(&self.config);
        let state = Arc::clone(&self.state);
        let wakeup = Arc::clone(&self.wakeup);
        let counters = Arc::clone(&self.counters);

        self.pool.submit(move || {
            let outcome = scan_and_merge(&entry, &config, &state, &counters);
            match &outcome {
                ScanOutcome::Success { path, files, subdirs } => {
                    debug!(path = %path, files = files, subdirs = subdirs, "Directory scanned");
                }
                ScanOutcome::Failed { path, error } => {
                    warn!(path = %path, error = %error, "Directory scan failed");
                }
            }
            wakeup.notify_one();
        });
    }
}

/// Scan a directory outside the lock, then merge the record under it.
///
/// A failed scan records the error and touches neither the completed map nor
/// the parent's totals; the subtree is simply absent from the result.
fn scan_and_merge(
    entry: &FrontierEntry,
    config: &WalkConfig,
    state: &Mutex<WalkState>,
    counters: &WalkCounters,
) -> ScanOutcome {
    match scanner::scan(&entry.path, &entry.parent_path, &config.skip_dirs) {
        Ok(record) => {
            counters.dirs.fetch_add(1, Ordering::Relaxed);
            counters.files.fetch_add(record.num_files, Ordering::Relaxed);
            counters
                .bytes
                .fetch_add(record.file_total_size, Ordering::Relaxed);

            let outcome = ScanOutcome::Success {
                path: record.path.clone(),
                files: record.files.len(),
                subdirs: record.sub_dirs.len(),
            };
            state.lock().merge(record);
            outcome
        }
        Err(error) => {
            counters.errors.fetch_add(1, Ordering::Relaxed);
            ScanOutcome::Failed {
                path: entry.path.clone(),
                error,
            }
        }
    }
}
