//! Worker pool
//!
//! A fixed-size set of threads drawing boxed tasks from a FIFO queue.
//!
//! `active_jobs` is incremented at submit time, not when a worker picks the
//! task up, so the coordinator's termination check cannot race between
//! submission and pickup. A worker decrements the counter after the task
//! body finishes and signals the idle condition when it reaches zero.
//!
//! Dropping the pool closes the queue; workers drain whatever is left and
//! exit, and the drop joins them. A panic inside a task is caught at the
//! pool boundary, logged, and counted as a completed task so the
//! coordinator never deadlocks on a lost decrement.

use crate::error::WorkerError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// How long `wait_idle` sleeps between re-checks of the job counter
const IDLE_RECHECK: Duration = Duration::from_millis(50);

/// State shared between the pool handle and its workers
struct PoolShared {
    /// Submitted-but-not-finished task count; shared so progress reporting
    /// can observe it without holding the pool
    active_jobs: Arc<AtomicUsize>,

    /// Guards the idle condition
    idle_lock: Mutex<()>,

    /// Signaled whenever `active_jobs` drops to zero
    all_done: Condvar,
}

impl PoolShared {
    fn finish_job(&self) {
        if self.active_jobs.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _guard = self.idle_lock.lock();
            self.all_done.notify_all();
        }
    }
}

/// Fixed-size worker pool over a FIFO task queue
pub struct ThreadPool {
    sender: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    shared: Arc<PoolShared>,
}

impl ThreadPool {
    /// Spawn `size` workers
    pub fn new(size: usize) -> Result<Self, WorkerError> {
        let (sender, receiver) = unbounded::<Task>();
        let shared = Arc::new(PoolShared {
            active_jobs: Arc::new(AtomicUsize::new(0)),
            idle_lock: Mutex::new(()),
            all_done: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = receiver.clone();
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("scan-{id}"))
                .spawn(move || worker_loop(id, receiver, shared))
                .map_err(|e| WorkerError::InitFailed {
                    id,
                    reason: e.to_string(),
                })?;
            workers.push(handle);
        }

        Ok(Self {
            sender: Some(sender),
            workers,
            shared,
        })
    }

    /// Enqueue a task. The job counter is incremented before the task is
    /// visible to any worker.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.active_jobs.fetch_add(1, Ordering::SeqCst);
        if let Some(sender) = &self.sender {
            if sender.send(Box::new(task)).is_err() {
                // Queue already closed; the task will never run
                self.shared.finish_job();
            }
        } else {
            self.shared.finish_job();
        }
    }

    /// Current submitted-but-not-finished task count
    pub fn active_jobs(&self) -> usize {
        self.shared.active_jobs.load(Ordering::SeqCst)
    }

    /// A shared handle to the job counter, for progress reporting
    pub fn active_jobs_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.shared.active_jobs)
    }

    /// Block until every submitted task has finished
    pub fn wait_idle(&self) {
        let mut guard = self.shared.idle_lock.lock();
        while self.shared.active_jobs.load(Ordering::SeqCst) != 0 {
            self.shared
                .all_done
                .wait_for(&mut guard, IDLE_RECHECK);
        }
    }

    /// Number of worker threads
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Closing the channel lets workers drain remaining tasks and exit
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("Worker thread panicked outside a task boundary");
            }
        }
    }
}

fn worker_loop(id: usize, receiver: Receiver<Task>, shared: Arc<PoolShared>) {
    debug!(worker = id, "Worker starting");
    while let Ok(task) = receiver.recv() {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!(worker = id, "Task panicked; treated as complete");
        }
        shared.finish_job();
    }
    debug!(worker = id, "Worker exiting");
}
