//! # Worker Pool
//!
//! A fixed set of long-lived worker threads draining the bounded queue.
//! Each worker dequeues a [`WorkItem`], runs its job with panics contained,
//! and publishes a [`Completion`] on the shared channel. A job failure or
//! panic becomes that window's error; it never takes a worker down.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::error::{Result, WinscanError};
use crate::schedule::queue::BoundedWorkQueue;

/// One window's unit of work: the submission index plus the job closure
/// over that window's values.
pub struct WorkItem<R> {
    /// Genomic window sequence number, assigned by the producer
    pub index: u64,
    /// Deferred per-window computation
    pub job: Box<dyn FnOnce() -> Result<R> + Send>,
}

impl<R> WorkItem<R> {
    /// Wrap a job closure for window `index`.
    pub fn new(index: u64, job: impl FnOnce() -> Result<R> + Send + 'static) -> Self {
        Self {
            index,
            job: Box::new(job),
        }
    }
}

/// The terminal state of one window's work: completed or failed.
pub struct Completion<R> {
    /// The window's submission index
    pub index: u64,
    /// The job's result, or the error it failed with
    pub outcome: Result<R>,
}

/// Fixed pool of worker threads executing window jobs.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `n_threads >= 1` workers that drain `queue` until it is
    /// closed and empty, publishing each completion on `completions`.
    pub fn spawn<R: Send + 'static>(
        n_threads: usize,
        queue: Arc<BoundedWorkQueue<WorkItem<R>>>,
        completions: SyncSender<Completion<R>>,
    ) -> Result<Self> {
        if n_threads == 0 {
            return Err(WinscanError::config("worker pool needs n_threads >= 1"));
        }

        let mut handles = Vec::with_capacity(n_threads);
        for worker_id in 0..n_threads {
            let worker_queue = Arc::clone(&queue);
            let worker_completions = completions.clone();
            let spawned = thread::Builder::new()
                .name(format!("winscan-worker-{worker_id}"))
                .spawn(move || worker_loop(worker_id, &worker_queue, &worker_completions));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Release any workers already spawned before failing.
                    queue.close();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(WinscanError::config(format!(
                        "failed to spawn worker thread: {e}"
                    )));
                }
            }
        }
        // The pool's clones keep the channel open until every worker exits;
        // the caller-side sender is dropped here.
        drop(completions);

        Ok(Self { handles })
    }

    /// Number of worker threads.
    pub fn n_threads(&self) -> usize {
        self.handles.len()
    }

    /// Wait for all workers to exit. Call after closing the queue;
    /// queued and executing items drain first.
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                // Worker bodies contain job panics, so this indicates a
                // bug in the pool itself rather than in a job.
                warn!("worker thread panicked outside a job");
            }
        }
    }
}

fn worker_loop<R>(
    worker_id: usize,
    queue: &BoundedWorkQueue<WorkItem<R>>,
    completions: &SyncSender<Completion<R>>,
) {
    debug!(worker_id, "worker started");
    while let Some(item) = queue.pop() {
        let index = item.index;
        let outcome = match panic::catch_unwind(AssertUnwindSafe(item.job)) {
            Ok(result) => result,
            Err(payload) => Err(WinscanError::window(index, panic_message(payload.as_ref()))),
        };
        if completions.send(Completion { index, outcome }).is_err() {
            // Consumer hung up; nothing left to publish to.
            break;
        }
    }
    debug!(worker_id, "worker exiting");
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("job panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("job panicked: {s}")
    } else {
        "job panicked".to_string()
    }
}
