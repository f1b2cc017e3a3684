//! # Window Scheduler
//!
//! The façade over the scheduling machinery: a producer thread pulls
//! windows off the caller's stream in genomic order, assigns submission
//! indices, and pushes jobs through the bounded queue (blocking when
//! workers lag); the worker pool executes jobs; the caller consumes a
//! [`ResultStream`] that releases results in strictly increasing index
//! order via the ordering buffer.
//!
//! Failure policy is fail-fast per window: the first error surfaces at
//! the position its window would have been released, after which the
//! scheduler stops accepting submissions, drains in-flight work, and the
//! stream terminates.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::config::SchedulerConfig;
use crate::error::{Result, WinscanError};
use crate::schedule::pool::{Completion, WorkItem, WorkerPool};
use crate::schedule::queue::BoundedWorkQueue;
use crate::schedule::reorder::OrderingBuffer;

/// Orchestrates backpressured, order-preserving window processing.
pub struct WindowScheduler {
    config: SchedulerConfig,
}

impl WindowScheduler {
    /// Create a scheduler, validating the configuration synchronously.
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Process `windows` with `process`, returning the ordered result
    /// stream.
    ///
    /// Windows must arrive in increasing genomic order; the scheduler
    /// assigns submission indices 0, 1, 2, … as it pulls them. `process`
    /// runs on worker threads, one window per invocation, and may be
    /// called for several windows concurrently.
    pub fn run<W, I, R, F>(&self, windows: I, process: F) -> Result<ResultStream<R>>
    where
        W: Send + 'static,
        I: IntoIterator<Item = W>,
        I::IntoIter: Send + 'static,
        R: Send + 'static,
        F: Fn(u64, W) -> Result<R> + Send + Sync + 'static,
    {
        let queue = Arc::new(BoundedWorkQueue::new(self.config.queue_capacity)?);
        // Completion slack covers everything that can be in flight at once
        // (queued + executing); beyond that, a lagging consumer throttles
        // the workers, and through the queue, the producer.
        let (completions_tx, completions_rx) =
            mpsc::sync_channel(self.config.queue_capacity + self.config.n_threads);
        let stop = Arc::new(AtomicBool::new(false));

        debug!(
            n_threads = self.config.n_threads,
            queue_capacity = self.config.queue_capacity,
            "starting window scheduler"
        );

        let pool = WorkerPool::spawn(
            self.config.n_threads,
            Arc::clone(&queue),
            completions_tx,
        )?;

        let producer = {
            let queue = Arc::clone(&queue);
            let stop = Arc::clone(&stop);
            let process = Arc::new(process);
            let windows = windows.into_iter();
            thread::Builder::new()
                .name("winscan-producer".to_string())
                .spawn(move || {
                    let mut submitted = 0u64;
                    for window in windows {
                        if stop.load(Ordering::Relaxed) {
                            break;
                        }
                        let index = submitted;
                        let process = Arc::clone(&process);
                        let item = WorkItem::new(index, move || process(index, window));
                        if queue.push(item).is_err() {
                            // Queue closed mid-submission: shutdown already
                            // underway, the item was not enqueued.
                            break;
                        }
                        submitted += 1;
                    }
                    queue.close();
                    debug!(submitted, "producer finished");
                })
        };

        let producer = match producer {
            Ok(handle) => handle,
            Err(e) => {
                queue.close();
                pool.join();
                return Err(WinscanError::config(format!(
                    "failed to spawn producer thread: {e}"
                )));
            }
        };

        Ok(ResultStream {
            completions: completions_rx,
            reorder: OrderingBuffer::new(),
            ready: VecDeque::new(),
            queue,
            stop,
            producer: Some(producer),
            pool: Some(pool),
            done: false,
        })
    }
}

/// Lazy, finite stream of `(window index, result)` pairs in strictly
/// increasing index order.
///
/// Consuming the stream may block until the next in-order result is
/// available. Dropping it stops the pipeline and joins all threads.
pub struct ResultStream<R> {
    completions: Receiver<Completion<R>>,
    reorder: OrderingBuffer<R>,
    /// In-order completions released by the buffer but not yet yielded
    ready: VecDeque<(u64, Result<R>)>,
    queue: Arc<BoundedWorkQueue<WorkItem<R>>>,
    stop: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
    pool: Option<WorkerPool>,
    done: bool,
}

impl<R> ResultStream<R> {
    /// Cooperative cancellation: the producer stops submitting, workers
    /// finish what is already queued or executing, and the stream yields
    /// the remaining in-order completions before terminating.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.queue.close();
    }

    /// Stop and join every thread. Idempotent.
    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.queue.close();
        if let Some(producer) = self.producer.take() {
            if producer.join().is_err() {
                debug!("producer thread panicked");
            }
        }
        if let Some(pool) = self.pool.take() {
            // Keep receiving so no worker stays blocked publishing a
            // completion; recv fails once every worker has exited.
            while self.completions.recv().is_ok() {}
            pool.join();
        }
    }
}

impl<R> Iterator for ResultStream<R> {
    type Item = Result<(u64, R)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some((index, outcome)) = self.ready.pop_front() {
                return match outcome {
                    Ok(result) => Some(Ok((index, result))),
                    Err(e) => {
                        // Fail fast: surface the error at this window's
                        // release position, discard later completions,
                        // and drain in-flight work before propagating.
                        debug!(index, "window failed, stopping scheduler");
                        self.done = true;
                        self.ready.clear();
                        self.shutdown();
                        Some(Err(e))
                    }
                };
            }
            match self.completions.recv() {
                Ok(completion) => {
                    let released = self.reorder.accept(completion.index, completion.outcome);
                    self.ready.extend(released);
                }
                Err(_) => {
                    // Every worker has exited; the ordered prefix is
                    // complete and the stream ends.
                    self.done = true;
                    self.shutdown();
                    return None;
                }
            }
        }
    }
}

impl<R> Drop for ResultStream<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
