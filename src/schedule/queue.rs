//! # Bounded Work Queue
//!
//! The backpressure primitive: a fixed-capacity FIFO whose `push` blocks
//! the producer while the queue is full. Work is never dropped and never
//! rejected for being over capacity — a fast producer is throttled to
//! worker throughput instead of growing memory without bound.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use tracing::debug;

use crate::error::{Result, WinscanError};

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Fixed-capacity blocking FIFO shared between one producer and the
/// worker pool.
pub struct BoundedWorkQueue<T> {
    capacity: usize,
    inner: Mutex<Inner<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedWorkQueue<T> {
    /// Create a queue with capacity `capacity >= 1`.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(WinscanError::config("queue capacity must be >= 1"));
        }
        Ok(Self {
            capacity,
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    /// Enqueue one item, blocking while the queue is at capacity.
    ///
    /// Fails with `Closed` (without enqueueing) once the queue has been
    /// closed, including for producers already blocked in `push` when the
    /// close lands.
    pub fn push(&self, item: T) -> Result<()> {
        let mut inner = self.inner.lock().expect("work queue mutex poisoned");
        loop {
            if inner.closed {
                return Err(WinscanError::Closed);
            }
            if inner.items.len() < self.capacity {
                break;
            }
            inner = self
                .not_full
                .wait(inner)
                .expect("work queue mutex poisoned");
        }
        inner.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue the next item, blocking while the queue is empty and open.
    ///
    /// Items still queued at close time are drained; returns `None` once
    /// the queue is closed and empty.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock().expect("work queue mutex poisoned");
        loop {
            if let Some(item) = inner.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            inner = self
                .not_empty
                .wait(inner)
                .expect("work queue mutex poisoned");
        }
    }

    /// Close the queue: no further `push` succeeds, pending items drain,
    /// and all blocked threads wake. Idempotent.
    pub fn close(&self) {
        let mut inner = self.inner.lock().expect("work queue mutex poisoned");
        if !inner.closed {
            inner.closed = true;
            debug!(pending = inner.items.len(), "work queue closed");
        }
        drop(inner);
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Current number of pending items (never exceeds capacity).
    pub fn len(&self) -> usize {
        self.inner.lock().expect("work queue mutex poisoned").items.len()
    }

    /// True when no items are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity this queue was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
