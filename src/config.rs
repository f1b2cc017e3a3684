//! # Scheduler Configuration
//!
//! Validated settings for the window scheduler. Validation happens
//! synchronously at construction so that a misconfigured pipeline fails
//! before any thread is spawned.

use std::num::NonZeroUsize;
use std::thread;

use crate::error::{Result, WinscanError};

/// Configuration for [`WindowScheduler`](crate::schedule::WindowScheduler).
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Number of worker threads (>= 1)
    pub n_threads: usize,
    /// Capacity of the bounded submission queue (>= 1)
    pub queue_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let n_threads = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self {
            n_threads,
            queue_capacity: 2 * n_threads,
        }
    }
}

impl SchedulerConfig {
    /// Create a configuration with explicit thread count and queue capacity.
    pub fn new(n_threads: usize, queue_capacity: usize) -> Result<Self> {
        let config = Self {
            n_threads,
            queue_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate all fields, failing with a configuration error on the first
    /// violation.
    pub fn validate(&self) -> Result<()> {
        if self.n_threads == 0 {
            return Err(WinscanError::config("n_threads must be >= 1"));
        }
        if self.queue_capacity == 0 {
            return Err(WinscanError::config("queue_capacity must be >= 1"));
        }
        Ok(())
    }
}
