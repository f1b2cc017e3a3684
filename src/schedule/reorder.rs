//! # Ordering Buffer
//!
//! Reassembles out-of-order window completions into strictly increasing
//! submission order. Completions arriving early are parked until every
//! lower index has been released; a completion at the expected index
//! releases itself plus any now-contiguous parked successors.

use std::collections::BTreeMap;

use crate::error::Result;

/// Reorders `(index, outcome)` pairs into submission order.
pub struct OrderingBuffer<R> {
    /// The next index eligible for release (starts at 0)
    next_expected: u64,
    /// Completions that arrived ahead of `next_expected`
    pending: BTreeMap<u64, Result<R>>,
}

impl<R> OrderingBuffer<R> {
    /// Create an empty buffer expecting index 0 first.
    pub fn new() -> Self {
        Self {
            next_expected: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Accept one completion, returning the (possibly empty) run of
    /// in-order completions it makes releasable.
    ///
    /// Each index is accepted at most once; re-accepting a released or
    /// parked index would violate the scheduler's unique-index contract.
    pub fn accept(&mut self, index: u64, outcome: Result<R>) -> Vec<(u64, Result<R>)> {
        debug_assert!(
            index >= self.next_expected && !self.pending.contains_key(&index),
            "duplicate completion for window {index}"
        );
        self.pending.insert(index, outcome);

        let mut released = Vec::new();
        while let Some(outcome) = self.pending.remove(&self.next_expected) {
            released.push((self.next_expected, outcome));
            self.next_expected += 1;
        }
        released
    }

    /// The next index that would be released.
    pub fn next_expected(&self) -> u64 {
        self.next_expected
    }

    /// Number of completions parked out of order.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl<R> Default for OrderingBuffer<R> {
    fn default() -> Self {
        Self::new()
    }
}
