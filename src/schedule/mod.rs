//! # Window Scheduling
//!
//! Concurrent, order-preserving window processing under bounded memory.
//! A single producer submits windows through a fixed-capacity blocking
//! queue (backpressure), a fixed pool of workers executes them, and a
//! reordering stage releases results in genomic submission order even
//! though completion order is non-deterministic.

pub mod pool;
pub mod queue;
pub mod reorder;
pub mod scheduler;

pub use pool::{Completion, WorkItem, WorkerPool};
pub use queue::BoundedWorkQueue;
pub use reorder::OrderingBuffer;
pub use scheduler::{ResultStream, WindowScheduler};
