//! # Streaming Statistics
//!
//! O(1)-memory summaries of unbounded value streams: exact moments via
//! Welford's online update, approximate quantiles via the P² algorithm.
//! One accumulator is owned by exactly one window job at a time; nothing
//! here is shared across threads.

pub mod quantile;
pub mod running;

pub use quantile::QuantileTracker;
pub use running::RunningStats;
