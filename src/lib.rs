//! # Winscan Library Root
//!
//! ## Role
//! The memory-bounded core of a genome window-scanning statistics tool:
//! per-window streams of numeric values are summarized with O(1) memory,
//! and windows are processed by a fixed worker pool behind a bounded,
//! backpressured queue whose results are released in genomic order.
//!
//! The crate deliberately knows nothing about variant files, window
//! boundary policy, or the statistic formulas themselves — callers supply
//! an ordered window stream and a per-window processing function, and
//! consume an ordered result stream.
//!
//! ## Module Structure
//! ```text
//! winscan
//! ├── config    # Validated scheduler settings
//! ├── error     # Unified error type
//! ├── stats     # Streaming statistics (Welford moments, P² quantiles)
//! └── schedule  # Bounded queue, worker pool, reordering, scheduler façade
//! ```
//!
//! ## Example
//! ```no_run
//! use winscan::config::SchedulerConfig;
//! use winscan::schedule::WindowScheduler;
//! use winscan::stats::RunningStats;
//!
//! # fn main() -> winscan::error::Result<()> {
//! let windows: Vec<Vec<f64>> = vec![vec![0.1, 0.9, 0.4], vec![0.2, 0.8]];
//!
//! let scheduler = WindowScheduler::new(SchedulerConfig::new(4, 8)?)?;
//! let results = scheduler.run(windows, |_index, values: Vec<f64>| {
//!     let mut stats = RunningStats::with_quantiles(&[50.0])?;
//!     for v in values {
//!         stats.push(v)?;
//!     }
//!     Ok((stats.mean(), stats.median()?))
//! })?;
//!
//! for entry in results {
//!     let (index, summary) = entry?;
//!     println!("window {index}: {summary:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod schedule;
pub mod stats;

pub use config::SchedulerConfig;
pub use error::{Result, WinscanError};
pub use schedule::WindowScheduler;
pub use stats::RunningStats;
