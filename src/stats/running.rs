//! # Running Window Statistics
//!
//! `RunningStats` summarizes one window's value stream with O(1) memory:
//! exact count/mean/variance via Welford's online update, exact min/max,
//! and one [`QuantileTracker`] per configured quantile level.
//!
//! An instance is owned by exactly one window job at a time; it is `Send`
//! but deliberately offers no interior synchronization.

use crate::error::{Result, WinscanError};
use crate::stats::quantile::QuantileTracker;

/// Streaming accumulator for a single window's values.
#[derive(Clone, Debug)]
pub struct RunningStats {
    /// Successful (finite) pushes since construction or the last clear
    count: u64,
    /// Welford running mean
    mean: f64,
    /// Welford sum of squared deltas (M2)
    sum_sq_delta: f64,
    /// Smallest value seen
    min: f64,
    /// Largest value seen
    max: f64,
    /// Configured quantile levels (percent, ascending) with their trackers
    quantiles: Vec<(f64, QuantileTracker)>,
}

impl RunningStats {
    /// Create an accumulator tracking moments only (no quantiles).
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            sum_sq_delta: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            quantiles: Vec::new(),
        }
    }

    /// Create an accumulator additionally tracking the given quantile
    /// levels, each a percent in the open interval (0, 100). Duplicate
    /// levels are rejected.
    pub fn with_quantiles(levels: &[f64]) -> Result<Self> {
        let mut quantiles: Vec<(f64, QuantileTracker)> = Vec::with_capacity(levels.len());
        for &level in levels {
            if !level.is_finite() || level <= 0.0 || level >= 100.0 {
                return Err(WinscanError::config(format!(
                    "quantile level must lie in (0, 100), got {level}"
                )));
            }
            if quantiles.iter().any(|(l, _)| *l == level) {
                return Err(WinscanError::config(format!(
                    "duplicate quantile level {level}"
                )));
            }
            quantiles.push((level, QuantileTracker::new(level / 100.0)?));
        }
        quantiles.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut stats = Self::new();
        stats.quantiles = quantiles;
        Ok(stats)
    }

    /// Ingest one observation. Non-finite values (NaN, ±infinity) are
    /// rejected without mutating any state.
    pub fn push(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(WinscanError::invalid_value(format!(
                "non-finite observation {value}"
            )));
        }

        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.sum_sq_delta += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        for (_, tracker) in &mut self.quantiles {
            tracker.push(value);
        }
        Ok(())
    }

    /// Number of successful pushes since construction or the last clear.
    pub fn num_data_values(&self) -> u64 {
        self.count
    }

    /// Exact running mean, `None` for an empty accumulator.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Exact population variance (`M2 / n`), `None` when empty.
    pub fn variance(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_sq_delta / self.count as f64)
    }

    /// Exact sample variance (`M2 / (n - 1)`), `None` for fewer than two
    /// observations.
    pub fn sample_variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.sum_sq_delta / (self.count - 1) as f64)
    }

    /// Population standard deviation, `None` when empty.
    pub fn standard_deviation(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Sample standard deviation, `None` for fewer than two observations.
    pub fn sample_standard_deviation(&self) -> Option<f64> {
        self.sample_variance().map(f64::sqrt)
    }

    /// Smallest observation, `None` when empty.
    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    /// Largest observation, `None` when empty.
    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    /// Current estimate for a configured quantile level.
    ///
    /// Fails with `UnknownQuantile` if `level` was not supplied at
    /// construction; returns `Ok(None)` while the accumulator is empty.
    pub fn quantile(&self, level: f64) -> Result<Option<f64>> {
        self.quantiles
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, tracker)| tracker.estimate())
            .ok_or(WinscanError::UnknownQuantile { level })
    }

    /// Shorthand for `quantile(50.0)`.
    pub fn median(&self) -> Result<Option<f64>> {
        self.quantile(50.0)
    }

    /// All configured levels with their current estimates, ascending by
    /// level; empty-accumulator entries are `None`.
    pub fn all_quantiles(&self) -> Vec<(f64, Option<f64>)> {
        self.quantiles
            .iter()
            .map(|(level, tracker)| (*level, tracker.estimate()))
            .collect()
    }

    /// Reset to the just-constructed state with the same configured levels.
    pub fn clear(&mut self) {
        self.count = 0;
        self.mean = 0.0;
        self.sum_sq_delta = 0.0;
        self.min = f64::INFINITY;
        self.max = f64::NEG_INFINITY;
        for (_, tracker) in &mut self.quantiles {
            tracker.clear();
        }
    }
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}
