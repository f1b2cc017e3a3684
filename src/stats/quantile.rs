//! # P² Quantile Estimation
//!
//! Single-quantile streaming estimator using the P² (piecewise-parabolic)
//! algorithm: five markers track the minimum, the p/2, p, and (1+p)/2
//! percentiles, and the maximum of the stream seen so far. Memory is a
//! fixed pair of five-slot records regardless of stream length.
//!
//! The tracker is exact while it has seen at most five observations (they
//! are stored directly, sorted); from the sixth observation on it maintains
//! an approximation whose error shrinks as the stream grows.

use crate::error::{Result, WinscanError};

/// Streaming estimator for a single quantile probability `p` in (0, 1).
#[derive(Clone, Debug)]
pub struct QuantileTracker {
    /// Quantile probability in (0, 1)
    p: f64,
    /// Marker heights q1..q5 (non-decreasing)
    heights: [f64; 5],
    /// Marker positions n1..n5 (strictly increasing, <= count)
    positions: [f64; 5],
    /// Observations seen since construction or the last clear
    count: u64,
}

impl QuantileTracker {
    /// Create a tracker for probability `p`, which must lie strictly
    /// between 0 and 1.
    pub fn new(p: f64) -> Result<Self> {
        if !p.is_finite() || p <= 0.0 || p >= 1.0 {
            return Err(WinscanError::config(format!(
                "quantile probability must lie in (0, 1), got {p}"
            )));
        }
        Ok(Self {
            p,
            heights: [0.0; 5],
            positions: [1.0, 2.0, 3.0, 4.0, 5.0],
            count: 0,
        })
    }

    /// The configured probability.
    pub fn probability(&self) -> f64 {
        self.p
    }

    /// Number of observations seen.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Ingest one observation. Finite-ness is the caller's responsibility;
    /// `RunningStats` validates before dispatching here.
    pub fn push(&mut self, value: f64) {
        if self.count < 5 {
            // Initial phase: keep the first five observations sorted.
            let mut i = self.count as usize;
            self.heights[i] = value;
            while i > 0 && self.heights[i - 1] > self.heights[i] {
                self.heights.swap(i - 1, i);
                i -= 1;
            }
            self.count += 1;
            return;
        }

        self.count += 1;

        // Locate the cell k with heights[k] <= value < heights[k+1],
        // extending the extreme markers when the value falls outside them.
        let k = if value < self.heights[0] {
            self.heights[0] = value;
            0
        } else if value >= self.heights[4] {
            self.heights[4] = value;
            3
        } else {
            let mut cell = 0;
            for i in 0..4 {
                if value >= self.heights[i] && value < self.heights[i + 1] {
                    cell = i;
                    break;
                }
            }
            cell
        };

        // Markers above the insertion cell shift one position right.
        for i in (k + 1)..5 {
            self.positions[i] += 1.0;
        }

        let desired = self.desired_positions();

        // Adjust interior markers that drifted at least one slot from their
        // desired position, one step at a time.
        for i in 1..4 {
            let d = desired[i] - self.positions[i];
            let room_right = self.positions[i + 1] - self.positions[i] > 1.0;
            let room_left = self.positions[i - 1] - self.positions[i] < -1.0;
            if (d >= 1.0 && room_right) || (d <= -1.0 && room_left) {
                let sign = if d >= 1.0 { 1.0 } else { -1.0 };
                let candidate = self.parabolic(i, sign);
                // The parabolic estimate must stay inside the neighboring
                // heights; otherwise linear interpolation preserves the
                // non-decreasing invariant.
                if self.heights[i - 1] < candidate && candidate < self.heights[i + 1] {
                    self.heights[i] = candidate;
                } else {
                    self.heights[i] = self.linear(i, sign);
                }
                self.positions[i] += sign;
            }
        }
    }

    /// Current estimate of the tracked quantile, `None` for an empty stream.
    ///
    /// Exact (nearest-rank order statistic) while at most five observations
    /// have been seen; the middle marker height afterwards.
    pub fn estimate(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        if self.count <= 5 {
            let n = self.count as usize;
            let rank = (self.p * n as f64).ceil() as usize;
            let idx = rank.saturating_sub(1).min(n - 1);
            return Some(self.heights[idx]);
        }
        Some(self.heights[2])
    }

    /// Reset to the empty state, keeping the configured probability.
    pub fn clear(&mut self) {
        self.heights = [0.0; 5];
        self.positions = [1.0, 2.0, 3.0, 4.0, 5.0];
        self.count = 0;
    }

    /// Desired marker positions for the current count:
    /// `1, 1 + p(n-1)/2, 1 + p(n-1), 1 + (1+p)(n-1)/2, n`.
    fn desired_positions(&self) -> [f64; 5] {
        let n = self.count as f64;
        [
            1.0,
            1.0 + self.p * (n - 1.0) / 2.0,
            1.0 + self.p * (n - 1.0),
            1.0 + (1.0 + self.p) * (n - 1.0) / 2.0,
            n,
        ]
    }

    /// Piecewise-parabolic height adjustment for interior marker `i`.
    fn parabolic(&self, i: usize, d: f64) -> f64 {
        let q = &self.heights;
        let n = &self.positions;
        q[i] + d / (n[i + 1] - n[i - 1])
            * ((n[i] - n[i - 1] + d) * (q[i + 1] - q[i]) / (n[i + 1] - n[i])
                + (n[i + 1] - n[i] - d) * (q[i] - q[i - 1]) / (n[i] - n[i - 1]))
    }

    /// Linear fallback when the parabolic estimate leaves the neighbor bounds.
    fn linear(&self, i: usize, d: f64) -> f64 {
        let q = &self.heights;
        let n = &self.positions;
        let j = if d > 0.0 { i + 1 } else { i - 1 };
        q[i] + d * (q[j] - q[i]) / (n[j] - n[i])
    }
}
