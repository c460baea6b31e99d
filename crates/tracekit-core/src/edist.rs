//! Empirical flow size distributions given as cumulative distribution tables.

use rand::prelude::*;

use crate::units::Bytes;

// Tolerance on the final cumulative percentage.
const PERCENT_EPSILON: f64 = 1e-6;

/// One row of a cumulative distribution table.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Breakpoint {
    pub value: f64,
    /// Cumulative percentage in `[0, 100]`.
    pub percent: f64,
}

/// An empirical distribution built from a validated CDF table. Samples are drawn by inverse
/// transform: a uniform percentile is mapped to a value by linear interpolation between the two
/// bracketing breakpoints.
#[derive(Debug, Clone)]
pub struct EmpiricalDist {
    points: Vec<Breakpoint>,
    mean: f64,
}

impl EmpiricalDist {
    /// Validates a CDF table and builds a distribution from it.
    ///
    /// Correctness properties:
    ///
    /// - There are at least two breakpoints
    /// - Values and percentages are finite and strictly increasing
    /// - Percentages start at or above 0 and end at 100
    pub fn from_breakpoints(
        points: impl IntoIterator<Item = (f64, f64)>,
    ) -> Result<Self, EDistError> {
        let points = points
            .into_iter()
            .map(|(value, percent)| Breakpoint { value, percent })
            .collect::<Vec<_>>();
        if points.len() < 2 {
            return Err(EDistError::TooFewPoints(points.len()));
        }
        for (row, p) in points.iter().enumerate() {
            if !p.value.is_finite() || !p.percent.is_finite() {
                return Err(EDistError::NonFinite { row });
            }
        }
        for (row, win) in points.windows(2).enumerate() {
            if win[1].value <= win[0].value || win[1].percent <= win[0].percent {
                return Err(EDistError::NotIncreasing { row: row + 1 });
            }
        }
        let first = points[0].percent;
        let last = points[points.len() - 1].percent;
        if first < 0.0 || (last - 100.0).abs() > PERCENT_EPSILON {
            return Err(EDistError::BadRange { first, last });
        }
        let mean = points
            .windows(2)
            .map(|win| (win[0].value + win[1].value) / 2.0 * (win[1].percent - win[0].percent))
            .sum::<f64>()
            / 100.0;
        Ok(Self { points, mean })
    }

    /// The probability-weighted average of segment midpoints.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.points
    }

    /// The interpolated value at cumulative percentage `percent`. Percentages outside of the
    /// table are clamped to its first or last value, and NaN maps to the first value.
    pub fn value_at(&self, percent: f64) -> f64 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if percent.is_nan() || percent <= first.percent {
            return first.value;
        }
        if percent >= last.percent {
            return last.value;
        }
        // First breakpoint whose percentage is at or above `percent`. Because of the clamping
        // above this is never the first or past the last breakpoint.
        let i = self.points.partition_point(|p| p.percent < percent);
        let (lo, hi) = (self.points[i - 1], self.points[i]);
        lo.value + (hi.value - lo.value) / (hi.percent - lo.percent) * (percent - lo.percent)
    }

    /// Maps a uniform draw in `[0, 1)` to a flow size. Sizes are rounded to whole bytes and are
    /// never zero.
    pub fn sample_at(&self, uniform: f64) -> Bytes {
        let value = self.value_at(uniform * 100.0).round();
        if value >= 1.0 {
            Bytes::new(value as u64)
        } else {
            Bytes::ONE
        }
    }
}

impl Distribution<Bytes> for EmpiricalDist {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Bytes {
        self.sample_at(rng.gen::<f64>())
    }
}

/// An invalid CDF table.
#[derive(Debug, thiserror::Error)]
pub enum EDistError {
    #[error("a CDF needs at least two breakpoints (got {0})")]
    TooFewPoints(usize),

    #[error("CDF row {row} is not a finite number")]
    NonFinite { row: usize },

    #[error("CDF row {row} does not strictly increase in value and percentage")]
    NotIncreasing { row: usize },

    #[error("CDF percentages must start at or above 0 and end at 100 (got {first}..{last})")]
    BadRange { first: f64, last: f64 },
}
