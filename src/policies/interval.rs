//! # Random phase durations.
//!
//! [`Interval`] is the closed range a timed phase (eating, thinking) draws its
//! duration from. Sampling is uniform at millisecond resolution.

use std::time::Duration;

use rand::Rng;

use crate::error::ConfigError;

/// Closed duration range `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    /// Shortest duration.
    pub min: Duration,
    /// Longest duration.
    pub max: Duration,
}

impl Interval {
    /// `[0, max]`.
    pub const fn up_to(max: Duration) -> Self {
        Self {
            min: Duration::ZERO,
            max,
        }
    }

    /// Always `d`.
    pub const fn fixed(d: Duration) -> Self {
        Self { min: d, max: d }
    }

    /// Rejects `min > max`; `name` identifies the interval in the error.
    pub fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidInterval {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Draws a duration uniformly from the range.
    ///
    /// An inverted range yields `min`.
    pub fn sample(&self) -> Duration {
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        if hi <= lo {
            return self.min;
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}
