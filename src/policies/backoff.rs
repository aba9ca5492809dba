//! # Retry delay for hungry philosophers.
//!
//! [`BackoffPolicy`] says how long a hungry philosopher waits after failing to
//! pick up its pair. The attempt counter restarts with every hungry phase.
//!
//! Delay after failed attempt `n` (0-based): `first × factor^n`, capped at `max`.
//! A `factor` of `1.0` or less polls at a constant `first`; the default is a
//! constant 100ms poll.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use forkring::BackoffPolicy;
//!
//! let retry = BackoffPolicy {
//!     first: Duration::from_millis(50),
//!     max: Duration::from_millis(400),
//!     factor: 2.0,
//! };
//!
//! assert_eq!(retry.next(0), Duration::from_millis(50));
//! assert_eq!(retry.next(2), Duration::from_millis(200));
//! assert_eq!(retry.next(9), Duration::from_millis(400));
//! ```

use std::time::Duration;

/// Delay policy between failed acquisitions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Growth per failed attempt (`<= 1.0` = constant polling).
    pub factor: f64,
}

impl Default for BackoffPolicy {
    /// Constant 100ms polling.
    fn default() -> Self {
        Self::constant(Duration::from_millis(100))
    }
}

impl BackoffPolicy {
    /// Same delay after every attempt.
    pub const fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
        }
    }

    /// Delay to wait after failed attempt `attempt` (0-based).
    pub fn next(&self, attempt: u32) -> Duration {
        let floor = self.first.min(self.max);
        if attempt == 0 || self.factor <= 1.0 {
            return floor;
        }
        // powf overflows to infinity long before u32::MAX; that lands on `max`.
        let secs = floor.as_secs_f64() * self.factor.powf(f64::from(attempt));
        if secs.is_finite() && secs < self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        }
    }
}
