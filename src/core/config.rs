//! # Table configuration.
//!
//! Provides [`Config`]: the size of the ring, the food budget, phase timings and
//! runtime knobs (bus capacity, shutdown grace).
//!
//! Config is checked once, by [`TableBuilder::build`](crate::TableBuilder::build);
//! nothing past that point re-validates it.

use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::{BackoffPolicy, Interval};

/// Configuration for one dining session.
///
/// ## Field semantics
/// - `seats`: philosophers (and forks) around the table, at least 2
/// - `food`: portions available for the whole session, at least 1
/// - `retry`: delay between failed fork acquisitions
/// - `eat`, `think`: ranges the timed phases draw their duration from
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `grace`: maximum wait for philosophers to leave after shutdown starts
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of philosophers and forks.
    pub seats: usize,

    /// Initial food supply.
    pub food: u64,

    /// Delay policy between failed acquisitions of a hungry philosopher.
    pub retry: BackoffPolicy,

    /// Duration range of a meal.
    pub eat: Interval,

    /// Duration range of a thinking phase.
    pub think: Interval,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow listeners that lag behind more than `bus_capacity` messages skip
    /// older items.
    pub bus_capacity: usize,

    /// Maximum time to wait for every philosopher to leave after cancellation.
    ///
    /// If exceeded, the run ends with `RuntimeError::GraceExceeded`.
    pub grace: Duration,
}

impl Config {
    /// Checks seats, food and both phase intervals.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seats < 2 {
            return Err(ConfigError::TooFewSeats { seats: self.seats });
        }
        if self.food == 0 {
            return Err(ConfigError::NoFood);
        }
        self.eat.validate("eat")?;
        self.think.validate("think")?;
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `seats = 11`, `food = 43`
    /// - `retry = BackoffPolicy::default()` (constant 100ms)
    /// - `eat = 0..=4s`, `think = 0..=10s`
    /// - `bus_capacity = 1024`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            seats: 11,
            food: 43,
            retry: BackoffPolicy::default(),
            eat: Interval::up_to(Duration::from_secs(4)),
            think: Interval::up_to(Duration::from_secs(10)),
            bus_capacity: 1024,
            grace: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.seats, 11);
        assert_eq!(cfg.food, 43);
    }

    #[test]
    fn test_rejects_degenerate_tables() {
        let cfg = Config {
            seats: 1,
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::TooFewSeats { seats: 1 }));

        let cfg = Config {
            food: 0,
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoFood));
    }

    #[test]
    fn test_rejects_inverted_interval() {
        let cfg = Config {
            think: Interval {
                min: Duration::from_secs(2),
                max: Duration::from_secs(1),
            },
            ..Config::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidInterval { name: "think", .. })
        ));
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
