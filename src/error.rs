//! Error types used by the table runtime, the fork ring and the controls.
//!
//! - [`ConfigError`] rejects a configuration before any philosopher sits down.
//! - [`RingError`] describes misuse of the [`ForkRing`](crate::ForkRing) and the
//!   end of the food supply.
//! - [`RuntimeError`] is returned by [`Table::run`](crate::Table::run).
//! - [`ControlError`] is returned by pause/resume controls.
//!
//! Every enum provides `as_label` (a stable snake_case label for logs/metrics).

use std::any::Any;
use std::time::Duration;

use thiserror::Error;

/// # Invalid construction parameters.
///
/// Fatal: a table is never built from a configuration that fails validation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Fewer than two seats: the neighbour relation is degenerate.
    #[error("a table needs at least 2 seats, got {seats}")]
    TooFewSeats {
        /// The rejected seat count.
        seats: usize,
    },

    /// The initial food supply must be positive.
    #[error("the initial food supply must be greater than zero")]
    NoFood,

    /// A timing interval has `min > max`.
    #[error("interval `{name}` has min {min:?} greater than max {max:?}")]
    InvalidInterval {
        /// Which interval (`eat` or `think`).
        name: &'static str,
        /// Lower bound.
        min: Duration,
        /// Upper bound.
        max: Duration,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use forkring::ConfigError;
    ///
    /// let err = ConfigError::TooFewSeats { seats: 1 };
    /// assert_eq!(err.as_label(), "config_too_few_seats");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::TooFewSeats { .. } => "config_too_few_seats",
            ConfigError::NoFood => "config_no_food",
            ConfigError::InvalidInterval { .. } => "config_invalid_interval",
        }
    }
}

/// # Errors reported by the fork ring.
///
/// `SeatOutOfRange` and `NotHeld` are programming errors: the infallible ring API
/// panics with their message. `FoodExhausted` is the normal end of a run.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    /// Seat id outside `0..seats`.
    #[error("seat {seat} is out of range for a ring of {seats} seats")]
    SeatOutOfRange {
        /// Offending seat id.
        seat: usize,
        /// Ring size.
        seats: usize,
    },

    /// Release of a pair the seat does not hold (double release or release without acquire).
    #[error("seat {seat} released forks {left} and {right} without holding them")]
    NotHeld {
        /// Releasing seat.
        seat: usize,
        /// Left fork of the pair.
        left: usize,
        /// Right fork of the pair.
        right: usize,
    },

    /// The food counter already reached zero.
    #[error("food supply is exhausted")]
    FoodExhausted,
}

impl RingError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RingError::SeatOutOfRange { .. } => "ring_seat_out_of_range",
            RingError::NotHeld { .. } => "ring_not_held",
            RingError::FoodExhausted => "ring_food_exhausted",
        }
    }

    /// Indicates whether the error breaks the arbitration invariants.
    ///
    /// # Example
    /// ```
    /// use forkring::RingError;
    ///
    /// assert!(RingError::NotHeld { seat: 0, left: 0, right: 1 }.is_violation());
    /// assert!(!RingError::FoodExhausted.is_violation());
    /// ```
    pub fn is_violation(&self) -> bool {
        matches!(
            self,
            RingError::SeatOutOfRange { .. } | RingError::NotHeld { .. }
        )
    }
}

/// # Errors produced by the table runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// [`Table::run`](crate::Table::run) was called more than once.
    #[error("the table is already running or has finished")]
    AlreadyRunning,

    /// A philosopher panicked (arbitration invariant violated); the run was aborted.
    #[error("philosopher panicked: {reason}")]
    PhilosopherPanicked {
        /// Panic payload, if it was a string.
        reason: String,
    },

    /// Shutdown grace period was exceeded; some philosophers did not leave in time.
    #[error("shutdown timeout {grace:?} exceeded; stuck seats: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Seats that were still running.
        stuck: Vec<usize>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use forkring::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::AlreadyRunning => "runtime_already_running",
            RuntimeError::PhilosopherPanicked { .. } => "runtime_philosopher_panicked",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// # Errors returned by pause/resume controls.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// No philosopher sits at this seat.
    #[error("no philosopher at seat {seat}")]
    UnknownSeat {
        /// Requested seat.
        seat: usize,
    },
}

impl ControlError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ControlError::UnknownSeat { .. } => "control_unknown_seat",
        }
    }
}

/// Text of a caught panic payload (`&str` or `String`), or `"unknown panic"`.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_label_and_message() {
        let err = ConfigError::NoFood;
        assert_eq!(err.as_label(), "config_no_food");
        assert_eq!(err.to_string(), "the initial food supply must be greater than zero");
    }

    #[test]
    fn test_grace_exceeded_names_stuck_seats() {
        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_secs(5),
            stuck: vec![2, 4],
        };
        assert_eq!(err.as_label(), "runtime_grace_exceeded");
        assert_eq!(err.to_string(), "shutdown timeout 5s exceeded; stuck seats: [2, 4]");
    }

    #[test]
    fn test_not_held_message_names_forks() {
        let err = RingError::NotHeld { seat: 4, left: 4, right: 0 };
        assert_eq!(
            err.to_string(),
            "seat 4 released forks 4 and 0 without holding them"
        );
    }

    #[test]
    fn test_panic_message_reads_str_and_string() {
        let owned: Box<dyn Any + Send> = Box::new(format!("seat {}", 3));
        assert_eq!(panic_message(owned.as_ref()), "seat 3");
        let borrowed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(borrowed.as_ref()), "boom");
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
