//! # Events emitted by philosophers and the table.
//!
//! The [`EventKind`] enum classifies events across four categories:
//! - **Philosopher events**: state changes, busy forks, leaving the table
//! - **Control events**: pause and resume
//! - **Termination events**: food exhausted, shutdown, grace outcome
//! - **Subscriber events**: overflow and panic of observers
//!
//! The [`Event`] struct carries the metadata (seat, state, remaining food, ...).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use it to restore order when events arrive out of order.
//!
//! ## Example
//! ```rust
//! use forkring::{Event, EventKind, PhilosopherState};
//!
//! let ev = Event::new(EventKind::StateChanged)
//!     .with_seat(3)
//!     .with_state(PhilosopherState::Eating)
//!     .with_food(41);
//!
//! assert_eq!(ev.seat, Some(3));
//! assert_eq!(ev.state, Some(PhilosopherState::Eating));
//! assert_eq!(ev.food, Some(41));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::PhilosopherState;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of table events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Philosopher events ===
    /// A philosopher entered a new state.
    ///
    /// Sets:
    /// - `seat`: philosopher seat
    /// - `state`: the new state
    /// - `food`: remaining food (only when entering `Eating`)
    StateChanged,

    /// A hungry philosopher found a fork taken and will retry.
    ///
    /// Sets:
    /// - `seat`: philosopher seat
    /// - `attempt`: failed attempts so far in this hungry phase (1-based)
    /// - `delay_ms`: delay before the next attempt
    ForksBusy,

    /// A philosopher left the table.
    ///
    /// Sets:
    /// - `seat`: philosopher seat
    /// - `reason`: [`LeaveReason`] label
    Left,

    // === Control events ===
    /// A seat was paused.
    ///
    /// Sets:
    /// - `seat`: philosopher seat
    Paused,

    /// A seat was resumed.
    ///
    /// Sets:
    /// - `seat`: philosopher seat
    Resumed,

    // === Termination events ===
    /// The last portion was taken; the table is shutting down.
    ///
    /// Sets:
    /// - `food`: always `0`
    FoodExhausted,

    /// Shutdown requested by an OS signal.
    ShutdownRequested,

    /// Every philosopher left within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some philosophers did not leave in time.
    ///
    /// Sets:
    /// - `reason`: stuck seats
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber panicked while processing an event.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: `full` or `closed`
    SubscriberOverflow,
}

/// Why a philosopher stopped its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    /// The food ran out.
    FoodGone,
    /// The table was shut down (signal, panic elsewhere, or explicit cancel).
    Cancelled,
}

impl LeaveReason {
    /// Stable label used in [`EventKind::Left`] events.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveReason::FoodGone => "food_gone",
            LeaveReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LeaveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Seat of the philosopher concerned.
    pub seat: Option<usize>,
    /// New philosopher state.
    pub state: Option<PhilosopherState>,
    /// Remaining food.
    pub food: Option<u64>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Retry delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
    /// Subscriber name for subscriber events.
    pub subscriber: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            seat: None,
            state: None,
            food: None,
            attempt: None,
            delay_ms: None,
            reason: None,
            subscriber: None,
        }
    }

    /// Shorthand for a [`EventKind::StateChanged`] event.
    #[inline]
    pub fn state_changed(seat: usize, state: PhilosopherState) -> Self {
        Event::new(EventKind::StateChanged)
            .with_seat(seat)
            .with_state(state)
    }

    /// Attaches a seat.
    #[inline]
    pub fn with_seat(mut self, seat: usize) -> Self {
        self.seat = Some(seat);
        self
    }

    /// Attaches a philosopher state.
    #[inline]
    pub fn with_state(mut self, state: PhilosopherState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches the remaining food.
    #[inline]
    pub fn with_food(mut self, food: u64) -> Self {
        self.food = Some(food);
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a retry delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow).with_reason(reason);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// True for [`EventKind::StateChanged`] events entering `state`.
    #[inline]
    pub fn is_transition_to(&self, state: PhilosopherState) -> bool {
        self.kind == EventKind::StateChanged && self.state == Some(state)
    }
}
