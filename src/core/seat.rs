//! # Seats: philosopher state and pause switch.
//!
//! A [`Seat`] is the part of a philosopher the outside world may touch:
//! - `state` is written only by the philosopher, read by observers
//!   (eventually consistent, never blocking);
//! - the pause switch is a `watch` channel: controllers flip it, the
//!   philosopher reads it at decision points and sleeps on it while paused
//!   without holding any lock.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::watch;

/// The three phases of a philosopher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PhilosopherState {
    /// Waiting for both forks.
    Hungry = 0,
    /// Holding both forks.
    Eating = 1,
    /// Holding nothing, idle.
    Thinking = 2,
}

impl PhilosopherState {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PhilosopherState::Hungry => "hungry",
            PhilosopherState::Eating => "eating",
            PhilosopherState::Thinking => "thinking",
        }
    }

    /// Narration used by logs: `is hungry`, `is eating`, `is thinking`.
    pub fn action(&self) -> &'static str {
        match self {
            PhilosopherState::Hungry => "is hungry",
            PhilosopherState::Eating => "is eating",
            PhilosopherState::Thinking => "is thinking",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => PhilosopherState::Eating,
            2 => PhilosopherState::Thinking,
            _ => PhilosopherState::Hungry,
        }
    }
}

impl fmt::Display for PhilosopherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which seats a pause/resume request applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseTarget {
    /// One seat.
    Seat(usize),
    /// Every seat at the table.
    All,
}

/// Shared, externally visible part of one philosopher.
#[derive(Debug)]
pub(crate) struct Seat {
    id: usize,
    state: AtomicU8,
    paused: watch::Sender<bool>,
}

impl Seat {
    pub(crate) fn new(id: usize) -> Self {
        let (paused, _rx) = watch::channel(false);
        Self {
            id,
            state: AtomicU8::new(PhilosopherState::Hungry as u8),
            paused,
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn state(&self) -> PhilosopherState {
        PhilosopherState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: PhilosopherState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub(crate) fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Sets the pause flag; returns true if it changed.
    pub(crate) fn set_paused(&self, paused: bool) -> bool {
        self.paused.send_if_modified(|current| {
            if *current == paused {
                return false;
            }
            *current = paused;
            true
        })
    }

    pub(crate) fn watch_pause(&self) -> watch::Receiver<bool> {
        self.paused.subscribe()
    }
}
