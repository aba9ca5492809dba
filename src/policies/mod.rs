//! Timing policies.
//!
//! This module groups the knobs that control **how long** a philosopher waits:
//! between failed attempts to pick up its forks, and inside the timed phases.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve while hungry (first / factor / max)
//! - [`Interval`]      random duration range for the eating and thinking phases
//!
//! ## Quick wiring
//! ```text
//! Config { retry: BackoffPolicy, eat: Interval, think: Interval }
//!      └─► core::philosopher::Philosopher uses:
//!           - retry.next(attempt) between failed pair acquisitions
//!           - eat.sample() / think.sample() for the timed phases
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → constant 100ms.
//! - `Interval::up_to(4s)` for eating and `Interval::up_to(10s)` for thinking.

mod backoff;
mod interval;

pub use backoff::BackoffPolicy;
pub use interval::Interval;
