//! # forkring
//!
//! **Forkring** runs the dining philosophers on tokio: N philosophers around a
//! circular table, N forks, one shared food supply.
//!
//! Each philosopher is an async task cycling hungry → eating → thinking. Eating
//! needs both neighbouring forks, taken as one step through the [`ForkRing`],
//! so neighbours never eat at the same time and no philosopher ever holds a
//! single fork. Every meal consumes one portion; the meal that empties the
//! supply ends the session for everybody.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ Philosopher  │   │ Philosopher  │   │ Philosopher  │
//!     │   (seat 0)   │   │   (seat 1)   │   │ (seat N-1)   │
//!     └──┬────────┬──┘   └──┬────────┬──┘   └──┬────────┬──┘
//!        │        │         │        │         │        │
//!        │ try_acquire_pair / release_pair / decrease_food_supply
//!        ▼        │         ▼        │         ▼        │
//! ┌──────────────────────────────────────────────────┐  │
//! │  ForkRing (one lock: forks + food counter)       │  │
//! │  - exhausted() fires when food reaches zero      │  │
//! └──────────────────────────────────────────────────┘  │
//!                 │ Publishes Events:                    │
//!                 │ - StateChanged (with food on Eating) │
//!                 │ - ForksBusy, Left                    │
//!                 ▼                                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                    (capacity: Config::bus_capacity)               │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  listener (in Table)   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                     LogWriter   FileLog   custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! Table::run() ──► one Philosopher::run() per seat
//!
//! announce Hungry
//! loop {
//!   ├─► paused? wait (forks kept, phase clock stopped)
//!   ├─► Hungry:   try_acquire_pair
//!   │               ├─ busy ─► ForksBusy{ attempt, delay } ─► sleep(retry.next(attempt))
//!   │               └─ ok   ─► decrease_food_supply ─► Eating{ food }
//!   ├─► Eating:   sleep(eat.sample()) ─► release_pair ─► Thinking
//!   └─► Thinking: sleep(think.sample()) ─► Hungry
//! }
//!
//! exit conditions:
//!   - food reached zero      ─► FoodExhausted, every philosopher leaves
//!   - OS signal / cancel()   ─► ShutdownRequested, every philosopher leaves
//!   - a philosopher panicked ─► RuntimeError::PhilosopherPanicked
//! ```
//!
//! ## Features
//! | Area              | Description                                            | Key types / traits                      |
//! |-------------------|--------------------------------------------------------|-----------------------------------------|
//! | **Arbitration**   | Atomic fork pairs and the shared food counter.          | [`ForkRing`]                            |
//! | **Table**         | Spawns philosophers, pause/resume, shutdown, outcome.   | [`Table`], [`TableBuilder`], [`Outcome`]|
//! | **Subscriber API**| Observe state changes without slowing philosophers.     | [`Subscribe`], [`SubscriberSet`]        |
//! | **Policies**      | Retry delays and phase durations.                       | [`BackoffPolicy`], [`Interval`]         |
//! | **Errors**        | Typed errors for configuration, ring and runtime.       | [`ConfigError`], [`RuntimeError`]       |
//! | **Configuration** | One struct for the whole session.                       | [`Config`]                              |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`] and [`FileLog`].
//! - `cli`: builds the `forkring` binary.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use forkring::{Config, Interval, StopReason, Table};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         seats: 5,
//!         food: 3,
//!         eat: Interval::up_to(Duration::from_millis(20)),
//!         think: Interval::up_to(Duration::from_millis(20)),
//!         ..Config::default()
//!     };
//!
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn forkring::Subscribe>> = vec![Arc::new(forkring::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn forkring::Subscribe>> = Vec::new();
//!
//!     let table = Table::builder(cfg).with_subscribers(subs).build()?;
//!     let outcome = table.run().await?;
//!
//!     assert_eq!(outcome.reason, StopReason::FoodExhausted);
//!     assert_eq!(outcome.meals, 3);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
mod ring;
mod subscribers;

// ---- Public re-exports ----

pub use core::{Config, Outcome, PauseTarget, PhilosopherState, StopReason, Table, TableBuilder};
pub use error::{ConfigError, ControlError, RingError, RuntimeError};
pub use events::{Bus, Event, EventKind, LeaveReason};
pub use policies::{BackoffPolicy, Interval};
pub use ring::ForkRing;
pub use subscribers::{Subscribe, SubscriberSet};

// Built-in subscribers: tracing writer and append-only file log.
// Enabled by default; disable with `--no-default-features`.
#[cfg(feature = "logging")]
pub use subscribers::{FileLog, LogWriter};
