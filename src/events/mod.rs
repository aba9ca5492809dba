//! Table events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by philosophers and the table.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Philosopher` (state changes, busy forks, leaving),
//!   `Table` (pause/resume, food exhausted, shutdown), `SubscriberSet`
//!   workers (overflow/panic).
//! - **Consumer**: the table's listener task, which fans out to `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, LeaveReason};
