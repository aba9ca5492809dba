//! Table core: seats, philosophers and session lifecycle.
//!
//! The public API from this module is [`Table`] (built by [`TableBuilder`]
//! from a [`Config`]) and the value types it hands out.
//!
//! Internal modules:
//! - [`philosopher`]: one seat's hungry → eating → thinking loop;
//! - [`seat`]: per-philosopher state and pause switch;
//! - [`table`]: spawns philosophers, stops them, reports the outcome;
//! - [`shutdown`]: cross-platform termination signal handling.

mod builder;
mod config;
mod philosopher;
mod seat;
mod shutdown;
mod table;

pub use builder::TableBuilder;
pub use config::Config;
pub use seat::{PauseTarget, PhilosopherState};
pub use table::{Outcome, StopReason, Table};
