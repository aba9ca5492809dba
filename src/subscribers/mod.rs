//! # Observers of the table.
//!
//! Observers implement [`Subscribe`] and receive every [`Event`](crate::Event)
//! through a [`SubscriberSet`]: one bounded queue and one worker task per
//! subscriber, so a slow or failing observer never stalls a philosopher.
//!
//! ```text
//! Philosopher ── publish(Event) ──► Bus ──► table listener ──► SubscriberSet
//!                                                        ┌─────────┼─────────┐
//!                                                        ▼         ▼         ▼
//!                                                    LogWriter  FileLog   custom
//! ```
//!
//! ## Built-in subscribers (feature `logging`)
//! - [`LogWriter`]: renders events through `tracing`.
//! - [`FileLog`]: append-only text log, one line per state change.

mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
mod embedded;

pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;

#[cfg(feature = "logging")]
pub use embedded::{FileLog, LogWriter};
