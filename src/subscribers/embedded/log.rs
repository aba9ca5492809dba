//! # LogWriter: events through `tracing`
//!
//! Renders each [`Event`] as a structured `tracing` record. Philosopher
//! narration goes out at `info`, retries at `trace`, observer trouble at `warn`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO forkring: philosopher is eating seat=3 food=41
//! INFO forkring: philosopher is thinking seat=3
//! INFO forkring: philosopher left the table seat=3 reason=food_gone
//! INFO forkring: food exhausted
//! ```

use async_trait::async_trait;
use tracing::{info, trace, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let seat = e.seat.unwrap_or_default();
        match e.kind {
            EventKind::StateChanged => match (e.state, e.food) {
                (Some(state), Some(food)) => {
                    info!(target: "forkring", seat, food, "philosopher {}", state.action());
                }
                (Some(state), None) => {
                    info!(target: "forkring", seat, "philosopher {}", state.action());
                }
                (None, _) => {}
            },
            EventKind::ForksBusy => {
                trace!(
                    target: "forkring",
                    seat,
                    attempt = e.attempt.unwrap_or_default(),
                    delay_ms = e.delay_ms.unwrap_or_default(),
                    "forks busy"
                );
            }
            EventKind::Left => {
                info!(
                    target: "forkring",
                    seat,
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                    "philosopher left the table"
                );
            }
            EventKind::Paused => info!(target: "forkring", seat, "paused"),
            EventKind::Resumed => info!(target: "forkring", seat, "resumed"),
            EventKind::FoodExhausted => info!(target: "forkring", "food exhausted"),
            EventKind::ShutdownRequested => info!(target: "forkring", "shutdown requested"),
            EventKind::AllStoppedWithin => {
                info!(target: "forkring", "all philosophers left within grace")
            }
            EventKind::GraceExceeded => {
                warn!(
                    target: "forkring",
                    stuck = e.reason.as_deref().unwrap_or(""),
                    "grace exceeded"
                );
            }
            EventKind::SubscriberOverflow => {
                warn!(
                    target: "forkring",
                    subscriber = e.subscriber.unwrap_or("unknown"),
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                    "subscriber dropped an event"
                );
            }
            EventKind::SubscriberPanicked => {
                warn!(
                    target: "forkring",
                    subscriber = e.subscriber.unwrap_or("unknown"),
                    info = e.reason.as_deref().unwrap_or("unknown"),
                    "subscriber panicked"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
