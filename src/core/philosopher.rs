//! # Philosopher: one seat's hungry → eating → thinking loop.
//!
//! ## Architecture
//! ```text
//! Table ──► Philosopher::run(token)
//!
//! announce Hungry
//! loop {
//!   ├─► wait while paused (cancellable)
//!   ├─► Hungry:   eat_lock
//!   │               loop { try_acquire_pair ─► ok ─► decrease_food_supply
//!   │                      └─► busy ─► publish ForksBusy ─► sleep(retry.next(n)) }
//!   │             ─► announce Eating (with remaining food)
//!   ├─► Eating:   hold(eat.sample()) ─► release_pair ─► announce Thinking
//!   └─► Thinking: hold(think.sample()) ─► announce Hungry
//! }
//! publish Left
//! ```
//!
//! ## Rules
//! - Every await is cancellable through the table token.
//! - A philosopher never leaves holding forks: every exit after a successful
//!   serve goes through `release_pair`, cancelled or not.
//! - Pause gates every decision point and freezes the timed phases: the
//!   remaining time is kept and the same phase resumes after unpause.
//! - The food counter is only touched right after a successful acquisition;
//!   losing the race for the last portion returns the forks and leaves.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::core::seat::{PhilosopherState, Seat};
use crate::events::{Bus, Event, EventKind, LeaveReason};
use crate::policies::{BackoffPolicy, Interval};
use crate::ring::ForkRing;

/// Timing parameters, extracted from [`Config`](crate::Config) by the table.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PhilosopherParams {
    /// Delay between failed acquisitions.
    pub retry: BackoffPolicy,
    /// Duration of a meal.
    pub eat: Interval,
    /// Duration of a thinking phase.
    pub think: Interval,
}

pub(crate) struct Philosopher {
    seat: Arc<Seat>,
    ring: Arc<ForkRing>,
    bus: Bus,
    params: PhilosopherParams,
    pause: watch::Receiver<bool>,
    /// Guards this philosopher's hungry phase against itself only.
    eat_lock: Arc<Mutex<()>>,
}

impl Philosopher {
    pub(crate) fn new(
        seat: Arc<Seat>,
        ring: Arc<ForkRing>,
        bus: Bus,
        params: PhilosopherParams,
    ) -> Self {
        let pause = seat.watch_pause();
        Self {
            seat,
            ring,
            bus,
            params,
            pause,
            eat_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Runs until cancellation or the end of the food; returns the seat and why it left.
    pub(crate) async fn run(mut self, token: CancellationToken) -> (usize, LeaveReason) {
        let seat = self.seat.id();
        debug!(seat, "has reached the table");

        let mut state = PhilosopherState::Hungry;
        self.enter(state, None);

        let stopped = loop {
            if token.is_cancelled() {
                break LeaveReason::Cancelled;
            }
            // A serving in progress is finished; otherwise nothing is left to wait for.
            if state != PhilosopherState::Eating && self.ring.is_exhausted() {
                break LeaveReason::FoodGone;
            }
            if let Err(reason) = self.wait_unpaused(&token).await {
                break reason;
            }

            let step = match state {
                PhilosopherState::Hungry => self.dine(&token).await.map(|food| {
                    self.enter(PhilosopherState::Eating, Some(food));
                    PhilosopherState::Eating
                }),
                PhilosopherState::Eating => {
                    let meal = self.params.eat.sample();
                    let res = self.hold(meal, &token).await;
                    self.put_down_forks();
                    state = PhilosopherState::Thinking;
                    res.map(|()| PhilosopherState::Thinking)
                }
                PhilosopherState::Thinking => {
                    let nap = self.params.think.sample();
                    self.hold(nap, &token).await.map(|()| {
                        self.enter(PhilosopherState::Hungry, None);
                        PhilosopherState::Hungry
                    })
                }
            };

            match step {
                Ok(next) => state = next,
                Err(reason) => break reason,
            }
        };

        // Stopped between serving and the meal itself: the pair is still held.
        if state == PhilosopherState::Eating {
            self.put_down_forks();
        }

        let reason = if self.ring.is_exhausted() {
            LeaveReason::FoodGone
        } else {
            stopped
        };
        debug!(seat, %reason, "left the table");
        self.bus.publish(
            Event::new(EventKind::Left)
                .with_seat(seat)
                .with_reason(reason.as_str()),
        );
        (seat, reason)
    }

    /// Hungry phase: retries until the pair is taken and a portion served.
    async fn dine(&mut self, token: &CancellationToken) -> Result<u64, LeaveReason> {
        let seat = self.seat.id();
        let _guard = Arc::clone(&self.eat_lock).lock_owned().await;
        let mut attempt: u32 = 0;

        loop {
            if token.is_cancelled() {
                return Err(LeaveReason::Cancelled);
            }
            self.wait_unpaused(token).await?;

            if self.ring.try_acquire_pair(seat) {
                return match self.ring.decrease_food_supply() {
                    Ok(remaining) => Ok(remaining),
                    Err(_) => {
                        self.ring.release_pair(seat);
                        Err(LeaveReason::FoodGone)
                    }
                };
            }
            if self.ring.is_exhausted() {
                return Err(LeaveReason::FoodGone);
            }

            let delay = self.params.retry.next(attempt);
            attempt = attempt.saturating_add(1);
            trace!(seat, attempt, ?delay, "forks busy");
            self.bus.publish(
                Event::new(EventKind::ForksBusy)
                    .with_seat(seat)
                    .with_attempt(attempt)
                    .with_delay(delay),
            );
            sleep(delay, token).await?;
        }
    }

    /// Timed phase that stops its clock while paused.
    async fn hold(&mut self, phase: Duration, token: &CancellationToken) -> Result<(), LeaveReason> {
        let mut remaining = phase;
        loop {
            self.wait_unpaused(token).await?;
            let started = Instant::now();
            tokio::select! {
                _ = time::sleep(remaining) => return Ok(()),
                changed = self.pause.changed() => {
                    remaining = remaining.saturating_sub(started.elapsed());
                    if changed.is_err() {
                        return sleep(remaining, token).await;
                    }
                }
                _ = token.cancelled() => return Err(LeaveReason::Cancelled),
            }
        }
    }

    /// Returns once the seat is unpaused.
    async fn wait_unpaused(&mut self, token: &CancellationToken) -> Result<(), LeaveReason> {
        loop {
            if !*self.pause.borrow_and_update() {
                return Ok(());
            }
            trace!(seat = self.seat.id(), "waiting while paused");
            tokio::select! {
                changed = self.pause.changed() => {
                    if changed.is_err() {
                        return Ok(());
                    }
                }
                _ = token.cancelled() => return Err(LeaveReason::Cancelled),
            }
        }
    }

    /// Ends a meal: both forks back on the ring, then Thinking.
    fn put_down_forks(&self) {
        self.ring.release_pair(self.seat.id());
        self.enter(PhilosopherState::Thinking, None);
    }

    fn enter(&self, state: PhilosopherState, food: Option<u64>) {
        let seat = self.seat.id();
        self.seat.set_state(state);
        debug!(seat, %state, "philosopher {}", state.action());

        let mut ev = Event::state_changed(seat, state);
        if let Some(food) = food {
            ev = ev.with_food(food);
        }
        self.bus.publish(ev);
    }
}

async fn sleep(d: Duration, token: &CancellationToken) -> Result<(), LeaveReason> {
    tokio::select! {
        _ = time::sleep(d) => Ok(()),
        _ = token.cancelled() => Err(LeaveReason::Cancelled),
    }
}
