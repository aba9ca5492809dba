//! # Table: seats the philosophers, fans out events, ends the session.
//!
//! The [`Table`] owns the [`ForkRing`], one [`Seat`] per philosopher, the event
//! bus and the runtime token. [`Table::run`] drives a whole dining session;
//! the control and inspection methods may be called concurrently from any task.
//!
//! ## High-level architecture
//! ```text
//! Table::run()
//!
//! Preparation:
//!   - listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)   (fire-and-forget)
//!
//! Spawn philosophers:
//!   seat 0      seat 1      ...  seat N-1
//!     │           │                 │
//!     └──► Philosopher::new(seat, ring, bus, params)
//!               └──► child CancellationToken = runtime_token.child_token()
//!                    set.spawn(philosopher.run(child_token))
//!
//! Stop conditions (first wins):
//!   ring.exhausted()                 ─► Bus.publish(FoodExhausted)
//!   shutdown::wait_for_shutdown_signal() ─► Bus.publish(ShutdownRequested)
//!   Table::cancel()
//!   a philosopher panicked           ─► RuntimeError::PhilosopherPanicked
//!
//! Shutdown path:
//!   runtime_token.cancel()   → propagates to child tokens
//!   wait_all_with_grace(cfg.grace):
//!      ├─ Ok (all joined)    → Bus.publish(AllStoppedWithin)
//!      └─ Timeout exceeded   → Bus.publish(GraceExceeded), abort stragglers
//!   listener drains the bus, subscriber workers drain their queues
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use forkring::{Config, LogWriter, Subscribe, Table};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config { seats: 5, food: 20, ..Config::default() };
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!
//!     let table = Table::builder(cfg).with_subscribers(subs).build()?;
//!     let outcome = table.run().await?;
//!     println!("{} meals served", outcome.meals);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::{
    builder::TableBuilder,
    config::Config,
    philosopher::{Philosopher, PhilosopherParams},
    seat::{PauseTarget, PhilosopherState, Seat},
    shutdown,
};
use crate::error::{ConfigError, ControlError, RuntimeError, panic_message};
use crate::events::{Bus, Event, EventKind, LeaveReason};
use crate::ring::ForkRing;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last portion was served.
    FoodExhausted,
    /// An OS termination signal arrived.
    Interrupted,
    /// [`Table::cancel`] was called.
    Cancelled,
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// What stopped the session.
    pub reason: StopReason,
    /// Portions eaten.
    pub meals: u64,
    /// Portions left over.
    pub food_left: u64,
}

/// Dining table: fork ring, seats, event bus and lifecycle.
pub struct Table {
    cfg: Config,
    ring: Arc<ForkRing>,
    seats: Vec<Arc<Seat>>,
    bus: Bus,
    /// Taken by the first `run`.
    subscribers: Mutex<Option<Vec<Arc<dyn Subscribe>>>>,
    runtime_token: CancellationToken,
}

impl Table {
    /// Starts a [`TableBuilder`].
    pub fn builder(cfg: Config) -> TableBuilder {
        TableBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let ring = Arc::new(ForkRing::new(cfg.seats, cfg.food)?);
        let seats = (0..cfg.seats).map(|id| Arc::new(Seat::new(id))).collect();
        let bus = Bus::new(cfg.bus_capacity_clamped());

        Ok(Self {
            cfg,
            ring,
            seats,
            bus,
            subscribers: Mutex::new(Some(subscribers)),
            runtime_token: CancellationToken::new(),
        })
    }

    /// Configuration the table was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// The shared fork ring.
    pub fn ring(&self) -> &Arc<ForkRing> {
        &self.ring
    }

    /// The event bus; subscribe here for a raw event stream.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Remaining food.
    pub fn current_food_supply(&self) -> u64 {
        self.ring.current_food_supply()
    }

    /// Latest state of every philosopher, by seat.
    pub fn states(&self) -> Vec<PhilosopherState> {
        self.seats.iter().map(|s| s.state()).collect()
    }

    /// Latest state of one philosopher.
    pub fn state(&self, seat: usize) -> Option<PhilosopherState> {
        self.seats.get(seat).map(|s| s.state())
    }

    /// Fork availability, by fork index.
    pub fn availability(&self) -> Vec<bool> {
        self.ring.availability()
    }

    /// Whether a seat is paused; `None` for an unknown seat.
    pub fn is_paused(&self, seat: usize) -> Option<bool> {
        self.seats.get(seat).map(|s| s.is_paused())
    }

    /// Pauses or resumes philosophers.
    ///
    /// A paused philosopher finishes the step it is in (a single acquisition
    /// attempt at most), then freezes: forks it holds stay held, the clock of
    /// its current phase stops, and it emits nothing until resumed.
    ///
    /// Publishes `Paused`/`Resumed` for each seat whose flag actually changed
    /// and returns how many did.
    pub fn set_paused(&self, target: PauseTarget, paused: bool) -> Result<usize, ControlError> {
        let seats: &[Arc<Seat>] = match target {
            PauseTarget::All => &self.seats,
            PauseTarget::Seat(seat) => std::slice::from_ref(
                self.seats
                    .get(seat)
                    .ok_or(ControlError::UnknownSeat { seat })?,
            ),
        };

        let kind = if paused {
            EventKind::Paused
        } else {
            EventKind::Resumed
        };
        let mut changed = 0;
        for seat in seats {
            if seat.set_paused(paused) {
                changed += 1;
                self.bus.publish(Event::new(kind).with_seat(seat.id()));
            }
        }
        debug!(?target, paused, changed, "pause switch");
        Ok(changed)
    }

    /// Pauses every philosopher.
    pub fn pause_all(&self) -> usize {
        self.set_paused(PauseTarget::All, true).unwrap_or_default()
    }

    /// Resumes every philosopher.
    pub fn resume_all(&self) -> usize {
        self.set_paused(PauseTarget::All, false).unwrap_or_default()
    }

    /// Ends the session as if a termination signal arrived.
    pub fn cancel(&self) {
        self.runtime_token.cancel();
    }

    /// Runs the session until the food is gone, a signal arrives, [`Table::cancel`]
    /// is called or a philosopher panics.
    ///
    /// A table runs once; a second call returns [`RuntimeError::AlreadyRunning`].
    pub async fn run(&self) -> Result<Outcome, RuntimeError> {
        let subscribers = self
            .subscribers
            .lock()
            .take()
            .ok_or(RuntimeError::AlreadyRunning)?;

        let listener_stop = CancellationToken::new();
        let listener = self.subscriber_listener(subscribers, listener_stop.clone());

        info!(
            seats = self.cfg.seats,
            food = self.cfg.food,
            "the table is set"
        );
        let mut set = JoinSet::new();
        let mut left = vec![false; self.seats.len()];
        self.spawn_philosophers(&mut set);

        let res = self.drive(&mut set, &mut left).await;

        listener_stop.cancel();
        if let Err(e) = listener.await {
            warn!(error = %e, "event listener failed");
        }
        res
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    ///
    /// Subscribes synchronously, before any philosopher exists. On stop, drains
    /// what is left on the bus and waits for the subscriber queues to empty.
    fn subscriber_listener(
        &self,
        subscribers: Vec<Arc<dyn Subscribe>>,
        stop: CancellationToken,
    ) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let set = SubscriberSet::new(subscribers, self.bus.clone());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(n)) => warn!(skipped = n, "event listener lagged"),
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => break,
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => set.emit(&ev),
                    Err(TryRecvError::Lagged(n)) => warn!(skipped = n, "event listener lagged"),
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        })
    }

    fn params(&self) -> PhilosopherParams {
        PhilosopherParams {
            retry: self.cfg.retry,
            eat: self.cfg.eat,
            think: self.cfg.think,
        }
    }

    fn spawn_philosophers(&self, set: &mut JoinSet<(usize, LeaveReason)>) {
        let params = self.params();
        for seat in &self.seats {
            let philosopher = Philosopher::new(
                Arc::clone(seat),
                Arc::clone(&self.ring),
                self.bus.clone(),
                params,
            );
            set.spawn(philosopher.run(self.runtime_token.child_token()));
        }
    }

    /// Waits for the first stop condition, then shuts every philosopher down.
    async fn drive(
        &self,
        set: &mut JoinSet<(usize, LeaveReason)>,
        left: &mut [bool],
    ) -> Result<Outcome, RuntimeError> {
        let signal = shutdown::wait_for_shutdown_signal();
        tokio::pin!(signal);
        let mut signal_armed = true;
        let exhausted = self.ring.exhausted();
        tokio::pin!(exhausted);

        let reason = loop {
            tokio::select! {
                biased;
                _ = &mut exhausted => {
                    info!("food exhausted");
                    self.bus.publish(Event::new(EventKind::FoodExhausted).with_food(0));
                    break StopReason::FoodExhausted;
                }
                _ = self.runtime_token.cancelled() => {
                    info!("table cancelled");
                    break StopReason::Cancelled;
                }
                res = &mut signal, if signal_armed => {
                    signal_armed = false;
                    match res {
                        Ok(()) => {
                            info!("shutdown requested");
                            self.bus.publish(Event::new(EventKind::ShutdownRequested));
                            break StopReason::Interrupted;
                        }
                        Err(e) => warn!(error = %e, "cannot listen for shutdown signals"),
                    }
                }
                joined = set.join_next() => match joined {
                    Some(Ok((seat, _))) => left[seat] = true,
                    Some(Err(e)) => return self.abort(set, left, e).await,
                    None => break StopReason::Cancelled,
                },
            }
        };

        self.runtime_token.cancel();
        self.wait_all_with_grace(set, left).await?;

        let food_left = self.ring.current_food_supply();
        Ok(Outcome {
            reason,
            meals: self.ring.initial_food() - food_left,
            food_left,
        })
    }

    /// A philosopher panicked: stop the others and report the panic.
    async fn abort(
        &self,
        set: &mut JoinSet<(usize, LeaveReason)>,
        left: &mut [bool],
        err: JoinError,
    ) -> Result<Outcome, RuntimeError> {
        let reason = panic_reason(err);
        error!(%reason, "philosopher panicked; shutting the table down");
        self.runtime_token.cancel();
        if let Err(e) = self.wait_all_with_grace(set, left).await {
            warn!(error = %e, "shutdown after panic was not clean");
        }
        Err(RuntimeError::PhilosopherPanicked { reason })
    }

    /// Waits for all philosophers to leave within the configured grace period.
    ///
    /// Publishes [`EventKind::AllStoppedWithin`] on success, or
    /// [`EventKind::GraceExceeded`] on timeout, aborts the stragglers and returns
    /// [`RuntimeError::GraceExceeded`] with their seats.
    async fn wait_all_with_grace(
        &self,
        set: &mut JoinSet<(usize, LeaveReason)>,
        left: &mut [bool],
    ) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let done = async {
            let mut panicked = None;
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok((seat, _)) => left[seat] = true,
                    Err(e) => {
                        panicked.get_or_insert(panic_reason(e));
                    }
                }
            }
            panicked
        };

        let timed = tokio::time::timeout(grace, done).await;

        match timed {
            Ok(None) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Ok(Some(reason)) => Err(RuntimeError::PhilosopherPanicked { reason }),
            Err(_) => {
                let stuck: Vec<usize> = left
                    .iter()
                    .enumerate()
                    .filter(|(_, gone)| !**gone)
                    .map(|(seat, _)| seat)
                    .collect();
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded).with_reason(format!("{stuck:?}")),
                );
                set.abort_all();
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}

fn panic_reason(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic().as_ref())
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time;

    use crate::policies::{BackoffPolicy, Interval};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Event>>);

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            let mut evs = self.0.lock().clone();
            evs.sort_by_key(|e| e.seq);
            evs
        }

        fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
            self.0.lock().iter().filter(|e| pred(e)).count()
        }

        fn transitions(&self) -> usize {
            self.count(|e| e.kind == EventKind::StateChanged)
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().push(ev.clone());
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
        fn queue_capacity(&self) -> usize {
            1 << 16
        }
    }

    fn config(seats: usize, food: u64) -> Config {
        Config {
            seats,
            food,
            bus_capacity: 1 << 16,
            ..Config::default()
        }
    }

    fn table_with_recorder(cfg: Config) -> (Arc<Table>, Arc<Recorder>) {
        let rec = Arc::new(Recorder::default());
        let table = Table::builder(cfg)
            .with_subscriber(rec.clone())
            .build()
            .unwrap();
        (table, rec)
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        assert_eq!(
            Table::builder(config(1, 10)).build().err(),
            Some(ConfigError::TooFewSeats { seats: 1 })
        );
        assert_eq!(
            Table::builder(config(5, 0)).build().err(),
            Some(ConfigError::NoFood)
        );
    }

    #[test]
    fn test_initial_snapshot() {
        let table = Table::builder(config(5, 3)).build().unwrap();
        assert_eq!(table.current_food_supply(), 3);
        assert_eq!(table.availability(), vec![true; 5]);
        assert_eq!(table.states(), vec![PhilosopherState::Hungry; 5]);
        assert_eq!(table.state(5), None);
    }

    #[test]
    fn test_set_paused_reports_changes_only() {
        let table = Table::builder(config(3, 3)).build().unwrap();
        assert_eq!(table.set_paused(PauseTarget::Seat(1), true), Ok(1));
        assert_eq!(table.set_paused(PauseTarget::Seat(1), true), Ok(0));
        assert_eq!(table.pause_all(), 2);
        assert_eq!(table.is_paused(0), Some(true));
        assert_eq!(table.resume_all(), 3);
        assert_eq!(
            table.set_paused(PauseTarget::Seat(3), true),
            Err(ControlError::UnknownSeat { seat: 3 })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_five_seats_three_portions() {
        let (table, rec) = table_with_recorder(config(5, 3));
        let outcome = table.run().await.unwrap();

        assert_eq!(
            outcome,
            Outcome {
                reason: StopReason::FoodExhausted,
                meals: 3,
                food_left: 0
            }
        );
        assert_eq!(table.current_food_supply(), 0);
        assert_eq!(table.ring().held_forks(), 0);

        let events = rec.events();
        let served: Vec<u64> = events
            .iter()
            .filter(|e| e.is_transition_to(PhilosopherState::Eating))
            .filter_map(|e| e.food)
            .collect();
        assert_eq!(served, vec![2, 1, 0]);
        assert_eq!(rec.count(|e| e.kind == EventKind::FoodExhausted), 1);
        assert_eq!(rec.count(|e| e.kind == EventKind::Left), 5);
        assert_eq!(rec.count(|e| e.kind == EventKind::AllStoppedWithin), 1);
        assert!(
            events
                .iter()
                .filter(|e| e.kind == EventKind::Left)
                .all(|e| e.reason.as_deref() == Some("food_gone"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_seats_single_portion() {
        let (table, rec) = table_with_recorder(config(2, 1));
        let outcome = table.run().await.unwrap();
        assert_eq!(outcome.meals, 1);
        assert_eq!(outcome.reason, StopReason::FoodExhausted);

        let eaters: Vec<usize> = rec
            .events()
            .iter()
            .filter(|e| e.is_transition_to(PhilosopherState::Eating))
            .filter_map(|e| e.seat)
            .collect();
        assert_eq!(eaters.len(), 1);
        assert_eq!(table.ring().held_forks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_all_freezes_table_until_resume() {
        let cfg = Config {
            eat: Interval::up_to(Duration::from_millis(200)),
            think: Interval::up_to(Duration::from_millis(300)),
            ..config(5, 10_000)
        };
        let (table, rec) = table_with_recorder(cfg);
        let runner = {
            let table = Arc::clone(&table);
            tokio::spawn(async move { table.run().await })
        };

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(table.pause_all(), 5);
        time::sleep(Duration::from_millis(50)).await;

        let before = rec.transitions();
        let food = table.current_food_supply();
        let states = table.states();
        let forks = table.availability();

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(rec.transitions(), before);
        assert_eq!(table.current_food_supply(), food);
        assert_eq!(table.states(), states);
        assert_eq!(table.availability(), forks);

        let eating = states
            .iter()
            .filter(|s| **s == PhilosopherState::Eating)
            .count();
        assert_eq!(table.ring().held_forks(), 2 * eating);

        assert_eq!(table.resume_all(), 5);
        time::sleep(Duration::from_secs(2)).await;
        assert!(rec.transitions() > before);
        assert!(table.current_food_supply() < food);

        table.cancel();
        let outcome = runner.await.unwrap().unwrap();
        assert_eq!(outcome.reason, StopReason::Cancelled);
        assert_eq!(table.ring().held_forks(), 0);
        assert_eq!(rec.count(|e| e.kind == EventKind::Paused), 5);
        assert_eq!(rec.count(|e| e.kind == EventKind::Resumed), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_run_is_rejected() {
        let table = Table::builder(config(2, 1)).build().unwrap();
        table.run().await.unwrap();
        assert!(matches!(
            table.run().await,
            Err(RuntimeError::AlreadyRunning)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_philosopher_panic_stops_table() {
        let cfg = Config {
            eat: Interval::fixed(Duration::from_secs(1)),
            think: Interval::fixed(Duration::from_secs(1)),
            ..config(2, 100)
        };
        let table = Table::builder(cfg).build().unwrap();
        let runner = {
            let table = Arc::clone(&table);
            tokio::spawn(async move { table.run().await })
        };

        time::sleep(Duration::from_millis(10)).await;
        let eater = table
            .states()
            .iter()
            .position(|s| *s == PhilosopherState::Eating)
            .unwrap();
        // Steal the forks: the eater's own release must now fail.
        table.ring().release_pair(eater);

        let err = runner.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::PhilosopherPanicked { ref reason } if reason.contains("without holding")
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_contended_sessions_serve_every_portion_once() {
        const SEATS: usize = 7;
        const FOOD: u64 = 200;

        for round in 0..10 {
            let cfg = Config {
                retry: BackoffPolicy::constant(Duration::from_micros(50)),
                eat: Interval::up_to(Duration::from_millis(1)),
                think: Interval::up_to(Duration::from_millis(1)),
                ..config(SEATS, FOOD)
            };
            let (table, rec) = table_with_recorder(cfg);
            let outcome = table.run().await.unwrap();

            assert_eq!(outcome.reason, StopReason::FoodExhausted, "round {round}");
            assert_eq!(outcome.meals, FOOD, "round {round}");
            assert_eq!(
                table.ring().held_forks(),
                0,
                "round {round}: states {:?}, forks {:?}",
                table.states(),
                table.availability()
            );
            assert!(!table.states().contains(&PhilosopherState::Eating));

            let mut served: Vec<u64> = rec
                .events()
                .iter()
                .filter(|e| e.is_transition_to(PhilosopherState::Eating))
                .filter_map(|e| e.food)
                .collect();
            served.sort_unstable();
            assert_eq!(served, (0..FOOD).collect::<Vec<_>>(), "round {round}");
            assert_eq!(rec.count(|e| e.kind == EventKind::FoodExhausted), 1);
            assert_eq!(rec.count(|e| e.kind == EventKind::Left), SEATS);
        }
    }
}
