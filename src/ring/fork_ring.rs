//! # ForkRing: pairwise fork arbitration and the shared food counter.
//!
//! ## Rules
//! - Seat `i` uses forks `i` and `(i + 1) % seats`.
//! - A pair goes available → held and held → available in one critical section.
//! - A fork is available iff no seat holds it.
//! - The food counter only decreases, by exactly one per successful decrement,
//!   and stops at zero; reaching zero cancels the termination token once.
//! - No acquisition succeeds after the food is exhausted.
//!
//! The critical section is a [`parking_lot::Mutex`] held only for the check and
//! the flip, never across an `.await`.

use parking_lot::Mutex;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{debug, info};

use crate::error::{ConfigError, RingError};

/// State guarded by the ring-wide lock.
#[derive(Debug)]
struct Forks {
    /// `holders[f]` is the seat holding fork `f`, `None` if available.
    holders: Vec<Option<usize>>,
    /// Remaining portions.
    food: u64,
}

/// Circular table of forks with an attached food counter.
///
/// Shared by reference (usually `Arc<ForkRing>`) among all philosophers; the
/// ring knows nothing about them beyond the seat id passed to each call.
///
/// # Example
/// ```
/// use forkring::ForkRing;
///
/// let ring = ForkRing::new(5, 3).unwrap();
/// assert!(ring.try_acquire_pair(0));
/// assert!(!ring.try_acquire_pair(1)); // fork 1 is held by seat 0
/// assert!(ring.try_acquire_pair(2));
///
/// assert_eq!(ring.decrease_food_supply(), Ok(2));
/// ring.release_pair(0);
/// assert!(ring.try_acquire_pair(4)); // forks 4 and 0
/// ```
#[derive(Debug)]
pub struct ForkRing {
    seats: usize,
    initial_food: u64,
    forks: Mutex<Forks>,
    exhausted: CancellationToken,
}

impl ForkRing {
    /// Creates a ring of `seats` available forks and `food` portions.
    ///
    /// Rejects `seats < 2` and `food == 0`.
    pub fn new(seats: usize, food: u64) -> Result<Self, ConfigError> {
        if seats < 2 {
            return Err(ConfigError::TooFewSeats { seats });
        }
        if food == 0 {
            return Err(ConfigError::NoFood);
        }
        debug!(seats, food, "forks are created");
        Ok(Self {
            seats,
            initial_food: food,
            forks: Mutex::new(Forks {
                holders: vec![None; seats],
                food,
            }),
            exhausted: CancellationToken::new(),
        })
    }

    /// Number of seats (and forks).
    #[inline]
    pub fn seats(&self) -> usize {
        self.seats
    }

    /// Food supply the ring was created with.
    #[inline]
    pub fn initial_food(&self) -> u64 {
        self.initial_food
    }

    /// Returns the `(left, right)` forks of `seat`.
    pub fn pair(&self, seat: usize) -> Result<(usize, usize), RingError> {
        if seat >= self.seats {
            return Err(RingError::SeatOutOfRange {
                seat,
                seats: self.seats,
            });
        }
        Ok((seat, (seat + 1) % self.seats))
    }

    /// Takes both forks of `seat` if both are available and food remains.
    ///
    /// Never blocks and has no side effect on failure; retrying is the
    /// caller's business.
    ///
    /// # Panics
    /// If `seat` is out of range.
    pub fn try_acquire_pair(&self, seat: usize) -> bool {
        let (left, right) = self.pair(seat).unwrap_or_else(|e| panic!("{e}"));

        let mut forks = self.forks.lock();
        if forks.food == 0 {
            return false;
        }
        if forks.holders[left].is_some() || forks.holders[right].is_some() {
            return false;
        }
        forks.holders[left] = Some(seat);
        forks.holders[right] = Some(seat);
        drop(forks);

        debug!(seat, left, right, "has taken the forks");
        true
    }

    /// Returns both forks of `seat`.
    ///
    /// Fails without touching the table if `seat` does not hold both forks,
    /// i.e. on a double release or a release without a prior acquire.
    pub fn try_release_pair(&self, seat: usize) -> Result<(), RingError> {
        let (left, right) = self.pair(seat)?;

        let mut forks = self.forks.lock();
        if forks.holders[left] != Some(seat) || forks.holders[right] != Some(seat) {
            return Err(RingError::NotHeld { seat, left, right });
        }
        forks.holders[left] = None;
        forks.holders[right] = None;
        drop(forks);

        debug!(seat, left, right, "has left the forks");
        Ok(())
    }

    /// Returns both forks of `seat`.
    ///
    /// # Panics
    /// On any [`RingError`] from [`try_release_pair`](Self::try_release_pair):
    /// a corrupted fork table must not be carried forward.
    pub fn release_pair(&self, seat: usize) {
        if let Err(e) = self.try_release_pair(seat) {
            panic!("{e}");
        }
    }

    /// Takes one portion and returns what is left.
    ///
    /// The decrement that reaches zero cancels the termination token; any call
    /// after that returns [`RingError::FoodExhausted`] and changes nothing.
    pub fn decrease_food_supply(&self) -> Result<u64, RingError> {
        let remaining = {
            let mut forks = self.forks.lock();
            if forks.food == 0 {
                return Err(RingError::FoodExhausted);
            }
            forks.food -= 1;
            if forks.food == 0 {
                self.exhausted.cancel();
            }
            forks.food
        };

        info!(food = remaining, "food quantity");
        if remaining == 0 {
            info!("food is finished, stopping the simulation");
        }
        Ok(remaining)
    }

    /// Snapshot of the food counter.
    pub fn current_food_supply(&self) -> u64 {
        self.forks.lock().food
    }

    /// True once the food counter reached zero.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted.is_cancelled()
    }

    /// Completes when the food counter reaches zero (immediately if it already has).
    pub fn exhausted(&self) -> WaitForCancellationFuture<'_> {
        self.exhausted.cancelled()
    }

    /// True if `fork` exists and nobody holds it.
    pub fn is_available(&self, fork: usize) -> bool {
        matches!(self.forks.lock().holders.get(fork), Some(None))
    }

    /// Seat holding `fork`, if any.
    pub fn holder(&self, fork: usize) -> Option<usize> {
        self.forks.lock().holders.get(fork).copied().flatten()
    }

    /// Availability flag of every fork, in fork order.
    pub fn availability(&self) -> Vec<bool> {
        self.forks
            .lock()
            .holders
            .iter()
            .map(Option::is_none)
            .collect()
    }

    /// Number of forks currently held.
    pub fn held_forks(&self) -> usize {
        self.forks
            .lock()
            .holders
            .iter()
            .filter(|h| h.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    const FREE: usize = usize::MAX;

    #[test]
    fn test_rejects_degenerate_rings() {
        assert_eq!(
            ForkRing::new(1, 10).unwrap_err(),
            ConfigError::TooFewSeats { seats: 1 }
        );
        assert_eq!(ForkRing::new(0, 10).unwrap_err(), ConfigError::TooFewSeats { seats: 0 });
        assert_eq!(ForkRing::new(5, 0).unwrap_err(), ConfigError::NoFood);
    }

    #[test]
    fn test_starts_with_every_fork_available() {
        let ring = ForkRing::new(4, 43).unwrap();
        assert_eq!(ring.availability(), vec![true; 4]);
        assert_eq!(ring.held_forks(), 0);
        assert_eq!(ring.current_food_supply(), 43);
        assert!(!ring.is_exhausted());
    }

    #[test]
    fn test_pair_wraps_around() {
        let ring = ForkRing::new(5, 1).unwrap();
        assert_eq!(ring.pair(0), Ok((0, 1)));
        assert_eq!(ring.pair(4), Ok((4, 0)));
        assert_eq!(
            ring.pair(5),
            Err(RingError::SeatOutOfRange { seat: 5, seats: 5 })
        );
    }

    #[test]
    fn test_neighbours_exclude_each_other() {
        let ring = ForkRing::new(5, 10).unwrap();
        assert!(ring.try_acquire_pair(0));
        assert!(!ring.try_acquire_pair(1));
        assert!(!ring.try_acquire_pair(4));
        assert!(ring.try_acquire_pair(2));
        assert!(!ring.try_acquire_pair(3));

        assert_eq!(ring.holder(0), Some(0));
        assert_eq!(ring.holder(1), Some(0));
        assert_eq!(ring.holder(2), Some(2));
        assert_eq!(ring.holder(3), Some(2));
        assert_eq!(ring.holder(4), None);
        assert_eq!(ring.held_forks(), 4);
    }

    #[test]
    fn test_failed_acquire_has_no_side_effect() {
        let ring = ForkRing::new(3, 10).unwrap();
        assert!(ring.try_acquire_pair(1));
        let before = ring.availability();
        assert!(!ring.try_acquire_pair(0));
        assert!(!ring.try_acquire_pair(2));
        assert_eq!(ring.availability(), before);
    }

    #[test]
    fn test_two_seats_share_both_forks() {
        let ring = ForkRing::new(2, 1).unwrap();
        assert!(ring.try_acquire_pair(0));
        assert!(!ring.try_acquire_pair(1));
        assert_eq!(ring.availability(), vec![false, false]);

        ring.release_pair(0);
        assert!(ring.try_acquire_pair(1));
        assert_eq!(ring.holder(0), Some(1));
        assert_eq!(ring.holder(1), Some(1));
    }

    #[test]
    fn test_double_release_is_rejected() {
        let ring = ForkRing::new(3, 10).unwrap();
        assert!(ring.try_acquire_pair(0));
        assert_eq!(ring.try_release_pair(0), Ok(()));
        assert_eq!(
            ring.try_release_pair(0),
            Err(RingError::NotHeld { seat: 0, left: 0, right: 1 })
        );
        assert_eq!(ring.availability(), vec![true; 3]);
    }

    #[test]
    fn test_release_by_non_holder_keeps_table() {
        let ring = ForkRing::new(3, 10).unwrap();
        assert!(ring.try_acquire_pair(0));
        // seat 1 shares fork 1 with seat 0 but never acquired.
        assert!(ring.try_release_pair(1).is_err());
        assert_eq!(ring.holder(1), Some(0));
        assert_eq!(ring.held_forks(), 2);
    }

    #[test]
    #[should_panic(expected = "without holding them")]
    fn test_release_without_acquire_panics() {
        let ring = ForkRing::new(3, 10).unwrap();
        ring.release_pair(2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_acquire_panics() {
        let ring = ForkRing::new(3, 10).unwrap();
        ring.try_acquire_pair(3);
    }

    #[test]
    fn test_food_counts_down_to_zero_once() {
        let ring = ForkRing::new(5, 3).unwrap();
        assert_eq!(ring.decrease_food_supply(), Ok(2));
        assert_eq!(ring.current_food_supply(), 2);
        assert_eq!(ring.decrease_food_supply(), Ok(1));
        assert!(!ring.is_exhausted());
        assert_eq!(ring.decrease_food_supply(), Ok(0));
        assert!(ring.is_exhausted());

        assert_eq!(ring.decrease_food_supply(), Err(RingError::FoodExhausted));
        assert_eq!(ring.current_food_supply(), 0);
        assert_eq!(ring.initial_food(), 3);
    }

    #[test]
    fn test_no_acquire_after_exhaustion() {
        let ring = ForkRing::new(4, 1).unwrap();
        assert!(ring.try_acquire_pair(0));
        assert_eq!(ring.decrease_food_supply(), Ok(0));

        assert!(!ring.try_acquire_pair(2));
        // Held pairs can still be returned.
        ring.release_pair(0);
        assert_eq!(ring.held_forks(), 0);
    }

    #[test]
    fn test_last_portion_goes_to_one_of_two_holders() {
        let ring = ForkRing::new(5, 1).unwrap();
        assert!(ring.try_acquire_pair(0));
        assert!(ring.try_acquire_pair(2));

        assert_eq!(ring.decrease_food_supply(), Ok(0));
        assert_eq!(ring.decrease_food_supply(), Err(RingError::FoodExhausted));

        // The loser hands its pair back; the winner still eats.
        ring.release_pair(0);
        assert_eq!(ring.held_forks(), 2);
        assert_eq!(ring.holder(2), Some(2));
        ring.release_pair(2);
        assert_eq!(ring.held_forks(), 0);
        assert_eq!(ring.current_food_supply(), 0);
    }

    /// Threads race acquire → decrement; a failed decrement returns the pair.
    /// Exactly `FOOD` portions are served and no fork stays held.
    #[test]
    fn test_concurrent_serving_stops_at_zero() {
        const SEATS: usize = 6;
        const FOOD: u64 = 5_000;

        let ring = Arc::new(ForkRing::new(SEATS, FOOD).unwrap());
        let served = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..SEATS)
            .map(|seat| {
                let ring = Arc::clone(&ring);
                let served = Arc::clone(&served);
                thread::spawn(move || {
                    while !ring.is_exhausted() {
                        if !ring.try_acquire_pair(seat) {
                            thread::yield_now();
                            continue;
                        }
                        match ring.decrease_food_supply() {
                            Ok(_) => {
                                served.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => assert_eq!(e, RingError::FoodExhausted),
                        }
                        ring.release_pair(seat);
                    }
                })
            })
            .collect();

        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(served.load(Ordering::Relaxed) as u64, FOOD);
        assert_eq!(ring.current_food_supply(), 0);
        assert_eq!(ring.held_forks(), 0);
        assert!(!ring.try_acquire_pair(0));
    }

    #[tokio::test]
    async fn test_exhausted_future_completes() {
        let ring = Arc::new(ForkRing::new(2, 1).unwrap());
        let waiter = {
            let ring = Arc::clone(&ring);
            tokio::spawn(async move { ring.exhausted().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        ring.decrease_food_supply().unwrap();
        waiter.await.unwrap();
        ring.exhausted().await;
    }

    /// Every seat hammers the ring from its own thread; each successful
    /// acquisition claims both forks in a side table that must be free.
    #[test]
    fn test_concurrent_pairs_are_exclusive() {
        const SEATS: usize = 5;
        const ROUNDS: usize = 20_000;

        let ring = Arc::new(ForkRing::new(SEATS, u64::MAX).unwrap());
        let owners: Arc<Vec<AtomicUsize>> =
            Arc::new((0..SEATS).map(|_| AtomicUsize::new(FREE)).collect());
        let meals = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..SEATS)
            .map(|seat| {
                let ring = Arc::clone(&ring);
                let owners = Arc::clone(&owners);
                let meals = Arc::clone(&meals);
                thread::spawn(move || {
                    let (left, right) = ring.pair(seat).unwrap();
                    for _ in 0..ROUNDS {
                        if !ring.try_acquire_pair(seat) {
                            thread::yield_now();
                            continue;
                        }
                        for fork in [left, right] {
                            let prev = owners[fork].swap(seat, Ordering::SeqCst);
                            assert_eq!(prev, FREE, "fork {fork} already owned by {prev}");
                        }
                        meals.fetch_add(1, Ordering::Relaxed);
                        for fork in [left, right] {
                            owners[fork].store(FREE, Ordering::SeqCst);
                        }
                        ring.release_pair(seat);
                    }
                })
            })
            .collect();

        for w in workers {
            w.join().unwrap();
        }
        assert!(meals.load(Ordering::Relaxed) > 0);
        assert_eq!(ring.held_forks(), 0);
    }

    /// Deterministic round-robin schedule: eaters return their forks at the
    /// start of the next round, then every hungry seat tries once, starting
    /// from a rotating position. After each round no hungry seat may find
    /// both of its forks free, and every seat gets to eat.
    #[test]
    fn test_round_robin_never_freezes() {
        const SEATS: usize = 5;
        const ROUNDS: usize = 50;

        let ring = ForkRing::new(SEATS, u64::MAX).unwrap();
        let mut eating = [false; SEATS];
        let mut meals = [0usize; SEATS];

        for round in 0..ROUNDS {
            for seat in 0..SEATS {
                if eating[seat] {
                    ring.release_pair(seat);
                    eating[seat] = false;
                }
            }
            for offset in 0..SEATS {
                let seat = (round + offset) % SEATS;
                if ring.try_acquire_pair(seat) {
                    eating[seat] = true;
                    meals[seat] += 1;
                }
            }

            let eaters = eating.iter().filter(|e| **e).count();
            assert!(eaters > 0, "round {round}: nobody could eat");
            assert_eq!(ring.held_forks(), 2 * eaters);
            for seat in (0..SEATS).filter(|s| !eating[*s]) {
                let (left, right) = ring.pair(seat).unwrap();
                assert!(
                    !(ring.is_available(left) && ring.is_available(right)),
                    "round {round}: seat {seat} left hungry next to two free forks"
                );
            }
        }

        for (seat, n) in meals.iter().enumerate() {
            assert!(*n > 0, "seat {seat} starved");
        }
    }
}
