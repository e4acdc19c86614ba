//! Time-bucketed rolling window
//!
//! This module provides the accumulator behind every breaker:
//! - `Bucket`: weighted-success sum and attempt count for one time slice
//! - `RollingWindow`: fixed ring of buckets advanced lazily against a monotonic clock
//!
//! A success is recorded as weight `1.0` and a failure as weight `0.0`, so a
//! bucket's `sum` is the number of successes and its `count` the number of attempts.

use crate::clock::Clock;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Smallest bucket span accepted by a window
pub const MIN_BUCKET_DURATION: Duration = Duration::from_millis(1);

/// Aggregated outcomes for one discrete time slice
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    sum: f64,
    count: i64,
}

impl Bucket {
    /// Sum of the weights recorded in this slice
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Number of observations recorded in this slice
    pub fn count(&self) -> i64 {
        self.count
    }

    fn add(&mut self, weight: f64) {
        self.sum += weight;
        self.count += 1;
    }

    fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }
}

/// Bucket ring plus the cursor of the last observed tick.
///
/// Invariant: `buckets[last_offset]` holds the data of tick `last_tick`.
#[derive(Debug)]
struct Ring {
    buckets: Box<[Bucket]>,
    last_offset: usize,
    last_tick: u64,
}

impl Ring {
    fn new(size: usize) -> Self {
        Self {
            buckets: vec![Bucket::default(); size].into_boxed_slice(),
            last_offset: 0,
            last_tick: 0,
        }
    }

    /// Move the cursor to `tick`, clearing every slot left over from a previous lap.
    fn advance(&mut self, tick: u64) {
        // another caller already moved past this tick
        if tick <= self.last_tick {
            return;
        }

        let size = self.buckets.len();
        let elapsed = tick - self.last_tick;
        let offset = (tick % size as u64) as usize;

        if elapsed > size as u64 {
            self.buckets.iter_mut().for_each(Bucket::reset);
        } else {
            // (last_offset, offset] with wraparound; the target slot is reused too
            let mut idx = self.last_offset;
            for _ in 0..elapsed {
                idx = (idx + 1) % size;
                self.buckets[idx].reset();
            }
        }

        self.last_tick = tick;
        self.last_offset = offset;
    }
}

/// Thread-safe rolling window of `size` buckets, each spanning `bucket_duration`.
///
/// # Locking
///
/// A single reader/writer lock guards the ring and its cursor. `add` always
/// takes the write lock. `reduce` takes the read lock when the cursor already
/// sits on the current tick and visits the buckets directly; when the cursor
/// must move it takes the write lock instead, advances, and visits under that
/// same guard. The cursor is never mutated under a shared lock.
///
/// # Example
///
/// ```rust
/// use adaptive_breaker::RollingWindow;
/// use std::time::Duration;
///
/// let window = RollingWindow::new(40, Duration::from_millis(250));
/// window.add(1.0);
/// window.add(0.0);
///
/// let (sum, count) = window.totals();
/// assert_eq!(sum, 1.0);
/// assert_eq!(count, 2);
/// ```
#[derive(Debug)]
pub struct RollingWindow {
    ring: RwLock<Ring>,
    bucket_duration: Duration,
    clock: Clock,
}

impl RollingWindow {
    /// Create a window of `size` buckets spanning `bucket_duration` each.
    ///
    /// `size` is clamped to at least one bucket and `bucket_duration` to
    /// [`MIN_BUCKET_DURATION`].
    pub fn new(size: usize, bucket_duration: Duration) -> Self {
        Self::with_clock(size, bucket_duration, Clock::default())
    }

    pub(crate) fn with_clock(size: usize, bucket_duration: Duration, clock: Clock) -> Self {
        Self {
            ring: RwLock::new(Ring::new(size.max(1))),
            bucket_duration: bucket_duration.max(MIN_BUCKET_DURATION),
            clock,
        }
    }

    /// Record one observation into the bucket for "now"
    pub fn add(&self, weight: f64) {
        let mut ring = self.write();
        let tick = self.current_tick();
        ring.advance(tick);
        let offset = ring.last_offset;
        ring.buckets[offset].add(weight);
    }

    /// Visit every bucket after bringing the window up to date
    pub fn reduce<F>(&self, mut visit: F)
    where
        F: FnMut(&Bucket),
    {
        let tick = self.current_tick();
        {
            let ring = self.read();
            if ring.last_tick >= tick {
                ring.buckets.iter().for_each(&mut visit);
                return;
            }
        }

        let mut ring = self.write();
        ring.advance(tick);
        ring.buckets.iter().for_each(visit);
    }

    /// Sum of weights and total observation count across the window
    pub fn totals(&self) -> (f64, i64) {
        let mut sum = 0.0;
        let mut count = 0;
        self.reduce(|bucket| {
            sum += bucket.sum;
            count += bucket.count;
        });
        (sum, count)
    }

    /// Number of buckets in the ring
    pub fn size(&self) -> usize {
        self.read().buckets.len()
    }

    /// Time span covered by a single bucket
    pub fn bucket_duration(&self) -> Duration {
        self.bucket_duration
    }

    fn current_tick(&self) -> u64 {
        let tick = self.clock.elapsed().as_nanos() / self.bucket_duration.as_nanos();
        u64::try_from(tick).unwrap_or(u64::MAX)
    }

    // Counters stay consistent between statements, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Ring> {
        self.ring.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ring> {
        self.ring.write().unwrap_or_else(PoisonError::into_inner)
    }
}
