//! Adaptive breaker implementation
//!
//! Client-side throttling in the style of the Google SRE book: every call to
//! [`AdaptiveBreaker::allow`] recomputes a drop probability from the rolling
//! window,
//!
//! ```text
//! drop_ratio = max(0, (total - k * successes) / (total + 1))
//! ```
//!
//! and sheds that fraction of calls. There is no timed half-open phase:
//! calls that still get through keep feeding the window, so the drop ratio
//! falls back to zero on its own once the downstream resource heals.

use crate::{
    builder::BreakerBuilder, callbacks::Callbacks, classifier::Classifier, errors::CallError,
    errors::ServiceUnavailable, rnd::Rnd, window::RollingWindow,
};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

/// Default tolerance multiplier
pub const DEFAULT_K: f64 = 1.5;

/// Default total window span
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// Default number of buckets in the window (250ms each with the default span)
pub const DEFAULT_BUCKETS: usize = 40;

/// Breaker tunables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Tolerance multiplier: how many times the measured successes may be
    /// attempted before throttling starts. Lower values throttle earlier.
    pub k: f64,

    /// Total time span covered by the rolling window
    pub window: Duration,

    /// Number of buckets the window is divided into
    pub buckets: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            window: DEFAULT_WINDOW,
            buckets: DEFAULT_BUCKETS,
        }
    }
}

impl Config {
    /// Time span of a single bucket
    pub fn bucket_duration(&self) -> Duration {
        let buckets = u32::try_from(self.buckets.max(1)).unwrap_or(u32::MAX);
        self.window / buckets
    }
}

/// Advisory breaker state.
///
/// Admission is always recomputed from the window; the state only records
/// whether the last decision saw a positive drop ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
    Closed = 0,
    Open = 1,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Closed => "Closed",
            State::Open => "Open",
        }
    }

    fn from_u8(raw: u8) -> Self {
        if raw == State::Open as u8 {
            State::Open
        } else {
            State::Closed
        }
    }
}

/// Point-in-time view of a breaker's window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// Weighted successes in the window
    pub successes: f64,
    /// Attempts recorded in the window
    pub total: i64,
    /// Drop probability a call would face right now
    pub drop_ratio: f64,
    /// Advisory state as of the last admission decision
    pub state: State,
}

/// Adaptive breaker protecting one resource
#[derive(Debug)]
pub struct AdaptiveBreaker {
    name: String,
    k: f64,
    state: AtomicU8,
    window: RollingWindow,
    callbacks: Callbacks,
    rnd: Rnd,
}

impl AdaptiveBreaker {
    /// Create a breaker with the given configuration (use builder() for callbacks)
    pub fn new(name: impl Into<String>, config: Config) -> Self {
        BreakerBuilder::new(name).config(config).build()
    }

    pub(crate) fn from_parts(
        name: String,
        k: f64,
        window: RollingWindow,
        callbacks: Callbacks,
        rnd: Rnd,
    ) -> Self {
        Self {
            name,
            k,
            state: AtomicU8::new(State::Closed as u8),
            window,
            callbacks,
            rnd,
        }
    }

    /// Create a new breaker builder
    pub fn builder(name: impl Into<String>) -> BreakerBuilder {
        BreakerBuilder::new(name)
    }

    /// Decide whether a call may proceed.
    ///
    /// Returns [`ServiceUnavailable`] when the call is shed. Never blocks.
    pub fn allow(&self) -> Result<(), ServiceUnavailable> {
        let (successes, total) = self.window.totals();
        let drop_ratio = drop_ratio(self.k, successes, total);

        if drop_ratio <= 0.0 {
            self.transition(State::Open, State::Closed, drop_ratio);
            return Ok(());
        }

        self.transition(State::Closed, State::Open, drop_ratio);

        if self.rnd.next_f64() < drop_ratio {
            tracing::event!(
                name: "adaptive_breaker.rejected",
                tracing::Level::DEBUG,
                breaker.name = %self.name,
                breaker.drop_ratio = drop_ratio,
            );
            return Err(ServiceUnavailable {
                breaker: self.name.clone(),
                drop_ratio,
            });
        }

        Ok(())
    }

    /// Record a successful protected call
    pub fn accept(&self) {
        self.window.add(1.0);
    }

    /// Record a failed protected call; it counts as an attempt but not a success
    pub fn reject(&self) {
        self.window.add(0.0);
    }

    /// Execute a fallible operation with breaker protection.
    ///
    /// The operation only runs when [`allow`](Self::allow) admits it. Its
    /// outcome is classified and recorded, and its own result is returned
    /// unchanged. Panics inside `operation` propagate and record nothing.
    pub fn call<T, E, F, C>(&self, operation: F, classify: C) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Result<T, E>,
        C: Classifier<E>,
    {
        self.allow()?;

        let result = operation();

        if classify.is_success(result.as_ref().err()) {
            self.accept();
        } else {
            self.reject();
        }

        result.map_err(CallError::Execution)
    }

    /// Current window statistics; does not change the advisory state
    pub fn stats(&self) -> Stats {
        let (successes, total) = self.window.totals();
        Stats {
            successes,
            total,
            drop_ratio: drop_ratio(self.k, successes, total),
            state: self.state(),
        }
    }

    /// Advisory state as of the last admission decision
    pub fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_open(&self) -> bool {
        self.state() == State::Open
    }

    pub fn is_closed(&self) -> bool {
        self.state() == State::Closed
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    /// Flip the advisory state only when it currently equals `from`
    fn transition(&self, from: State, to: State, drop_ratio: f64) {
        if self
            .state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        match to {
            State::Open => {
                tracing::event!(
                    name: "adaptive_breaker.opened",
                    tracing::Level::WARN,
                    breaker.name = %self.name,
                    breaker.drop_ratio = drop_ratio,
                );
            }
            State::Closed => {
                tracing::event!(
                    name: "adaptive_breaker.closed",
                    tracing::Level::INFO,
                    breaker.name = %self.name,
                );
            }
        }

        self.callbacks.notify(to, &self.name);
    }
}

fn drop_ratio(k: f64, successes: f64, total: i64) -> f64 {
    let total = total as f64;
    ((total - k * successes) / (total + 1.0)).max(0.0)
}
