//! Monotonic time source for bucket indexing

use std::time::{Duration, Instant};

/// Monotonic clock anchored at creation time.
///
/// Bucket ticks are derived from the elapsed time since the anchor, so
/// wall-clock adjustments (NTP steps, manual changes) never move a window
/// backwards or skip it forwards.
#[derive(Debug, Clone)]
pub(crate) enum Clock {
    Monotonic(Instant),

    #[cfg(test)]
    Manual(std::sync::Arc<std::sync::atomic::AtomicU64>),
}

impl Default for Clock {
    fn default() -> Self {
        Self::Monotonic(Instant::now())
    }
}

impl Clock {
    /// Time elapsed since the clock was anchored.
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Monotonic(start) => start.elapsed(),
            #[cfg(test)]
            Self::Manual(nanos) => {
                Duration::from_nanos(nanos.load(std::sync::atomic::Ordering::Acquire))
            }
        }
    }
}

/// Hand-driven clock for deterministic tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct ManualClock {
    nanos: std::sync::Arc<std::sync::atomic::AtomicU64>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> Clock {
        Clock::Manual(std::sync::Arc::clone(&self.nanos))
    }

    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(by, std::sync::atomic::Ordering::AcqRel);
    }
}
