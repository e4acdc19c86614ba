//! Builder API for ergonomic breaker and group configuration

use crate::{
    breaker::{AdaptiveBreaker, Config},
    callbacks::Callbacks,
    clock::Clock,
    group::BreakerGroup,
    rnd::Rnd,
    window::RollingWindow,
};
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating breakers with fluent API
pub struct BreakerBuilder {
    name: String,
    config: Config,
    callbacks: Callbacks,
    clock: Option<Clock>,
    rnd: Rnd,
}

impl BreakerBuilder {
    /// Create a new builder for a breaker with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Config::default(),
            callbacks: Callbacks::new(),
            clock: None,
            rnd: Rnd::default(),
        }
    }

    /// Replace all tunables at once
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the tolerance multiplier (negative values are clamped to 0.0)
    pub fn k(mut self, k: f64) -> Self {
        self.config.k = k.max(0.0);
        self
    }

    /// Set the total window span
    pub fn window(mut self, window: Duration) -> Self {
        self.config.window = window;
        self
    }

    /// Set the number of buckets (at least one)
    pub fn buckets(mut self, buckets: usize) -> Self {
        self.config.buckets = buckets.max(1);
        self
    }

    /// Set callback for when the breaker starts shedding
    pub fn on_open<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_open = Some(Arc::new(f));
        self
    }

    /// Set callback for when the breaker stops shedding
    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_close = Some(Arc::new(f));
        self
    }

    pub(crate) fn callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    #[cfg(test)]
    pub(crate) fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    #[cfg(test)]
    pub(crate) fn rnd(mut self, rnd: Rnd) -> Self {
        self.rnd = rnd;
        self
    }

    /// Build the breaker
    pub fn build(self) -> AdaptiveBreaker {
        let k = if self.config.k.is_nan() {
            crate::breaker::DEFAULT_K
        } else {
            self.config.k.max(0.0)
        };

        let window = RollingWindow::with_clock(
            self.config.buckets,
            self.config.bucket_duration(),
            self.clock.unwrap_or_default(),
        );

        AdaptiveBreaker::from_parts(self.name, k, window, self.callbacks, self.rnd)
    }
}

/// Builder for breaker groups; every breaker the group creates shares the
/// same tunables and callbacks
#[derive(Default)]
pub struct GroupBuilder {
    config: Config,
    callbacks: Callbacks,
}

impl GroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all tunables at once
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the tolerance multiplier (negative values are clamped to 0.0)
    pub fn k(mut self, k: f64) -> Self {
        self.config.k = k.max(0.0);
        self
    }

    /// Set the total window span
    pub fn window(mut self, window: Duration) -> Self {
        self.config.window = window;
        self
    }

    /// Set the number of buckets (at least one)
    pub fn buckets(mut self, buckets: usize) -> Self {
        self.config.buckets = buckets.max(1);
        self
    }

    /// Set callback for when any breaker of the group starts shedding
    pub fn on_open<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_open = Some(Arc::new(f));
        self
    }

    /// Set callback for when any breaker of the group stops shedding
    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_close = Some(Arc::new(f));
        self
    }

    /// Build the group
    pub fn build(self) -> BreakerGroup {
        BreakerGroup::from_parts(self.config, self.callbacks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_builder_defaults() {
        let breaker = BreakerBuilder::new("test").build();

        assert_eq!(breaker.state().as_str(), "Closed");
        assert!(breaker.is_closed());
        assert_eq!(breaker.k(), 1.5);
    }

    #[test]
    fn test_builder_custom_config() {
        let breaker = BreakerBuilder::new("test")
            .k(2.0)
            .window(Duration::from_secs(5))
            .buckets(10)
            .build();

        assert_eq!(breaker.k(), 2.0);
        assert!(breaker.allow().is_ok());
    }

    #[test]
    fn test_builder_clamps_out_of_range_values() {
        let breaker = BreakerBuilder::new("test").k(-3.0).buckets(0).build();
        assert_eq!(breaker.k(), 0.0);

        let nan = BreakerBuilder::new("test")
            .config(Config {
                k: f64::NAN,
                ..Default::default()
            })
            .build();
        assert_eq!(nan.k(), 1.5);
    }

    #[test]
    fn test_zero_k_throttles_even_healthy_traffic() {
        let breaker = BreakerBuilder::new("test").k(0.0).rnd(Rnd::Fixed(0.0)).build();
        breaker.accept();

        // (1 - 0) / 2
        assert_eq!(breaker.stats().drop_ratio, 0.5);
        assert!(breaker.allow().is_err());
    }

    #[test]
    fn test_builder_with_callbacks() {
        let opened = Arc::new(AtomicBool::new(false));
        let opened_clone = opened.clone();

        let breaker = BreakerBuilder::new("test")
            .rnd(Rnd::Fixed(0.0))
            .on_open(move |_name| {
                opened_clone.store(true, Ordering::SeqCst);
            })
            .build();

        breaker.reject();
        breaker.reject();
        let _ = breaker.allow();

        assert!(opened.load(Ordering::SeqCst));
    }

    #[test]
    fn test_group_builder() {
        let group = GroupBuilder::new()
            .k(2.0)
            .window(Duration::from_secs(1))
            .buckets(4)
            .build();

        assert_eq!(group.config().k, 2.0);
        assert_eq!(group.config().bucket_duration(), Duration::from_millis(250));
        assert_eq!(group.get("redis://cache").k(), 2.0);
    }
}
