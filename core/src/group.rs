//! Resource-keyed breaker registry
//!
//! A [`BreakerGroup`] hands out one [`AdaptiveBreaker`] per resource key (peer
//! address, topic, method name) and wraps remote calls with it. Groups are
//! explicit values: construct one, clone the handle into every client that
//! should share statistics.

use crate::{
    breaker::{AdaptiveBreaker, Config, Stats},
    builder::{BreakerBuilder, GroupBuilder},
    callbacks::Callbacks,
    classifier::Classifier,
    errors::CallError,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of lazily created breakers, one per resource key.
///
/// Breakers are never evicted; keys should come from a bounded set such as
/// configured peer addresses rather than from request data.
///
/// # Example
///
/// ```rust
/// use adaptive_breaker::{BreakerGroup, DefaultClassifier};
/// use std::io;
///
/// let group = BreakerGroup::new();
///
/// let rows = group.call(
///     "mysql://10.0.0.7:3306",
///     || Ok::<_, io::Error>(vec![1, 2, 3]),
///     DefaultClassifier,
/// );
/// assert_eq!(rows.unwrap(), vec![1, 2, 3]);
///
/// // a missing key is expected and must not count against the database
/// let missing = group.call(
///     "redis://10.0.0.9:6379",
///     || Err::<String, _>(io::Error::from(io::ErrorKind::NotFound)),
///     |err: Option<&io::Error>| err.is_none_or(|e| e.kind() == io::ErrorKind::NotFound),
/// );
/// assert!(missing.is_err());
/// assert_eq!(group.get("redis://10.0.0.9:6379").stats().successes, 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct BreakerGroup {
    inner: Arc<GroupInner>,
}

#[derive(Debug)]
struct GroupInner {
    config: Config,
    callbacks: Callbacks,
    breakers: RwLock<HashMap<String, Arc<AdaptiveBreaker>>>,
}

impl BreakerGroup {
    /// Create a group whose breakers use the default tunables
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a group whose breakers use `config`
    pub fn with_config(config: Config) -> Self {
        Self::from_parts(config, Callbacks::new())
    }

    /// Create a new group builder
    pub fn builder() -> GroupBuilder {
        GroupBuilder::new()
    }

    pub(crate) fn from_parts(config: Config, callbacks: Callbacks) -> Self {
        Self {
            inner: Arc::new(GroupInner {
                config,
                callbacks,
                breakers: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Breaker for `key`, created on first access.
    ///
    /// Concurrent first accesses converge on a single instance.
    pub fn get(&self, key: &str) -> Arc<AdaptiveBreaker> {
        {
            let breakers = self.inner.breakers.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(breaker) = breakers.get(key) {
                return Arc::clone(breaker);
            }
        }

        let mut breakers = self.inner.breakers.write().unwrap_or_else(PoisonError::into_inner);
        let breaker = breakers.entry(key.to_string()).or_insert_with(|| {
            tracing::event!(
                name: "adaptive_breaker.created",
                tracing::Level::DEBUG,
                breaker.name = %key,
            );
            Arc::new(
                BreakerBuilder::new(key)
                    .config(self.inner.config.clone())
                    .callbacks(self.inner.callbacks.clone())
                    .build(),
            )
        });
        Arc::clone(breaker)
    }

    /// Execute `operation` under the breaker for `key`.
    ///
    /// Shed calls return [`CallError::Unavailable`] without running the
    /// operation. Otherwise the outcome is classified, recorded, and the
    /// operation's own result is returned; its error comes back as
    /// [`CallError::Execution`]. Panics in `operation` propagate to the caller.
    pub fn call<T, E, F, C>(&self, key: &str, operation: F, classify: C) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Result<T, E>,
        C: Classifier<E>,
    {
        self.get(key).call(operation, classify)
    }

    /// Tunables applied to every breaker of the group
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Number of breakers created so far
    pub fn len(&self) -> usize {
        self.inner.breakers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of all breakers created so far, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .inner
            .breakers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Statistics of every breaker, sorted by key
    pub fn stats(&self) -> Vec<(String, Stats)> {
        let breakers: Vec<(String, Arc<AdaptiveBreaker>)> = self
            .inner
            .breakers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(key, breaker)| (key.clone(), Arc::clone(breaker)))
            .collect();

        let mut stats: Vec<(String, Stats)> = breakers
            .into_iter()
            .map(|(key, breaker)| (key, breaker.stats()))
            .collect();
        stats.sort_by(|a, b| a.0.cmp(&b.0));
        stats
    }
}

impl Default for BreakerGroup {
    fn default() -> Self {
        Self::new()
    }
}
