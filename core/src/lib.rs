//! Adaptive breaker - client-side overload protection
//!
//! This crate provides the admission-control engine that protected clients
//! (SQL, cache, document stores, brokers, HTTP and RPC peers) call around
//! every remote operation:
//! - Time-bucketed rolling window with lazy decay against a monotonic clock
//! - Google SRE style adaptive throttling: shed `max(0, (total - k*successes) / (total + 1))`
//!   of calls, no timers and no half-open phase
//! - Resource-keyed breaker group with single-instance get-or-create
//! - Per-call-site outcome classification
//!
//! # Example
//!
//! ```rust
//! use adaptive_breaker::{BreakerGroup, CallError};
//! use std::io;
//!
//! let group = BreakerGroup::builder()
//!     .k(1.5)
//!     .on_open(|name| eprintln!("breaker {} is shedding load", name))
//!     .build();
//!
//! // Execute with breaker protection; only error-free outcomes count as successes
//! let result = group.call(
//!     "http://inventory:8080",
//!     || Ok::<_, io::Error>("200 OK"),
//!     |err: Option<&io::Error>| err.is_none(),
//! );
//!
//! match result {
//!     Ok(body) => assert_eq!(body, "200 OK"),
//!     Err(CallError::Unavailable(shed)) => eprintln!("not sent: {}", shed),
//!     Err(CallError::Execution(e)) => eprintln!("downstream failed: {}", e),
//! }
//! ```

pub mod breaker;
pub mod builder;
pub mod callbacks;
pub mod classifier;
mod clock;
pub mod errors;
pub mod group;
mod rnd;
#[cfg(test)]
pub(crate) mod testing;
pub mod window;

pub use breaker::{AdaptiveBreaker, Config, State, Stats};
pub use builder::{BreakerBuilder, GroupBuilder};
pub use classifier::{Classifier, DefaultClassifier, PredicateClassifier};
pub use errors::{CallError, ServiceUnavailable};
pub use group::BreakerGroup;
pub use window::{Bucket, RollingWindow};
