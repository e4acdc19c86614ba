//! Error types for breaker-protected calls

/// Returned by [`AdaptiveBreaker::allow`](crate::AdaptiveBreaker::allow) when a
/// call is shed.
///
/// No remote call was attempted. Callers should back off or surface an
/// overload signal rather than retry immediately.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("breaker '{breaker}' is shedding load (drop ratio {drop_ratio:.3})")]
pub struct ServiceUnavailable {
    /// Name of the breaker that rejected the call
    pub breaker: String,
    /// Drop probability in effect when the call was rejected
    pub drop_ratio: f64,
}

/// Outcome of a protected call that did not succeed
#[derive(Debug, thiserror::Error)]
pub enum CallError<E> {
    /// The breaker shed the call, the operation never ran
    #[error(transparent)]
    Unavailable(#[from] ServiceUnavailable),
    /// The operation ran and failed; the error is passed through untouched
    #[error(transparent)]
    Execution(E),
}

impl<E> CallError<E> {
    /// Whether the call was shed without running the operation
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CallError::Unavailable(_))
    }

    /// Borrow the operation's own error, if it ran
    pub fn execution(&self) -> Option<&E> {
        match self {
            CallError::Execution(e) => Some(e),
            CallError::Unavailable(_) => None,
        }
    }

    /// Take the operation's own error, if it ran
    pub fn into_execution(self) -> Option<E> {
        match self {
            CallError::Execution(e) => Some(e),
            CallError::Unavailable(_) => None,
        }
    }
}
