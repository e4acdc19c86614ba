//! Outcome classification for protected calls
//!
//! Each call site decides what counts against its breaker. A SQL "row not
//! found" is not a failure of the database; an HTTP 503 is.

/// Decides whether the outcome of a protected call counts as a success.
///
/// `error` is `None` when the operation returned `Ok`. Returning `true`
/// records an accept, `false` records a reject.
///
/// Closures of type `Fn(Option<&E>) -> bool` implement this trait:
///
/// ```rust
/// use adaptive_breaker::Classifier;
/// use std::io;
///
/// let classify = |err: Option<&io::Error>| {
///     err.is_none_or(|e| e.kind() == io::ErrorKind::NotFound)
/// };
///
/// assert!(classify.is_success(None::<&io::Error>));
/// assert!(classify.is_success(Some(&io::Error::from(io::ErrorKind::NotFound))));
/// assert!(!classify.is_success(Some(&io::Error::from(io::ErrorKind::TimedOut))));
/// ```
pub trait Classifier<E> {
    fn is_success(&self, error: Option<&E>) -> bool;
}

impl<E, F> Classifier<E> for F
where
    F: Fn(Option<&E>) -> bool,
{
    fn is_success(&self, error: Option<&E>) -> bool {
        self(error)
    }
}

/// Counts only error-free outcomes as successes
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl<E> Classifier<E> for DefaultClassifier {
    fn is_success(&self, error: Option<&E>) -> bool {
        error.is_none()
    }
}

/// Counts error-free outcomes and benign errors as successes.
///
/// The predicate returns `true` for errors that are expected and must not
/// penalize the breaker.
pub struct PredicateClassifier<F> {
    benign: F,
}

impl<F> PredicateClassifier<F> {
    /// Create a classifier that tolerates the errors matched by `benign`
    pub fn new(benign: F) -> Self {
        Self { benign }
    }
}

impl<E, F> Classifier<E> for PredicateClassifier<F>
where
    F: Fn(&E) -> bool,
{
    fn is_success(&self, error: Option<&E>) -> bool {
        error.is_none_or(|e| (self.benign)(e))
    }
}

impl<F> std::fmt::Debug for PredicateClassifier<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateClassifier")
            .field("benign", &"<closure>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum QueryError {
        NotFound,
        ConnectionReset,
    }

    #[test]
    fn test_default_classifier_accepts_only_ok() {
        let classifier = DefaultClassifier;

        assert!(Classifier::<QueryError>::is_success(&classifier, None));
        assert!(!classifier.is_success(Some(&QueryError::NotFound)));
        assert!(!classifier.is_success(Some(&QueryError::ConnectionReset)));
    }

    #[test]
    fn test_predicate_classifier_tolerates_benign_errors() {
        let classifier =
            PredicateClassifier::new(|e: &QueryError| matches!(e, QueryError::NotFound));

        assert!(classifier.is_success(None::<&QueryError>));
        assert!(classifier.is_success(Some(&QueryError::NotFound)));
        assert!(!classifier.is_success(Some(&QueryError::ConnectionReset)));
    }

    #[test]
    fn test_closure_classifier() {
        let status_classifier = |status: Option<&u16>| status.is_none_or(|s| *s < 500);

        assert!(status_classifier.is_success(None::<&u16>));
        assert!(status_classifier.is_success(Some(&404)));
        assert!(!status_classifier.is_success(Some(&503)));
    }

    #[test]
    fn test_predicate_classifier_debug() {
        let classifier = PredicateClassifier::new(|_: &QueryError| true);
        assert_eq!(
            format!("{classifier:?}"),
            "PredicateClassifier { benign: \"<closure>\" }"
        );
    }
}
