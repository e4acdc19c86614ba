//! Hooks fired when a breaker's advisory state flips

use crate::breaker::State;
use std::sync::Arc;

/// Shared hook receiving the breaker name
pub type Hook = Arc<dyn Fn(&str) + Send + Sync>;

/// Observers of advisory state changes.
///
/// Each hook runs once per actual flip, on the thread whose admission
/// decision caused it, so hooks should be cheap.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub on_open: Option<Hook>,
    pub on_close: Option<Hook>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the hook registered for entering `state`
    pub fn notify(&self, state: State, breaker: &str) {
        let hook = match state {
            State::Open => &self.on_open,
            State::Closed => &self.on_close,
        };
        if let Some(hook) = hook {
            hook(breaker);
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_open", &self.on_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_notify_dispatches_by_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let open_seen = Arc::clone(&seen);
        let close_seen = Arc::clone(&seen);

        let callbacks = Callbacks {
            on_open: Some(Arc::new(move |name: &str| {
                open_seen.lock().unwrap().push(format!("open:{name}"))
            })),
            on_close: Some(Arc::new(move |name: &str| {
                close_seen.lock().unwrap().push(format!("close:{name}"))
            })),
        };

        callbacks.notify(State::Open, "sql");
        callbacks.notify(State::Closed, "sql");

        assert_eq!(*seen.lock().unwrap(), vec!["open:sql", "close:sql"]);
    }

    #[test]
    fn test_missing_hooks_are_skipped() {
        let callbacks = Callbacks::new();
        callbacks.notify(State::Open, "sql");

        assert_eq!(
            format!("{callbacks:?}"),
            "Callbacks { on_open: false, on_close: false }"
        );
    }
}
