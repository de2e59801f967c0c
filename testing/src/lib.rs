//! # Statecell Testing
//!
//! Testing utilities and helpers for statecell.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Recording doubles for listeners and dispatch functions
//! - proptest strategies for actions
//! - A tracing subscriber setup for tests
//!
//! ## Example
//!
//! ```
//! use statecell_core::{Action, reducer};
//! use statecell_runtime::Store;
//! use statecell_testing::CallLog;
//!
//! let store: Store<i64> = Store::create(
//!     reducer::from_fn(|state: Option<&i64>, _action: &Action| state.copied().unwrap_or(0) + 1),
//!     None,
//! )
//! .unwrap();
//!
//! let log = CallLog::new();
//! let _first = store.subscribe(log.recorder("first")).unwrap();
//! let _second = store.subscribe(log.recorder("second")).unwrap();
//!
//! store.dispatch(Action::new("tick")).unwrap();
//! assert_eq!(log.entries(), vec!["first", "second"]);
//! ```

pub mod reducer_test;

/// Recording test doubles.
pub mod mocks {
    use statecell_core::Action;
    use statecell_runtime::Dispatch;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Shared, ordered log of calls
    ///
    /// Clones share the same log, so one clone can be moved into callbacks
    /// while the test keeps another for assertions.
    #[derive(Debug, Clone, Default)]
    pub struct CallLog {
        entries: Arc<Mutex<Vec<String>>>,
    }

    impl CallLog {
        /// Create an empty log
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Append an entry
        pub fn record(&self, entry: impl Into<String>) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(entry.into());
        }

        /// A listener that appends `tag` every time it is called
        #[must_use]
        pub fn recorder(&self, tag: impl Into<String>) -> impl Fn() + Send + Sync + 'static {
            let log = self.clone();
            let tag = tag.into();
            move || log.record(tag.clone())
        }

        /// Everything recorded so far, in order
        #[must_use]
        pub fn entries(&self) -> Vec<String> {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Number of entries
        #[must_use]
        pub fn len(&self) -> usize {
            self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
        }

        /// Whether nothing has been recorded
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Forget all entries
        pub fn clear(&self) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }

    /// Listener that counts its calls
    #[derive(Debug, Clone, Default)]
    pub struct RecordingListener {
        calls: Arc<AtomicUsize>,
    }

    impl RecordingListener {
        /// Create a listener with zero calls
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// The callback to hand to `Store::subscribe`
        #[must_use]
        pub fn listener(&self) -> impl Fn() + Send + Sync + 'static {
            let calls = Arc::clone(&self.calls);
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
            }
        }

        /// How many times the callback has run
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    /// A dispatch that records every action it receives and returns it.
    #[must_use]
    pub fn recording_dispatch() -> (Dispatch, Arc<Mutex<Vec<Action>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let dispatch: Dispatch = Arc::new(move |action: Action| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(action.clone());
            Ok(action)
        });
        (dispatch, seen)
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use serde_json::Value;
    use statecell_core::Action;

    /// Non-empty, application-style action types such as `"todos/add"`.
    ///
    /// Never starts with `@@`, so it cannot collide with reserved types.
    pub fn arb_action_type() -> impl Strategy<Value = String> {
        "[a-z]{1,8}(/[a-z]{1,8})?"
    }

    /// Scalar JSON payload values.
    pub fn arb_payload_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,16}".prop_map(Value::from),
        ]
    }

    /// Actions with up to three payload fields.
    pub fn arb_action() -> impl Strategy<Value = Action> {
        (
            arb_action_type(),
            prop::collection::btree_map("[a-z]{1,6}", arb_payload_value(), 0..3),
        )
            .prop_map(|(action_type, payload)| {
                payload
                    .into_iter()
                    .fold(Action::new(action_type), |action, (key, value)| action.with(key, value))
            })
    }

    /// Sequences of actions for fold properties.
    pub fn arb_actions(max_len: usize) -> impl Strategy<Value = Vec<Action>> {
        prop::collection::vec(arb_action(), 0..=max_len)
    }
}

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Honors `RUST_LOG`; defaults to `debug` for statecell crates. Safe to call
/// from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "statecell_core=debug,statecell_runtime=debug".into());

    // Another test may already have installed a subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{CallLog, RecordingListener, recording_dispatch};
pub use reducer_test::ReducerTest;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_call_log_shares_entries_between_clones() {
        let log = CallLog::new();
        let clone = log.clone();

        (log.recorder("a"))();
        clone.record("b");

        assert_eq!(log.entries(), vec!["a", "b"]);
        log.clear();
        assert!(clone.is_empty());
    }

    #[test]
    fn test_recording_listener_counts() {
        let recording = RecordingListener::new();
        let listener = recording.listener();
        listener();
        listener();
        assert_eq!(recording.calls(), 2);
    }

    #[test]
    fn test_init_test_tracing_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }

    proptest! {
        #[test]
        fn prop_generated_actions_are_well_formed(action in properties::arb_action()) {
            prop_assert!(action.is_well_formed());
            prop_assert!(!action.action_type().starts_with("@@"));
        }
    }
}
