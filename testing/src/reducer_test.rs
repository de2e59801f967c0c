//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use statecell_core::{Action, Reduced, Reducer, ReducerError};
use std::marker::PhantomData;

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for error assertion functions
type ErrorAssertion = Box<dyn FnOnce(&ReducerError)>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// Without [`given_state`](Self::given_state) the reducer is called with no
/// state, as it is on the store's `INIT` dispatch.
///
/// # Example
///
/// ```
/// use statecell_core::{Action, reducer};
/// use statecell_testing::ReducerTest;
///
/// let counter = reducer::from_fn(|state: Option<&i64>, action: &Action| {
///     let count = state.copied().unwrap_or(0);
///     if action.action_type() == "increment" { count + 1 } else { count }
/// });
///
/// ReducerTest::new(counter)
///     .given_state(0)
///     .when_action(Action::new("increment"))
///     .then_state(|count: &i64| assert_eq!(*count, 1))
///     .run();
/// ```
pub struct ReducerTest<R, S>
where
    R: Reducer<S>,
{
    reducer: R,
    initial_state: Option<S>,
    action: Option<Action>,
    expect_unchanged: bool,
    state_assertions: Vec<StateAssertion<S>>,
    error_assertions: Vec<ErrorAssertion>,
    _state: PhantomData<fn() -> S>,
}

impl<R, S> ReducerTest<R, S>
where
    R: Reducer<S>,
    S: std::fmt::Debug,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            initial_state: None,
            action: None,
            expect_unchanged: false,
            state_assertions: Vec::new(),
            error_assertions: Vec::new(),
            _state: PhantomData,
        }
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the action to test (When)
    #[must_use]
    pub fn when_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    ///
    /// When the reducer reports [`Reduced::Unchanged`], the assertion sees
    /// the given state.
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Expect the reducer to report [`Reduced::Unchanged`] (Then)
    #[must_use]
    pub fn then_unchanged(mut self) -> Self {
        self.expect_unchanged = true;
        self
    }

    /// Expect the reducer to fail, and assert on the error (Then)
    #[must_use]
    pub fn then_error<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&ReducerError) + 'static,
    {
        self.error_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if the action is not set, if the outcome does not match the
    /// expectation, or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let action = self.action.expect("Action must be set with when_action()");
        let result = self.reducer.reduce(self.initial_state.as_ref(), &action);

        if !self.error_assertions.is_empty() {
            let error = match result {
                Err(error) => error,
                Ok(reduced) => panic!("Expected reducer error, but got {reduced:?}"),
            };
            for assertion in self.error_assertions {
                assertion(&error);
            }
            return;
        }

        let reduced = match result {
            Ok(reduced) => reduced,
            Err(error) => panic!("Reducer failed: {error}"),
        };

        if self.expect_unchanged {
            assert!(
                reduced.is_unchanged(),
                "Expected Reduced::Unchanged, but got {reduced:?}"
            );
        }

        let state = match reduced {
            Reduced::Next(next) => next,
            Reduced::Unchanged => self
                .initial_state
                .expect("Reducer reported no change without a given state"),
        };

        for assertion in self.state_assertions {
            assertion(&state);
        }
    }
}

/// Helper assertions for reducer results
pub mod assertions {
    use statecell_core::Reduced;

    /// Assert that the reducer reported no change
    ///
    /// # Panics
    ///
    /// Panics if `reduced` carries a next state.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_unchanged<S: std::fmt::Debug>(reduced: &Reduced<S>) {
        assert!(
            reduced.is_unchanged(),
            "Expected no change, but found next state {reduced:?}"
        );
    }

    /// Assert that the reducer produced a next state, and return it
    ///
    /// # Panics
    ///
    /// Panics if `reduced` is [`Reduced::Unchanged`].
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_next<S>(reduced: &Reduced<S>) -> &S {
        match reduced {
            Reduced::Next(state) => state,
            Reduced::Unchanged => panic!("Expected a next state, but the reducer reported no change"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statecell_core::{CombinedState, combine_reducers, reducer, slice};
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq)]
    struct TestState {
        count: i32,
    }

    struct TestReducer;

    impl Reducer<TestState> for TestReducer {
        fn reduce(
            &self,
            state: Option<&TestState>,
            action: &Action,
        ) -> Result<Reduced<TestState>, ReducerError> {
            let count = state.map_or(0, |s| s.count);
            match action.action_type() {
                "increment" => Ok(Reduced::Next(TestState { count: count + 1 })),
                "decrement" => Ok(Reduced::Next(TestState { count: count - 1 })),
                "fail" => Err(ReducerError::Failed("requested".to_string())),
                _ if state.is_none() => Ok(Reduced::Next(TestState { count })),
                _ => Ok(Reduced::Unchanged),
            }
        }
    }

    #[test]
    fn test_reducer_test_increment() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 0 })
            .when_action(Action::new("increment"))
            .then_state(|state: &TestState| {
                assert_eq!(state.count, 1);
            })
            .run();
    }

    #[test]
    fn test_reducer_test_decrement() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 5 })
            .when_action(Action::new("decrement"))
            .then_state(|state: &TestState| {
                assert_eq!(state.count, 4);
            })
            .run();
    }

    #[test]
    fn test_reducer_test_without_state_initializes() {
        ReducerTest::new(TestReducer)
            .when_action(Action::new("anything"))
            .then_state(|state: &TestState| assert_eq!(state, &TestState { count: 0 }))
            .run();
    }

    #[test]
    fn test_reducer_test_unchanged_sees_given_state() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 7 })
            .when_action(Action::new("unknown"))
            .then_unchanged()
            .then_state(|state: &TestState| assert_eq!(state.count, 7))
            .run();
    }

    #[test]
    fn test_reducer_test_error() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 1 })
            .when_action(Action::new("fail"))
            .then_error(|error| {
                assert_eq!(error, &ReducerError::Failed("requested".to_string()));
            })
            .run();
    }

    #[test]
    fn test_reducer_test_with_combined_reducer() {
        let combined = combine_reducers([(
            "count".to_string(),
            slice(|state: Option<&Arc<i32>>, action: &Action| {
                let count = state.map_or(0, |c| **c);
                Some(Arc::new(if action.action_type() == "increment" { count + 1 } else { count }))
            }),
        )]);

        ReducerTest::new(combined)
            .when_action(Action::new("increment"))
            .then_state(|state: &CombinedState<i32>| {
                assert_eq!(state.get("count").map(|c| **c), Some(1));
            })
            .run();
    }

    #[test]
    fn test_assertions() {
        let counter = reducer::from_fn(|state: Option<&i32>, _action: &Action| state.copied().unwrap_or(3));
        let reduced = counter.reduce(None, &Action::new("x")).unwrap_or(Reduced::Unchanged);

        assert_eq!(assertions::assert_next(&reduced), &3);
        assertions::assert_unchanged::<i32>(&Reduced::Unchanged);
    }
}
