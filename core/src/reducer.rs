//! The reducer trait and its adapters.
//!
//! A reducer is a pure function `(state, action) -> state`. The incoming
//! state is `None` exactly once per reducer: before it has produced its
//! initial state. A reducer must answer every action, known or not, with a
//! state.
//!
//! # Example
//!
//! ```
//! use statecell_core::action::Action;
//! use statecell_core::reducer::{self, Reduced, Reducer};
//!
//! let counter = reducer::from_fn(|state: Option<&i64>, action: &Action| {
//!     let count = state.copied().unwrap_or(0);
//!     match action.action_type() {
//!         "increment" => count + 1,
//!         _ => count,
//!     }
//! });
//!
//! let next = counter.reduce(Some(&1), &Action::new("increment")).unwrap();
//! assert_eq!(next, Reduced::Next(2));
//! ```

use crate::action::Action;
use crate::error::ReducerError;
use std::sync::Arc;

/// Result of running a reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reduced<S> {
    /// The next state
    Next(S),

    /// Nothing changed; keep the current state.
    ///
    /// Distinct from returning an equal value: callers can skip work without
    /// comparing states.
    Unchanged,
}

impl<S> Reduced<S> {
    /// Whether this is [`Reduced::Unchanged`]
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// The next state, if there is one
    #[must_use]
    pub fn into_next(self) -> Option<S> {
        match self {
            Self::Next(state) => Some(state),
            Self::Unchanged => None,
        }
    }
}

/// The Reducer trait - the only way state changes
///
/// # Type Parameters
///
/// - `S`: The state this reducer produces
pub trait Reducer<S>: Send + Sync {
    /// Compute the next state.
    ///
    /// # Arguments
    ///
    /// - `state`: The current state, `None` if not yet initialized
    /// - `action`: The action being dispatched
    ///
    /// # Errors
    ///
    /// Returns a [`ReducerError`] when the reducer cannot produce a state;
    /// the store keeps its previous state in that case.
    fn reduce(&self, state: Option<&S>, action: &Action) -> Result<Reduced<S>, ReducerError>;
}

impl<S, R> Reducer<S> for Arc<R>
where
    R: Reducer<S> + ?Sized,
{
    fn reduce(&self, state: Option<&S>, action: &Action) -> Result<Reduced<S>, ReducerError> {
        (**self).reduce(state, action)
    }
}

impl<S, R> Reducer<S> for Box<R>
where
    R: Reducer<S> + ?Sized,
{
    fn reduce(&self, state: Option<&S>, action: &Action) -> Result<Reduced<S>, ReducerError> {
        (**self).reduce(state, action)
    }
}

/// Adapt an infallible closure into a [`Reducer`].
pub const fn from_fn<S, F>(f: F) -> FnReducer<F>
where
    F: Fn(Option<&S>, &Action) -> S + Send + Sync,
{
    FnReducer { f }
}

/// Adapt a fallible closure into a [`Reducer`].
pub const fn try_from_fn<S, F>(f: F) -> TryFnReducer<F>
where
    F: Fn(Option<&S>, &Action) -> Result<S, ReducerError> + Send + Sync,
{
    TryFnReducer { f }
}

/// A reducer backed by a closure.
///
/// Created by [`from_fn`].
pub struct FnReducer<F> {
    f: F,
}

impl<S, F> Reducer<S> for FnReducer<F>
where
    F: Fn(Option<&S>, &Action) -> S + Send + Sync,
{
    fn reduce(&self, state: Option<&S>, action: &Action) -> Result<Reduced<S>, ReducerError> {
        Ok(Reduced::Next((self.f)(state, action)))
    }
}

/// A reducer backed by a fallible closure.
///
/// Created by [`try_from_fn`].
pub struct TryFnReducer<F> {
    f: F,
}

impl<S, F> Reducer<S> for TryFnReducer<F>
where
    F: Fn(Option<&S>, &Action) -> Result<S, ReducerError> + Send + Sync,
{
    fn reduce(&self, state: Option<&S>, action: &Action) -> Result<Reduced<S>, ReducerError> {
        (self.f)(state, action).map(Reduced::Next)
    }
}
