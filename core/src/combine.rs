//! Reducer combination over a keyed record state.
//!
//! [`combine_reducers`] turns a set of per-key slice reducers into one
//! reducer over a [`CombinedState`], where each key holds the slice produced
//! by its reducer. Slices are stored behind `Arc` so "did this slice change"
//! is a pointer comparison: a slice reducer that ignores an action returns the
//! `Arc` it was given.
//!
//! # Validation
//!
//! Every slice reducer is run twice when the combination is built: once with
//! the reserved `INIT` action and once with the `PROBE_UNKNOWN_ACTION` action,
//! both times with no incoming state. A reducer that answers either with
//! `None` has no default state (or special-cases unknown actions), and the
//! combined reducer fails every call with the recorded [`ReducerError`].
//!
//! # Example
//!
//! ```
//! use statecell_core::action::Action;
//! use statecell_core::combine::{combine_reducers, slice};
//! use statecell_core::reducer::{Reduced, Reducer};
//! use std::sync::Arc;
//!
//! let combined = combine_reducers([
//!     ("count", slice(|state: Option<&Arc<i64>>, action: &Action| {
//!         let current = state.cloned().unwrap_or_else(|| Arc::new(0));
//!         if action.action_type() == "increment" {
//!             Some(Arc::new(*current + 1))
//!         } else {
//!             Some(current)
//!         }
//!     })),
//! ]);
//!
//! let Reduced::Next(state) = combined.reduce(None, &Action::new("increment")).unwrap() else {
//!     panic!("first reduction always produces a state");
//! };
//! assert_eq!(*state["count"], 1);
//! ```

use crate::action::Action;
use crate::action_types::ActionTypes;
use crate::error::ReducerError;
use crate::reducer::{Reduced, Reducer};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

/// State produced by a [`CombinedReducer`]: one shared slice per key
pub type CombinedState<V> = BTreeMap<String, Arc<V>>;

/// A reducer for one key of a [`CombinedState`].
///
/// Returning `None` means "uninitialized", which is always an error.
pub type SliceReducer<V> = Arc<dyn Fn(Option<&Arc<V>>, &Action) -> Option<Arc<V>> + Send + Sync>;

/// Wrap a closure as a [`SliceReducer`].
pub fn slice<V, F>(f: F) -> SliceReducer<V>
where
    F: Fn(Option<&Arc<V>>, &Action) -> Option<Arc<V>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Combine slice reducers using the process-wide [`ActionTypes`].
///
/// See [`combine_reducers_with`].
#[must_use]
pub fn combine_reducers<V, K, I>(reducers: I) -> CombinedReducer<V>
where
    I: IntoIterator<Item = (K, SliceReducer<V>)>,
    K: Into<String>,
{
    combine_reducers_with(ActionTypes::global(), reducers)
}

/// Combine slice reducers into one reducer over a [`CombinedState`].
///
/// When a key appears more than once the last reducer wins, keeping the
/// position of the first occurrence.
#[must_use]
pub fn combine_reducers_with<V, K, I>(action_types: Arc<ActionTypes>, reducers: I) -> CombinedReducer<V>
where
    I: IntoIterator<Item = (K, SliceReducer<V>)>,
    K: Into<String>,
{
    let mut final_reducers: Vec<(String, SliceReducer<V>)> = Vec::new();
    for (key, reducer) in reducers {
        let key = key.into();
        match final_reducers.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = reducer,
            None => final_reducers.push((key, reducer)),
        }
    }

    let shape_error = assert_reducer_shape(&final_reducers, &action_types).err();
    if let Some(error) = &shape_error {
        tracing::debug!(%error, "Combined reducer failed shape validation");
    }

    CombinedReducer {
        reducers: final_reducers,
        action_types,
        shape_error,
        unexpected_key_cache: Mutex::new(HashSet::new()),
    }
}

fn assert_reducer_shape<V>(
    reducers: &[(String, SliceReducer<V>)],
    action_types: &ActionTypes,
) -> Result<(), ReducerError> {
    let init = action_types.init_action();
    let probe = action_types.probe_action();

    for (key, reducer) in reducers {
        if reducer(None, &init).is_none() {
            return Err(ReducerError::UndefinedInitialState { key: key.clone() });
        }

        if reducer(None, &probe).is_none() {
            return Err(ReducerError::UndefinedProbeState { key: key.clone() });
        }
    }

    Ok(())
}

/// A reducer built from per-key slice reducers.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<V> {
    reducers: Vec<(String, SliceReducer<V>)>,
    action_types: Arc<ActionTypes>,
    shape_error: Option<ReducerError>,
    unexpected_key_cache: Mutex<HashSet<String>>,
}

impl<V> CombinedReducer<V> {
    /// Keys handled by this reducer, in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.reducers.iter().map(|(key, _)| key.as_str())
    }

    /// The validation error recorded at construction, if any
    #[must_use]
    pub const fn shape_error(&self) -> Option<&ReducerError> {
        self.shape_error.as_ref()
    }

    fn has_reducer(&self, key: &str) -> bool {
        self.reducers.iter().any(|(existing, _)| existing == key)
    }

    /// Log (never fail) when the incoming state or action does not look like
    /// what this combination expects.
    fn warn_on_unexpected_shape(&self, state: &CombinedState<V>, action: &Action) {
        if self.reducers.is_empty() {
            tracing::warn!(
                "Store does not have a valid reducer. Make sure the argument passed to \
                 combine_reducers contains at least one slice reducer"
            );
            return;
        }

        if !action.is_well_formed() {
            tracing::warn!(
                payload = ?action.payload(),
                "Received an action with an empty \"type\"; actions must carry a discriminant"
            );
            return;
        }

        // The old reducer's shape no longer applies after a replacement.
        if action.action_type() == self.action_types.replace() {
            return;
        }

        let mut cache = self
            .unexpected_key_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut unexpected_keys = Vec::new();
        for key in state.keys() {
            if !self.has_reducer(key) && cache.insert(key.clone()) {
                unexpected_keys.push(key.as_str());
            }
        }

        if !unexpected_keys.is_empty() {
            let expected: Vec<&str> = self.keys().collect();
            tracing::warn!(
                unexpected = ?unexpected_keys,
                expected = ?expected,
                "Unexpected keys found in the previous state received by the reducer; they will be ignored"
            );
        }
    }
}

impl<V> Reducer<CombinedState<V>> for CombinedReducer<V>
where
    V: Send + Sync,
{
    fn reduce(
        &self,
        state: Option<&CombinedState<V>>,
        action: &Action,
    ) -> Result<Reduced<CombinedState<V>>, ReducerError> {
        if let Some(error) = &self.shape_error {
            return Err(error.clone());
        }

        let empty = CombinedState::new();
        let current = state.unwrap_or(&empty);

        self.warn_on_unexpected_shape(current, action);

        let mut has_changed = state.is_none();
        let mut next_state = CombinedState::new();

        for (key, reducer) in &self.reducers {
            let previous = current.get(key);
            let Some(next) = reducer(previous, action) else {
                return Err(ReducerError::UndefinedSliceState {
                    key: key.clone(),
                    action_type: action.action_type().to_string(),
                });
            };

            has_changed = has_changed || previous.is_none_or(|previous| !Arc::ptr_eq(previous, &next));
            next_state.insert(key.clone(), next);
        }

        // Reducers were added or removed since the state was built.
        has_changed = has_changed || self.reducers.len() != current.len();

        Ok(if has_changed {
            Reduced::Next(next_state)
        } else {
            Reduced::Unchanged
        })
    }
}

impl<V> std::fmt::Debug for CombinedReducer<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("shape_error", &self.shape_error)
            .finish_non_exhaustive()
    }
}
