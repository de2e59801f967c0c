//! Error types for reducers.

use thiserror::Error;

/// Errors a reducer can report instead of a next state.
///
/// `Clone` so a combined reducer that failed validation can hand the same
/// error back on every call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReducerError {
    /// A slice reducer returned no state when initialized.
    #[error(
        "Slice reducer \"{key}\" returned an uninitialized state during initialization. \
         When the incoming state is uninitialized it must return its initial state; \
         the initial state may not be uninitialized"
    )]
    UndefinedInitialState {
        /// Key of the offending slice
        key: String,
    },

    /// A slice reducer returned no state for an action it does not know.
    #[error(
        "Slice reducer \"{key}\" returned an uninitialized state when probed with a random type. \
         Do not handle reserved action types; return the current state for any unknown action"
    )]
    UndefinedProbeState {
        /// Key of the offending slice
        key: String,
    },

    /// A slice reducer returned no state while handling a dispatched action.
    #[error(
        "Slice reducer \"{key}\" returned an uninitialized state for action \"{action_type}\". \
         To ignore an action, return the previous state"
    )]
    UndefinedSliceState {
        /// Key of the offending slice
        key: String,
        /// Type of the action being handled
        action_type: String,
    },

    /// Reducer-specific failure.
    #[error("Reducer failed: {0}")]
    Failed(String),
}
