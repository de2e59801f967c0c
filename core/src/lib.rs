//! # Statecell Core
//!
//! Core types for the statecell state container.
//!
//! A store holds one state value that only changes when an action is
//! dispatched through a pure reducer. This crate defines the pieces that do
//! not need a store: actions, reducers, reducer combination, the reserved
//! lifecycle action types, and function composition. The store itself, the
//! middleware chain, and action-creator binding live in `statecell-runtime`.
//!
//! ## Core Concepts
//!
//! - **Action**: A record with a `"type"` discriminant and arbitrary extra fields
//! - **Reducer**: Pure function `(Option<State>, Action) → State`
//! - **Combined reducer**: One reducer per key of a record state
//! - **Reserved action types**: `INIT`, `REPLACE`, `PROBE_UNKNOWN_ACTION`
//!
//! ## Example
//!
//! ```
//! use statecell_core::{Action, Reduced, Reducer, reducer};
//!
//! let todos = reducer::from_fn(|state: Option<&Vec<String>>, action: &Action| {
//!     let mut todos = state.cloned().unwrap_or_default();
//!     if action.action_type() == "todos/add" {
//!         if let Some(text) = action.get("text").and_then(|t| t.as_str()) {
//!             todos.push(text.to_string());
//!         }
//!     }
//!     todos
//! });
//!
//! let add = Action::new("todos/add").with("text", "write docs");
//! let next = todos.reduce(None, &add).unwrap();
//! assert_eq!(next, Reduced::Next(vec!["write docs".to_string()]));
//! ```

pub mod action;
pub mod action_types;
pub mod combine;
pub mod compose;
pub mod error;
pub mod reducer;

// Re-export commonly used types
pub use action::{Action, ActionError, ValueKind, is_plain_object};
pub use action_types::ActionTypes;
pub use combine::{
    CombinedReducer, CombinedState, SliceReducer, combine_reducers, combine_reducers_with, slice,
};
pub use compose::{Composable, compose, identity};
pub use error::ReducerError;
pub use reducer::{FnReducer, Reduced, Reducer, TryFnReducer, from_fn, try_from_fn};
