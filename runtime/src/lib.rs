//! # Statecell Runtime
//!
//! The store that owns a single state value and the helpers built around it.
//!
//! ## Core Components
//!
//! - **Store**: Holds the current state, the active reducer, and the listener set
//! - **Middleware**: Interceptors wrapped around the store's dispatch
//! - **Action binding**: Action creators that dispatch what they create
//!
//! ## Example
//!
//! ```
//! use statecell_core::{Action, reducer};
//! use statecell_runtime::Store;
//!
//! let counter = reducer::from_fn(|state: Option<&i64>, action: &Action| {
//!     let count = state.copied().unwrap_or(0);
//!     match action.action_type() {
//!         "increment" => count + 1,
//!         _ => count,
//!     }
//! });
//!
//! let store: Store<i64> = Store::create(counter, None).unwrap();
//! let _unsubscribe = store.subscribe(|| println!("state changed")).unwrap();
//!
//! store.dispatch(Action::new("increment")).unwrap();
//! assert_eq!(store.get_state().unwrap(), 1);
//! ```

use statecell_core::ActionTypes;
use std::sync::Arc;

/// Action-creator binding
pub mod bind;

/// Store metric names and descriptions
pub mod metrics;

/// Middleware chain construction
pub mod middleware;

mod listeners;
mod store;

pub use bind::{
    ActionCreator, ActionCreators, BoundActionCreator, BoundActionCreators, action_creator,
    bind_action_creator, bind_action_creators,
};
pub use error::StoreError;
pub use middleware::{Middleware, MiddlewareApi, StoreCreator, StoreEnhancer, apply_middleware};
pub use store::{Dispatch, DispatchFn, Listener, Store, Unsubscribe, WeakStore, create_store, create_store_with, store_creator};

/// Error types for the Store runtime
pub mod error {
    use statecell_core::ReducerError;
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// All of these are precondition violations reported at the call site.
    /// Nothing is retried.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// `get_state` was called while a reducer was running.
        ///
        /// The reducer already receives the state as an argument; reading it
        /// from the store would observe a half-applied transition.
        #[error(
            "You may not call get_state() while the reducer is executing. \
             The reducer has already received the state as an argument"
        )]
        GetStateWhileDispatching,

        /// `dispatch` was called while a reducer was running.
        #[error("Reducers may not dispatch actions")]
        DispatchWhileDispatching,

        /// `subscribe` was called while a reducer was running.
        #[error(
            "You may not call subscribe() while the reducer is executing. \
             Subscribe from a component or a listener instead"
        )]
        SubscribeWhileDispatching,

        /// An unsubscribe handle was used while a reducer was running.
        #[error("You may not unsubscribe from a store listener while the reducer is executing")]
        UnsubscribeWhileDispatching,

        /// A middleware dispatched while the chain was still being built.
        #[error(
            "Dispatching while constructing your middleware is not allowed. \
             Other middleware would not be applied to this dispatch"
        )]
        MiddlewareConstructing,

        /// The store behind a middleware dispatch forwarder is gone.
        #[error("The store this dispatch belongs to has been dropped")]
        StoreDropped,

        /// The reducer left the store without any state.
        #[error("The reducer reported no change before the store had an initial state")]
        Uninitialized,

        /// The reducer failed; the previous state is kept.
        #[error(transparent)]
        Reducer(#[from] ReducerError),
    }
}

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use statecell_core::ActionTypes;
/// use statecell_runtime::StoreConfig;
/// use std::sync::Arc;
///
/// let config = StoreConfig::new("todos")
///     .with_action_types(Arc::new(ActionTypes::generate()));
/// assert_eq!(config.name, "todos");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Name attached to tracing spans and metric labels
    pub name: String,
    /// Reserved lifecycle action types used by the store
    pub action_types: Arc<ActionTypes>,
}

impl StoreConfig {
    /// Create a configuration with the given store name and the process-wide
    /// reserved action types
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action_types: ActionTypes::global(),
        }
    }

    /// Set the store name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Inject a specific set of reserved action types
    #[must_use]
    pub fn with_action_types(mut self, action_types: Arc<ActionTypes>) -> Self {
        self.action_types = action_types;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("store")
    }
}
