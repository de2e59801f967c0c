//! Action-creator binding.
//!
//! An action creator turns an argument into an [`Action`]. Binding it to a
//! dispatch yields a function that creates and dispatches in one call, so
//! code that only needs to trigger actions never sees the store.
//!
//! # Example
//!
//! ```
//! use statecell_core::Action;
//! use statecell_runtime::{ActionCreators, Dispatch, action_creator, bind_action_creators};
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! let dispatch: Dispatch = Arc::new(|action: Action| Ok(action));
//!
//! let mut creators = BTreeMap::new();
//! creators.insert(
//!     "add".to_string(),
//!     action_creator(|text: String| Action::new("todos/add").with("text", text)),
//! );
//!
//! let bound = bind_action_creators(ActionCreators::Map(creators), dispatch);
//! let add = bound.get("add").unwrap();
//! let dispatched = add.call("write docs".to_string()).unwrap();
//! assert_eq!(dispatched.action_type(), "todos/add");
//! ```

use crate::error::StoreError;
use crate::store::Dispatch;
use statecell_core::Action;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Produces an action from an argument
pub type ActionCreator<P> = Arc<dyn Fn(P) -> Action + Send + Sync>;

/// Wrap a closure as an [`ActionCreator`].
pub fn action_creator<P, F>(f: F) -> ActionCreator<P>
where
    F: Fn(P) -> Action + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One creator, or a named set of creators
pub enum ActionCreators<P> {
    /// A single creator
    Single(ActionCreator<P>),
    /// Creators keyed by name
    Map(BTreeMap<String, ActionCreator<P>>),
}

/// An action creator bound to a dispatch
pub struct BoundActionCreator<P> {
    creator: ActionCreator<P>,
    dispatch: Dispatch,
}

impl<P> Clone for BoundActionCreator<P> {
    fn clone(&self) -> Self {
        Self {
            creator: Arc::clone(&self.creator),
            dispatch: Arc::clone(&self.dispatch),
        }
    }
}

impl<P> BoundActionCreator<P> {
    /// Create the action from `args` and dispatch it.
    ///
    /// # Errors
    ///
    /// Whatever the bound dispatch returns.
    pub fn call(&self, args: P) -> Result<Action, StoreError> {
        (self.dispatch)((self.creator)(args))
    }
}

impl<P> std::fmt::Debug for BoundActionCreator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundActionCreator").finish_non_exhaustive()
    }
}

/// Result of [`bind_action_creators`], mirroring the input shape
pub enum BoundActionCreators<P> {
    /// A single bound creator
    Single(BoundActionCreator<P>),
    /// Bound creators under their original names
    Map(BTreeMap<String, BoundActionCreator<P>>),
}

impl<P> BoundActionCreators<P> {
    /// The bound creator, when a single creator was bound
    #[must_use]
    pub const fn as_single(&self) -> Option<&BoundActionCreator<P>> {
        match self {
            Self::Single(bound) => Some(bound),
            Self::Map(_) => None,
        }
    }

    /// Look up a bound creator by name; `None` for a single creator
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoundActionCreator<P>> {
        match self {
            Self::Single(_) => None,
            Self::Map(bound) => bound.get(name),
        }
    }

    /// Names of the bound creators, in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let names: Vec<&str> = match self {
            Self::Single(_) => Vec::new(),
            Self::Map(bound) => bound.keys().map(String::as_str).collect(),
        };
        names.into_iter()
    }
}

/// Bind one creator to `dispatch`.
#[must_use]
pub fn bind_action_creator<P>(creator: ActionCreator<P>, dispatch: Dispatch) -> BoundActionCreator<P> {
    BoundActionCreator { creator, dispatch }
}

/// Bind a creator or a named set of creators to `dispatch`.
#[must_use]
pub fn bind_action_creators<P>(creators: ActionCreators<P>, dispatch: Dispatch) -> BoundActionCreators<P> {
    match creators {
        ActionCreators::Single(creator) => {
            BoundActionCreators::Single(bind_action_creator(creator, dispatch))
        }
        ActionCreators::Map(creators) => BoundActionCreators::Map(
            creators
                .into_iter()
                .map(|(name, creator)| (name, bind_action_creator(creator, Arc::clone(&dispatch))))
                .collect(),
        ),
    }
}
