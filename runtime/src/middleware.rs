//! Middleware chain construction.
//!
//! Middleware sits between `dispatch` and the reducer:
//!
//! ```text
//! dispatch → M1 → M2 → ... → Mn → store dispatch → reducer → listeners
//! ```
//!
//! A middleware is a factory: given a [`MiddlewareApi`] it returns a layer
//! that wraps the next dispatch in the chain. Each layer may inspect or
//! rewrite the action, dispatch other actions through the whole chain,
//! swallow the action, or substitute its own result.
//!
//! # Example
//!
//! ```
//! use statecell_core::{Action, reducer};
//! use statecell_runtime::middleware::{self, MiddlewareApi};
//! use statecell_runtime::{Dispatch, Store, apply_middleware, create_store_with};
//!
//! let counter = reducer::from_fn(|state: Option<&i64>, action: &Action| {
//!     let count = state.copied().unwrap_or(0);
//!     if action.action_type() == "increment" { count + 1 } else { count }
//! });
//!
//! // Turn every "double" into two increments.
//! let doubler = middleware::from_fn(|api: &MiddlewareApi<i64>, next: &Dispatch, action: Action| {
//!     if action.action_type() == "double" {
//!         api.dispatch(Action::new("increment"))?;
//!         return next(Action::new("increment"));
//!     }
//!     next(action)
//! });
//!
//! let store: Store<i64> = create_store_with(
//!     counter,
//!     None,
//!     apply_middleware(vec![middleware::logging(), doubler]),
//! )
//! .unwrap();
//!
//! store.dispatch(Action::new("double")).unwrap();
//! assert_eq!(store.get_state().unwrap(), 2);
//! ```

use crate::error::StoreError;
use crate::store::{Dispatch, DispatchFn, Store};
use statecell_core::{Action, Composable, Reducer, compose};
use std::sync::{Arc, OnceLock, Weak};

/// Builds a store from a reducer and an optional preloaded state
pub type StoreCreator<S> = Box<
    dyn Fn(Arc<dyn Reducer<S>>, Option<S>) -> Result<Store<S>, StoreError> + Send + Sync,
>;

/// Wraps a [`StoreCreator`] to produce stores with extra behavior
pub type StoreEnhancer<S> = Box<dyn FnOnce(StoreCreator<S>) -> StoreCreator<S>>;

/// Wraps the next dispatch in the chain
pub type DispatchLayer = Composable<'static, Dispatch>;

/// Middleware factory: called once per store with the store's API
pub type Middleware<S> = Arc<dyn Fn(&MiddlewareApi<S>) -> DispatchLayer + Send + Sync>;

/// What a middleware can reach of the store it is applied to
pub struct MiddlewareApi<S> {
    store: Store<S>,
    dispatch: Dispatch,
}

impl<S> Clone for MiddlewareApi<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            dispatch: Arc::clone(&self.dispatch),
        }
    }
}

impl<S> MiddlewareApi<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Read the store's current state.
    ///
    /// # Errors
    ///
    /// See [`Store::get_state`].
    pub fn get_state(&self) -> Result<S, StoreError> {
        self.store.get_state()
    }

    /// Dispatch through the full middleware chain.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MiddlewareConstructing`] when called while the
    /// chain is still being built, otherwise whatever the chain returns.
    pub fn dispatch(&self, action: Action) -> Result<Action, StoreError> {
        (self.dispatch)(action)
    }

    /// The forwarding dispatch itself, for moving into other closures
    #[must_use]
    pub fn dispatcher(&self) -> Dispatch {
        Arc::clone(&self.dispatch)
    }
}

/// Build a [`StoreEnhancer`] that wraps the store's dispatch in `middlewares`.
///
/// The first middleware is the outermost layer. Every middleware's
/// [`MiddlewareApi::dispatch`] forwards to the fully composed dispatch, once
/// it exists.
#[must_use]
pub fn apply_middleware<S>(middlewares: Vec<Middleware<S>>) -> StoreEnhancer<S>
where
    S: Clone + Send + Sync + 'static,
{
    Box::new(move |create: StoreCreator<S>| -> StoreCreator<S> {
        Box::new(move |reducer: Arc<dyn Reducer<S>>, preloaded_state: Option<S>| {
            let store = create(reducer, preloaded_state)?;

            let composed: Arc<OnceLock<Weak<DispatchFn>>> = Arc::new(OnceLock::new());
            let forward: Dispatch = {
                let composed = Arc::clone(&composed);
                Arc::new(move |action: Action| {
                    let Some(target) = composed.get() else {
                        return Err(StoreError::MiddlewareConstructing);
                    };
                    let dispatch = target.upgrade().ok_or(StoreError::StoreDropped)?;
                    dispatch(action)
                })
            };

            let api = MiddlewareApi {
                store: store.clone(),
                dispatch: forward,
            };

            let layers: Vec<DispatchLayer> = middlewares
                .iter()
                .map(|middleware| middleware(&api))
                .collect();
            let dispatch = compose(layers)(store.dispatcher());

            if composed.set(Arc::downgrade(&dispatch)).is_err() {
                tracing::warn!("Middleware dispatch was already bound");
            }
            tracing::debug!(
                store = %store.name(),
                middlewares = middlewares.len(),
                "Middleware applied"
            );

            Ok(store.with_dispatch(dispatch))
        })
    })
}

/// Build a middleware from a closure.
///
/// The closure receives the store API, the next dispatch in the chain, and
/// the action. Calling `next` passes the action on; not calling it swallows
/// the action.
#[must_use]
pub fn from_fn<S, F>(f: F) -> Middleware<S>
where
    S: Clone + Send + Sync + 'static,
    F: Fn(&MiddlewareApi<S>, &Dispatch, Action) -> Result<Action, StoreError> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |api: &MiddlewareApi<S>| -> DispatchLayer {
        let f = Arc::clone(&f);
        let api = api.clone();
        Box::new(move |next: Dispatch| -> Dispatch {
            let f = Arc::clone(&f);
            let api = api.clone();
            Arc::new(move |action: Action| f(&api, &next, action))
        })
    })
}

/// Middleware that records every action passing through with `tracing`.
#[must_use]
pub fn logging<S>() -> Middleware<S>
where
    S: Clone + Send + Sync + 'static,
{
    from_fn(|_api: &MiddlewareApi<S>, next: &Dispatch, action: Action| {
        let action_type = action.action_type().to_string();
        tracing::debug!(action_type = %action_type, "Action dispatched");

        let result = next(action);
        if let Err(error) = &result {
            tracing::warn!(action_type = %action_type, error = %error, "Dispatch failed");
        }
        result
    })
}
