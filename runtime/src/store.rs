//! The store: one state cell, one reducer, a set of listeners.

use crate::StoreConfig;
use crate::error::StoreError;
use crate::listeners::{ListenerId, ListenerRegistry};
use crate::metrics::StoreMetrics;
use crate::middleware::{StoreCreator, StoreEnhancer};
use statecell_core::{Action, ActionTypes, Reduced, Reducer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

pub use crate::listeners::Listener;

/// The dispatch signature shared by the store and every middleware layer
pub type DispatchFn = dyn Fn(Action) -> Result<Action, StoreError> + Send + Sync;

/// A shareable dispatch function
pub type Dispatch = Arc<DispatchFn>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight flag when the reducer call ends, including by panic.
struct DispatchingGuard<'a>(&'a AtomicBool);

impl Drop for DispatchingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Shared internals of a store.
///
/// Locks are never held while a listener runs. The state lock is held while
/// the reducer runs, which is safe because every entry point checks the
/// in-flight flag before locking.
struct StoreCore<S> {
    state: Mutex<Option<S>>,
    reducer: Mutex<Arc<dyn Reducer<S>>>,
    listeners: Mutex<ListenerRegistry>,
    dispatching: AtomicBool,
    action_types: Arc<ActionTypes>,
    name: String,
}

impl<S> StoreCore<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn is_dispatching(&self) -> bool {
        self.dispatching.load(Ordering::Acquire)
    }

    #[tracing::instrument(
        skip(self, action),
        fields(store = %self.name, action_type = %action.action_type()),
        name = "store_dispatch"
    )]
    fn dispatch(&self, action: Action) -> Result<Action, StoreError> {
        if self
            .dispatching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            StoreMetrics::record_rejection(&self.name);
            return Err(StoreError::DispatchWhileDispatching);
        }

        if self.action_types.is_reserved(action.action_type()) {
            tracing::debug!("Dispatching lifecycle action");
        }

        {
            let _guard = DispatchingGuard(&self.dispatching);
            self.apply(&action)?;
        }

        StoreMetrics::record_dispatch(&self.name);
        self.notify();

        Ok(action)
    }

    /// Run the reducer and store its result. Caller holds the in-flight flag.
    fn apply(&self, action: &Action) -> Result<(), StoreError> {
        let reducer = Arc::clone(&*lock(&self.reducer));
        let mut state = lock(&self.state);

        let span = tracing::trace_span!("reducer_execution");
        let _enter = span.enter();

        let start = Instant::now();
        let reduced = reducer.reduce(state.as_ref(), action);
        StoreMetrics::record_reducer(&self.name, start.elapsed());

        match reduced? {
            Reduced::Next(next) => *state = Some(next),
            Reduced::Unchanged if state.is_none() => return Err(StoreError::Uninitialized),
            Reduced::Unchanged => tracing::trace!("Reducer reported no change"),
        }

        Ok(())
    }

    fn notify(&self) {
        let snapshot = lock(&self.listeners).snapshot();
        tracing::trace!(listeners = snapshot.len(), "Notifying listeners");

        for (_, listener) in snapshot.iter() {
            listener();
        }

        StoreMetrics::record_notified(&self.name, snapshot.len());
    }
}

/// Lets an [`Unsubscribe`] handle reach its store without naming the state type.
trait Subscriptions: Send + Sync {
    fn unsubscribe(&self, id: ListenerId) -> Result<(), StoreError>;
}

impl<S> Subscriptions for StoreCore<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn unsubscribe(&self, id: ListenerId) -> Result<(), StoreError> {
        if self.is_dispatching() {
            return Err(StoreError::UnsubscribeWhileDispatching);
        }

        lock(&self.listeners).remove(id);
        Ok(())
    }
}

/// Handle returned by [`Store::subscribe`].
///
/// Dropping the handle does not unsubscribe.
pub struct Unsubscribe {
    id: ListenerId,
    subscribed: AtomicBool,
    store: Weak<dyn Subscriptions>,
}

impl Unsubscribe {
    /// Remove the listener. Calling this again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsubscribeWhileDispatching`] if called from a
    /// reducer; the listener stays registered in that case.
    pub fn unsubscribe(&self) -> Result<(), StoreError> {
        if !self.subscribed.load(Ordering::Acquire) {
            return Ok(());
        }

        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id)?;
        }

        self.subscribed.store(false, Ordering::Release);
        Ok(())
    }

    /// Whether the listener is still registered through this handle
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("id", &self.id)
            .field("subscribed", &self.is_subscribed())
            .finish_non_exhaustive()
    }
}

/// Redux-style store holding a single state value
///
/// The store follows a unidirectional flow:
/// - State only changes by dispatching an action through the reducer
/// - Every successful dispatch notifies all listeners, in subscription order
/// - A reducer may not read, dispatch to, or (un)subscribe from its own store
/// - Listeners may do all of these; the in-flight flag is already cleared
///   when they run, and a dispatch from a listener starts a nested pass
///
/// Cloning a store clones the handle; both clones share the same state.
/// A listener that needs its store should capture a [`WeakStore`] from
/// [`Store::downgrade`], otherwise the store keeps itself alive.
///
/// # Type Parameters
///
/// - `S`: State type
///
/// # Example
///
/// ```
/// use statecell_core::{Action, reducer};
/// use statecell_runtime::Store;
///
/// let store = Store::create(
///     reducer::from_fn(|state: Option<&Vec<String>>, action: &Action| {
///         let mut log = state.cloned().unwrap_or_default();
///         log.push(action.action_type().to_string());
///         log
///     }),
///     Some(Vec::new()),
/// )
/// .unwrap();
///
/// store.dispatch(Action::new("hello")).unwrap();
/// assert_eq!(store.get_state().unwrap().last().map(String::as_str), Some("hello"));
/// ```
pub struct Store<S> {
    core: Arc<StoreCore<S>>,
    dispatch: Dispatch,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            dispatch: Arc::clone(&self.dispatch),
        }
    }
}

impl<S> Store<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Create a store with default configuration.
    ///
    /// The store starts from `preloaded_state` (or uninitialized) and
    /// immediately dispatches the reserved `INIT` action so the reducer can
    /// establish its default state.
    ///
    /// # Errors
    ///
    /// Returns the error of the `INIT` dispatch, e.g. a combined reducer that
    /// failed validation.
    pub fn create<R>(reducer: R, preloaded_state: Option<S>) -> Result<Self, StoreError>
    where
        R: Reducer<S> + 'static,
    {
        Self::create_with_config(reducer, preloaded_state, StoreConfig::default())
    }

    /// Create a store with custom configuration.
    ///
    /// # Errors
    ///
    /// See [`Store::create`].
    pub fn create_with_config<R>(
        reducer: R,
        preloaded_state: Option<S>,
        config: StoreConfig,
    ) -> Result<Self, StoreError>
    where
        R: Reducer<S> + 'static,
    {
        Self::create_shared(Arc::new(reducer), preloaded_state, config)
    }

    fn create_shared(
        reducer: Arc<dyn Reducer<S>>,
        preloaded_state: Option<S>,
        config: StoreConfig,
    ) -> Result<Self, StoreError> {
        let core = Arc::new(StoreCore {
            state: Mutex::new(preloaded_state),
            reducer: Mutex::new(reducer),
            listeners: Mutex::new(ListenerRegistry::default()),
            dispatching: AtomicBool::new(false),
            action_types: config.action_types,
            name: config.name,
        });

        let native = Arc::clone(&core);
        let store = Self {
            core,
            dispatch: Arc::new(move |action: Action| native.dispatch(action)),
        };

        store.core.dispatch(store.core.action_types.init_action())?;
        tracing::debug!(store = %store.core.name, "Store initialized");

        Ok(store)
    }

    /// Read the current state.
    ///
    /// # Errors
    ///
    /// - [`StoreError::GetStateWhileDispatching`] if called from the reducer
    /// - [`StoreError::Uninitialized`] if the store never produced a state
    pub fn get_state(&self) -> Result<S, StoreError> {
        if self.core.is_dispatching() {
            return Err(StoreError::GetStateWhileDispatching);
        }

        lock(&self.core.state).clone().ok_or(StoreError::Uninitialized)
    }

    /// Dispatch an action, through the middleware chain if one is installed.
    ///
    /// Returns the dispatched action unchanged (middleware may substitute
    /// their own result).
    ///
    /// # Errors
    ///
    /// - [`StoreError::DispatchWhileDispatching`] if called from the reducer
    /// - [`StoreError::Reducer`] if the reducer failed; state is unchanged and
    ///   listeners are not notified
    pub fn dispatch(&self, action: Action) -> Result<Action, StoreError> {
        (self.dispatch)(action)
    }

    /// The active dispatch function, for handing to action creators and
    /// other code that should not hold the whole store.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatch {
        Arc::clone(&self.dispatch)
    }

    /// Register a change listener.
    ///
    /// Listeners run synchronously after every successful dispatch, in
    /// subscription order. A listener registered while a notification pass
    /// is running is first called on the next dispatch.
    ///
    /// Dropping the returned handle leaves the listener registered. A
    /// listener that captures a strong [`Store`] clone forms a cycle and
    /// must be removed with [`Unsubscribe::unsubscribe`]; capture
    /// [`Store::downgrade`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SubscribeWhileDispatching`] if called from the
    /// reducer.
    pub fn subscribe<F>(&self, listener: F) -> Result<Unsubscribe, StoreError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.core.is_dispatching() {
            return Err(StoreError::SubscribeWhileDispatching);
        }

        let id = lock(&self.core.listeners).add(Arc::new(listener));
        let host = Arc::clone(&self.core) as Arc<dyn Subscriptions>;

        Ok(Unsubscribe {
            id,
            subscribed: AtomicBool::new(true),
            store: Arc::downgrade(&host),
        })
    }

    /// Swap the active reducer and dispatch the reserved `REPLACE` action so
    /// the new reducer can fill in any state it expects.
    ///
    /// The `REPLACE` action goes straight to the store, bypassing middleware.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DispatchWhileDispatching`] if called from the reducer;
    ///   the reducer is not swapped
    /// - any error of the `REPLACE` dispatch
    pub fn replace_reducer<R>(&self, reducer: R) -> Result<&Self, StoreError>
    where
        R: Reducer<S> + 'static,
    {
        if self.core.is_dispatching() {
            return Err(StoreError::DispatchWhileDispatching);
        }

        *lock(&self.core.reducer) = Arc::new(reducer);
        self.core.dispatch(self.core.action_types.replace_action())?;
        Ok(self)
    }

    /// A handle that does not keep the store alive
    #[must_use]
    pub fn downgrade(&self) -> WeakStore<S> {
        WeakStore {
            core: Arc::downgrade(&self.core),
            dispatch: Arc::downgrade(&self.dispatch),
        }
    }

    /// The reserved action types this store dispatches
    #[must_use]
    pub fn action_types(&self) -> &ActionTypes {
        &self.core.action_types
    }

    /// Number of registered listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.core.listeners).len()
    }

    /// The store's configured name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Replace the dispatch used by [`Store::dispatch`]; everything else is
    /// shared with `self`.
    pub(crate) fn with_dispatch(self, dispatch: Dispatch) -> Self {
        Self {
            core: self.core,
            dispatch,
        }
    }
}

impl<S> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.core.name)
            .finish_non_exhaustive()
    }
}

/// Non-owning handle to a [`Store`], for listeners that read their own store.
pub struct WeakStore<S> {
    core: Weak<StoreCore<S>>,
    dispatch: Weak<DispatchFn>,
}

impl<S> WeakStore<S> {
    /// The store, if any strong handle is still alive
    #[must_use]
    pub fn upgrade(&self) -> Option<Store<S>> {
        Some(Store {
            core: self.core.upgrade()?,
            dispatch: self.dispatch.upgrade()?,
        })
    }
}

impl<S> Clone for WeakStore<S> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
            dispatch: Weak::clone(&self.dispatch),
        }
    }
}

impl<S> std::fmt::Debug for WeakStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakStore")
            .field("alive", &(self.core.strong_count() > 0))
            .finish_non_exhaustive()
    }
}

/// A [`StoreCreator`] that builds plain stores with the given configuration.
#[must_use]
pub fn store_creator<S>(config: StoreConfig) -> StoreCreator<S>
where
    S: Clone + Send + Sync + 'static,
{
    Box::new(move |reducer, preloaded_state| {
        Store::create_shared(reducer, preloaded_state, config.clone())
    })
}

/// Create a store with default configuration.
///
/// # Errors
///
/// See [`Store::create`].
pub fn create_store<S, R>(reducer: R, preloaded_state: Option<S>) -> Result<Store<S>, StoreError>
where
    S: Clone + Send + Sync + 'static,
    R: Reducer<S> + 'static,
{
    Store::create(reducer, preloaded_state)
}

/// Create a store through an enhancer such as
/// [`apply_middleware`](crate::middleware::apply_middleware).
///
/// # Errors
///
/// Whatever the enhanced creator returns; see [`Store::create`].
pub fn create_store_with<S, R>(
    reducer: R,
    preloaded_state: Option<S>,
    enhancer: StoreEnhancer<S>,
) -> Result<Store<S>, StoreError>
where
    S: Clone + Send + Sync + 'static,
    R: Reducer<S> + 'static,
{
    let create = enhancer(store_creator(StoreConfig::default()));
    create(Arc::new(reducer), preloaded_state)
}
