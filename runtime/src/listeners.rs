//! Copy-on-write listener registry.
//!
//! A notification pass iterates an immutable snapshot (`Arc<Vec<_>>`).
//! Subscribing or unsubscribing while a snapshot is alive clones the working
//! list first (`Arc::make_mut`), so a pass in progress always sees exactly
//! the listeners that were registered when it started.

use std::sync::Arc;

/// A zero-argument change callback
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Identifies one registration; the same closure may be registered twice.
pub(crate) type ListenerId = u64;

pub(crate) type Snapshot = Arc<Vec<(ListenerId, Listener)>>;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    working: Snapshot,
    next_id: ListenerId,
}

impl ListenerRegistry {
    /// Register a listener at the end of the notification order.
    pub(crate) fn add(&mut self, listener: Listener) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        Arc::make_mut(&mut self.working).push((id, listener));
        id
    }

    /// Remove a registration. Returns `false` if it was already gone.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let Some(index) = self.working.iter().position(|(existing, _)| *existing == id) else {
            return false;
        };
        Arc::make_mut(&mut self.working).remove(index);
        true
    }

    /// Freeze the current registrations for one notification pass.
    pub(crate) fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.working)
    }

    pub(crate) fn len(&self) -> usize {
        self.working.len()
    }
}
