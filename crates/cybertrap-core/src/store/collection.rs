// ── Generic reactive entity collection ──
//
// Concurrent id index plus an ordered snapshot, with push-based change
// notification via `watch` channels. Collections are caches: the only
// write is a full replace with the latest fetch result.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{Entity, EntityId};

/// Where a collection is in its fetch lifecycle.
///
/// Views use this to tell "still loading" apart from "loaded, but empty".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The last refresh failed. The previous snapshot is kept.
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// A reactive collection for a single entity type.
///
/// `replace` swaps the whole content at once: the id index is rebuilt,
/// the version is bumped, and subscribers receive the new snapshot in
/// exactly the order it was given.
pub(crate) struct EntityCollection<T: Entity> {
    /// Id -> entity, for O(1) lookups.
    by_id: DashMap<EntityId, Arc<T>>,

    /// Version counter, bumped on every replace.
    version: watch::Sender<u64>,

    /// Ordered snapshot handed to subscribers.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,

    load_state: watch::Sender<LoadState>,
}

impl<T: Entity> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        let (load_state, _) = watch::channel(LoadState::Idle);

        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
            load_state,
        }
    }

    /// Replace the full content. Later duplicates of an id win in the
    /// index but every item stays in the snapshot, as the backend sent it.
    pub(crate) fn replace(&self, items: Vec<T>) {
        let items: Vec<Arc<T>> = items.into_iter().map(Arc::new).collect();

        self.by_id.clear();
        for item in &items {
            self.by_id.insert(item.id().clone(), Arc::clone(item));
        }

        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(items));
        self.version.send_modify(|v| *v += 1);
        self.set_load_state(LoadState::Loaded);
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn load_state(&self) -> LoadState {
        self.load_state.borrow().clone()
    }

    pub(crate) fn subscribe_load_state(&self) -> watch::Receiver<LoadState> {
        self.load_state.subscribe()
    }

    pub(crate) fn set_load_state(&self, state: LoadState) {
        self.load_state.send_replace(state);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }
}
