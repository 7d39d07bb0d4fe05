//! Selection of property identifiers for bulk actions

pub mod storage;

use std::collections::BTreeSet;
use tokio::sync::broadcast;
use tracing::debug;

pub use storage::{FileStorage, MemoryStorage, SelectionStorage};

pub const SELECTION_STORAGE_KEY: &str = "property_admin_selection";

const EVENT_CAPACITY: usize = 16;

/// Published to every subscriber after the selection changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    Changed(Vec<i64>),
    Cleared,
}

/// The authoritative set of selected identifiers.
///
/// Every mutation is mirrored to storage before returning, and announced on
/// a broadcast channel so other views can converge on the same state.
pub struct SelectionTracker {
    selected: BTreeSet<i64>,
    storage: Box<dyn SelectionStorage>,
    key: String,
    events: broadcast::Sender<SelectionEvent>,
}

impl SelectionTracker {
    /// Create a tracker seeded from storage under the default key
    pub fn new(storage: impl SelectionStorage + 'static) -> Self {
        Self::with_key(storage, SELECTION_STORAGE_KEY)
    }

    pub fn with_key(storage: impl SelectionStorage + 'static, key: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let selected = read_ids(&storage, key).unwrap_or_default();
        Self {
            selected,
            storage: Box::new(storage),
            key: key.to_string(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SelectionEvent> {
        self.events.subscribe()
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    /// Selected identifiers in ascending order
    pub fn ids(&self) -> Vec<i64> {
        self.selected.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn select(&mut self, id: i64) {
        if self.selected.insert(id) {
            self.commit();
        }
    }

    pub fn deselect(&mut self, id: i64) {
        if self.selected.remove(&id) {
            self.commit();
        }
    }

    /// Flip one identifier; returns whether it is now selected
    pub fn toggle(&mut self, id: i64) -> bool {
        let now_selected = if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        };
        self.commit();
        now_selected
    }

    /// Replace the selection with exactly these identifiers
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = i64>) {
        self.selected = ids.into_iter().collect();
        self.commit();
    }

    /// Empty the selection and drop the storage entry entirely
    pub fn clear(&mut self) {
        self.selected.clear();
        self.storage.remove(&self.key);
        let _ = self.events.send(SelectionEvent::Cleared);
    }

    /// Drop identifiers that are not on the newly loaded page. Returns the
    /// identifiers that were removed.
    pub fn prune(&mut self, loaded: &[i64]) -> Vec<i64> {
        let removed: Vec<i64> = self
            .selected
            .iter()
            .copied()
            .filter(|id| !loaded.contains(id))
            .collect();
        if !removed.is_empty() {
            debug!("Pruning {} stale selections: {:?}", removed.len(), removed);
            self.selected.retain(|id| loaded.contains(id));
            self.commit();
        }
        removed
    }

    /// Re-read storage to pick up changes made by another tracker sharing it.
    /// A missing entry means the selection was cleared elsewhere. Returns
    /// whether the in-memory set changed.
    pub fn sync_from_storage(&mut self) -> bool {
        let stored = read_ids(self.storage.as_ref(), &self.key).unwrap_or_default();
        if stored == self.selected {
            return false;
        }
        self.selected = stored;
        let event = if self.selected.is_empty() {
            SelectionEvent::Cleared
        } else {
            SelectionEvent::Changed(self.ids())
        };
        let _ = self.events.send(event);
        true
    }

    fn commit(&mut self) {
        let ids = self.ids();
        match serde_json::to_string(&ids) {
            Ok(json) => self.storage.save(&self.key, &json),
            Err(e) => debug!("Could not serialize selection: {}", e),
        }
        let _ = self.events.send(SelectionEvent::Changed(ids));
    }
}

impl std::fmt::Debug for SelectionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionTracker")
            .field("selected", &self.selected)
            .field("key", &self.key)
            .finish()
    }
}

fn read_ids(storage: &dyn SelectionStorage, key: &str) -> Option<BTreeSet<i64>> {
    let raw = storage.load(key)?;
    match serde_json::from_str::<Vec<i64>>(&raw) {
        Ok(ids) => Some(ids.into_iter().collect()),
        Err(e) => {
            debug!("Ignoring unparseable stored selection: {}", e);
            None
        }
    }
}
