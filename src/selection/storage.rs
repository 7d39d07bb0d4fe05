//! Session-scoped key/value storage backing the selection set

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// Per-session storage: survives a reload, not a new session
pub trait SelectionStorage: Send {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-process storage. Clones share the same map, so several trackers can
/// observe one session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SelectionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries().remove(key);
    }
}

/// One JSON file per key inside a session directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage under the system temp dir, scoped by session name
    pub fn for_session(session: &str) -> Self {
        Self::new(std::env::temp_dir().join(format!("property-admin-{}", session)))
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SelectionStorage for FileStorage {
    fn load(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path(key)).ok()
    }

    fn save(&mut self, key: &str, value: &str) {
        let result = std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(self.path(key), value));
        if let Err(e) = result {
            warn!("Failed to persist selection to {}: {}", self.dir.display(), e);
        }
    }

    fn remove(&mut self, key: &str) {
        let path = self.path(key);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}
