use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::snapshot::{validate_name, Snapshot, SnapshotDigest};
use crate::traits::SnapshotStore;

/// In-memory, HashMap-based snapshot store.
///
/// Intended for tests and embedding. Snapshots are held behind a `RwLock`
/// and cloned on read/write.
pub struct InMemorySnapshotStore {
    snapshots: RwLock<HashMap<String, Snapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().expect("lock poisoned").is_empty()
    }

    /// Remove every snapshot.
    pub fn clear(&self) {
        self.snapshots.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn read(&self, name: &str) -> StoreResult<Option<Snapshot>> {
        let map = self.snapshots.read().expect("lock poisoned");
        Ok(map.get(name).cloned())
    }

    fn write(&self, snapshot: &Snapshot) -> StoreResult<SnapshotDigest> {
        validate_name(snapshot.name())?;
        let digest = snapshot.digest()?;
        let mut map = self.snapshots.write().expect("lock poisoned");
        map.insert(snapshot.name().to_string(), snapshot.clone());
        Ok(digest)
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        let map = self.snapshots.read().expect("lock poisoned");
        Ok(map.contains_key(name))
    }

    fn delete(&self, name: &str) -> StoreResult<bool> {
        let mut map = self.snapshots.write().expect("lock poisoned");
        Ok(map.remove(name).is_some())
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        let map = self.snapshots.read().expect("lock poisoned");
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl std::fmt::Debug for InMemorySnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySnapshotStore")
            .field("snapshot_count", &self.len())
            .finish()
    }
}
