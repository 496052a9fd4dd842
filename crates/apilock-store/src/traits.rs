use crate::error::StoreResult;
use crate::snapshot::{Snapshot, SnapshotDigest};

/// Storage for recorded API snapshots, one per API type name.
///
/// Implementations must satisfy these invariants:
/// - A snapshot is keyed by its API type name; writing replaces any earlier
///   snapshot under the same name.
/// - Snapshots returned by `read` are linked and digest-verified.
/// - Concurrent reads and writes of different names are safe.
/// - All I/O errors are propagated, never silently ignored.
pub trait SnapshotStore: Send + Sync {
    /// Read the snapshot recorded for `name`.
    ///
    /// Returns `Ok(None)` if nothing is recorded.
    /// Returns `Err` on I/O failure or a corrupt snapshot.
    fn read(&self, name: &str) -> StoreResult<Option<Snapshot>>;

    /// Record a snapshot under its API name and return its digest.
    fn write(&self, snapshot: &Snapshot) -> StoreResult<SnapshotDigest>;

    /// Check whether a snapshot is recorded for `name`.
    fn exists(&self, name: &str) -> StoreResult<bool>;

    /// Delete the snapshot for `name`. Returns `true` if it existed.
    fn delete(&self, name: &str) -> StoreResult<bool>;

    /// Names of every recorded snapshot, sorted.
    fn list(&self) -> StoreResult<Vec<String>>;
}
