//! Snapshot storage for apilock.
//!
//! A snapshot is the recorded symbol tree of one API type. Stores keep one
//! snapshot per API type name, encoded as pretty JSON inside an envelope that
//! carries a format version and a domain-separated BLAKE3 digest of the tree.
//! The digest is verified on every read, and parent links are rebuilt.
//!
//! # Storage Backends
//!
//! All backends implement the [`SnapshotStore`] trait:
//!
//! - [`InMemorySnapshotStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileSnapshotStore`] -- one `<ApiName>.api.json` file per API type
//!
//! # Design Rules
//!
//! 1. Writes replace the previous snapshot atomically (temp file + rename).
//! 2. A snapshot whose digest does not match its tree is never returned.
//! 3. API names are validated before they touch the filesystem.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::{FileSnapshotStore, SNAPSHOT_SUFFIX};
pub use memory::InMemorySnapshotStore;
pub use snapshot::{validate_name, Snapshot, SnapshotDigest, SNAPSHOT_FORMAT_VERSION};
pub use traits::SnapshotStore;
