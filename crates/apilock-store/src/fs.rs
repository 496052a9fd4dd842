use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::snapshot::{validate_name, Snapshot, SnapshotDigest};
use crate::traits::SnapshotStore;

/// File-name suffix of every snapshot file.
pub const SNAPSHOT_SUFFIX: &str = ".api.json";

/// Directory-backed snapshot store: `<root>/<ApiName>.api.json`.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target, so readers never observe a partial snapshot.
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store and make sure its directory exists.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self::new(root);
        fs::create_dir_all(&store.root)?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the snapshot file for `name`.
    pub fn path_for(&self, name: &str) -> StoreResult<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(format!("{name}{SNAPSHOT_SUFFIX}")))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self, name: &str) -> StoreResult<Option<Snapshot>> {
        let path = self.path_for(name)?;
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot = Snapshot::from_json(name, &json)?;
        debug!(api = %name, path = %path.display(), "read snapshot");
        Ok(Some(snapshot))
    }

    fn write(&self, snapshot: &Snapshot) -> StoreResult<SnapshotDigest> {
        let path = self.path_for(snapshot.name())?;
        let json = snapshot.to_json()?;
        fs::create_dir_all(&self.root)?;

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        let digest = snapshot.digest()?;
        debug!(api = %snapshot.name(), digest = %digest.short_hex(), "wrote snapshot");
        Ok(digest)
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.path_for(name)?.is_file())
    }

    fn delete(&self, name: &str) -> StoreResult<bool> {
        match fs::remove_file(self.path_for(name)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let file_name = entry?.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(name) = file_name.strip_suffix(SNAPSHOT_SUFFIX) else {
                continue;
            };
            if validate_name(name).is_err() {
                warn!(file = %file_name, "skipping snapshot file with invalid name");
                continue;
            }
            names.push(name.to_string());
        }
        names.sort();
        Ok(names)
    }
}
