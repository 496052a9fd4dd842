use std::fmt;

use apilock_types::TypeNode;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Current on-disk snapshot format.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Domain tag prepended to every snapshot digest computation.
const DIGEST_DOMAIN: &str = "apilock-snapshot-v1";

// ---------------------------------------------------------------------------
// SnapshotDigest
// ---------------------------------------------------------------------------

/// Domain-separated BLAKE3 digest of a snapshot's symbol tree.
///
/// The tree is hashed as JSON, so two snapshots with equal trees always have
/// equal digests. Parent links are not serialized and never affect it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SnapshotDigest([u8; 32]);

impl SnapshotDigest {
    /// Digest of a symbol tree.
    pub fn compute(api: &TypeNode) -> StoreResult<Self> {
        let data =
            serde_json::to_vec(api).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self::of_bytes(&data))
    }

    fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(DIGEST_DOMAIN.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> StoreResult<Self> {
        let bytes = hex::decode(s).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            StoreError::Serialization(format!("digest must be 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotDigest({})", self.short_hex())
    }
}

impl fmt::Display for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for SnapshotDigest {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s).map_err(|e| e.to_string())
    }
}

impl From<SnapshotDigest> for String {
    fn from(digest: SnapshotDigest) -> Self {
        digest.to_hex()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The recorded symbol tree of one API type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub format_version: u32,
    /// Linked symbol tree.
    pub api: TypeNode,
}

/// On-disk envelope: the tree plus the digest it must hash to.
#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    format_version: u32,
    digest: SnapshotDigest,
    api: TypeNode,
}

impl Snapshot {
    /// Wrap a tree in a snapshot of the current format, linking it.
    pub fn new(api: TypeNode) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            api: api.linked(),
        }
    }

    /// Name of the API type, used as the storage key.
    pub fn name(&self) -> &str {
        &self.api.name
    }

    pub fn digest(&self) -> StoreResult<SnapshotDigest> {
        SnapshotDigest::compute(&self.api)
    }

    /// Encode as pretty JSON with an embedded digest.
    pub fn to_json(&self) -> StoreResult<String> {
        let file = SnapshotFile {
            format_version: self.format_version,
            digest: self.digest()?,
            api: self.api.clone(),
        };
        let mut json = serde_json::to_string_pretty(&file)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    /// Decode a snapshot recorded under `name`, verifying its format, key
    /// and digest. The returned tree is linked.
    pub fn from_json(name: &str, json: &str) -> StoreResult<Self> {
        let file: SnapshotFile =
            serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))?;

        if file.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(StoreError::CorruptSnapshot {
                name: name.to_string(),
                reason: format!("unsupported format version {}", file.format_version),
            });
        }
        if file.api.name != name {
            return Err(StoreError::CorruptSnapshot {
                name: name.to_string(),
                reason: format!("file holds API type {}", file.api.name),
            });
        }

        let computed = SnapshotDigest::compute(&file.api)?;
        if computed != file.digest {
            return Err(StoreError::HashMismatch {
                name: name.to_string(),
                expected: file.digest.to_hex(),
                computed: computed.to_hex(),
            });
        }

        Ok(Self {
            format_version: file.format_version,
            api: file.api.linked(),
        })
    }
}

/// Check that an API name is usable as a storage key: non-empty, no path
/// separators, and not starting with a dot.
pub fn validate_name(name: &str) -> StoreResult<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '`'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}
