use std::thread;
use std::time::{Duration, Instant};

use apilock_diff::{diff, Mismatch, Verdict};
use apilock_store::{Snapshot, SnapshotDigest, SnapshotStore};
use apilock_types::{SymbolProvider, TypeNode};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GateConfig;
use crate::error::GateError;

// ---------------------------------------------------------------------------
// GateResult
// ---------------------------------------------------------------------------

/// The decision for one API type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    /// The live tree is compatible with the recorded snapshot.
    Accepted,
    /// The live tree was written as the new snapshot.
    Recorded,
    /// The live tree breaks the recorded snapshot.
    Rejected { verdict: Verdict },
}

impl GateDecision {
    pub fn is_accepted(&self) -> bool {
        !self.is_rejected()
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// The outcome of checking one API type against its snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct GateResult {
    /// Name of the API type.
    pub api: String,
    pub decision: GateDecision,
    /// Mismatches in traversal order, capped at `max_reported`.
    pub mismatches: Vec<Mismatch>,
    /// Number of mismatches before the cap.
    pub total_mismatches: usize,
    /// Digest of the snapshot the decision refers to.
    pub digest: Option<SnapshotDigest>,
    /// Wall-clock time for the check.
    pub elapsed: Duration,
}

impl GateResult {
    /// Returns `true` unless the API type was rejected.
    pub fn is_accepted(&self) -> bool {
        self.decision.is_accepted()
    }

    /// The verdict of a rejected check.
    pub fn verdict(&self) -> Option<&Verdict> {
        match &self.decision {
            GateDecision::Rejected { verdict } => Some(verdict),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ApiGate
// ---------------------------------------------------------------------------

/// The API regression gate: compares live symbol trees against the
/// snapshots recorded in a store.
pub struct ApiGate<S> {
    store: S,
    config: GateConfig,
}

impl<S: SnapshotStore> ApiGate<S> {
    pub fn new(store: S, config: GateConfig) -> Self {
        Self { store, config }
    }

    /// The current configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check one live tree against its recorded snapshot.
    pub fn check(&self, candidate: &TypeNode) -> Result<GateResult, GateError> {
        let start = Instant::now();
        let name = candidate.name.clone();

        if self.config.permissive {
            debug!(api = %name, "permissive gate, skipping comparison");
            return Ok(GateResult {
                api: name,
                decision: GateDecision::Accepted,
                mismatches: Vec::new(),
                total_mismatches: 0,
                digest: None,
                elapsed: start.elapsed(),
            });
        }

        let Some(recorded) = self.store.read(&name)? else {
            if !(self.config.record_missing || self.config.update_snapshots) {
                return Err(GateError::MissingSnapshot(name));
            }
            let digest = self.record(candidate)?;
            return Ok(GateResult {
                api: name,
                decision: GateDecision::Recorded,
                mismatches: Vec::new(),
                total_mismatches: 0,
                digest: Some(digest),
                elapsed: start.elapsed(),
            });
        };

        let changes = diff(&recorded.api, candidate);
        let total_mismatches = changes.len();

        let (decision, digest) = if changes.is_empty() {
            (GateDecision::Accepted, recorded.digest()?)
        } else if self.config.update_snapshots {
            (GateDecision::Recorded, self.record(candidate)?)
        } else {
            let decision = match changes.verdict() {
                Ok(()) => GateDecision::Accepted,
                Err(verdict) => GateDecision::Rejected { verdict },
            };
            (decision, recorded.digest()?)
        };

        debug!(
            api = %name,
            mismatches = total_mismatches,
            rejected = decision.is_rejected(),
            "gate decision"
        );

        Ok(GateResult {
            api: name,
            decision,
            mismatches: changes
                .into_iter()
                .take(self.config.max_reported)
                .collect(),
            total_mismatches,
            digest: Some(digest),
            elapsed: start.elapsed(),
        })
    }

    /// Build the named API type with `provider` and check it.
    pub fn check_with(
        &self,
        provider: &dyn SymbolProvider,
        type_name: &str,
    ) -> Result<GateResult, GateError> {
        let tree = provider.build_tree(type_name)?;
        self.check(&tree)
    }

    /// Check independent API types concurrently, one scoped thread each.
    /// Results are returned in input order.
    pub fn check_all(&self, candidates: &[TypeNode]) -> Vec<Result<GateResult, GateError>> {
        thread::scope(|scope| {
            let handles: Vec<_> = candidates
                .iter()
                .map(|candidate| scope.spawn(move || self.check(candidate)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }

    /// Write `candidate` as the snapshot for its API type.
    pub fn approve(&self, candidate: &TypeNode) -> Result<SnapshotDigest, GateError> {
        self.record(candidate)
    }

    fn record(&self, candidate: &TypeNode) -> Result<SnapshotDigest, GateError> {
        let digest = self.store.write(&Snapshot::new(candidate.clone()))?;
        info!(api = %candidate.name, digest = %digest.short_hex(), "recorded snapshot");
        Ok(digest)
    }
}
