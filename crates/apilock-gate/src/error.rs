use std::fmt;

use apilock_store::StoreError;
use apilock_types::ProviderError;

/// Errors that stop a gate check before a decision is reached.
///
/// A breaking change is not an error: it is a `Rejected` decision.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// No snapshot is recorded and the gate is not allowed to record one.
    #[error("no snapshot recorded for {0}")]
    MissingSnapshot(String),

    /// The snapshot store failed.
    #[error("snapshot store error: {0}")]
    Store(#[from] StoreError),

    /// The symbol provider could not build a tree.
    #[error("symbol provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PartialEq for GateError {
    fn eq(&self, other: &Self) -> bool {
        // Compare by display representation for test convenience.
        fmt::format(format_args!("{self}")) == fmt::format(format_args!("{other}"))
    }
}

impl Eq for GateError {}
