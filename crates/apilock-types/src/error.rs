use thiserror::Error;

/// Errors signaled at the symbol provider boundary.
///
/// Structural differences between two trees are never errors; these cover
/// only the cases where a tree cannot be produced at all.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("API type not found: {0}")]
    TypeNotFound(String),

    #[error("API type is not public: {0}")]
    NotPublic(String),

    #[error("invalid symbol source: {0}")]
    Invalid(String),
}

/// Result alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
