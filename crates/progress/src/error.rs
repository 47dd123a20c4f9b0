//! Errors surfaced by the persistence boundary.

use lectio_storage::StorageError;

/// Result type for engine persistence operations.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Errors that can occur while saving or erasing progress.
///
/// Mutations never fail; only `persist` and `purge` return these.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Backend failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Snapshot could not be encoded
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}
