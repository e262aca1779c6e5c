//! Error types for the scheduling engine.

/// Errors raised while validating or processing a review.
///
/// Distinct from [`crate::storage::StorageError`]: this covers malformed
/// requests and invariant violations in the pure algorithm, not I/O.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The caller supplied a request the engine cannot act on.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
