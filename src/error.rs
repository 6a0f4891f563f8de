//! Error taxonomy for the graph-mutation engine.
//!
//! Only the variants below are allowed to escape a public `AuditEngine`
//! method. Proof-submission and proof-verification failures are recovered
//! locally and reported as inert state instead of propagated.

/// Errors raised by a `VertexStore`/`ChangesetStore` implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// No record exists for the given id.
    #[error("not found")]
    NotFound,
    /// The underlying storage backend failed.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Errors raised by a `ProofService` implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProofServiceError {
    #[error("proof submission failed: {0}")]
    SubmissionFailed(String),
    #[error("proof backend failure: {0}")]
    Backend(String),
}

/// Crate-wide error type. Only the variants here are ever returned from a
/// public `AuditEngine` operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AigError {
    /// The referenced vertex does not exist.
    #[error("vertex not found")]
    NotFound,
    /// Caller-supplied state violates a shape invariant (e.g. two live
    /// child elements sharing an id within the same array).
    #[error("validation failed: {0}")]
    Validation(String),
    /// A supplied identifier is not a well-formed `aig:` urn.
    #[error("namespace mismatch: {0}")]
    NamespaceMismatch(String),
    /// The vertex was persisted but its changeset was not; the vertex
    /// store is the source of truth and the caller should re-issue the
    /// same desired state to complete the write.
    #[error("partial write: vertex persisted, changeset not recorded: {0}")]
    PartialWrite(String),
    /// The underlying store failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_wraps_store_error() {
        let err: AigError = StoreError::NotFound.into();
        assert!(matches!(err, AigError::Storage(StoreError::NotFound)));
    }
}
