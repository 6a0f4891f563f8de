//! The verifiable-proof collaborator: submits changeset digests to an
//! externally-anchored, tamper-evident proof service and later verifies
//! them. The real signing/DID/anchoring machinery lives outside this
//! crate; this module only defines the contract and an in-memory
//! reference implementation for tests.

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use async_trait::async_trait;

use crate::domain::VerificationOutcome;
use crate::error::ProofServiceError;
use crate::types::ProofId;

/// Submits and verifies proofs for changeset digests.
///
/// `verify` may legitimately report [`VerificationFailure::NotIssued`]
/// immediately after `create_proof` returns: anchoring completes
/// asynchronously, and callers are expected to poll.
///
/// [`VerificationFailure::NotIssued`]: crate::domain::VerificationFailure::NotIssued
#[async_trait]
pub trait ProofService: Send + Sync {
    /// Registers a proof under the caller-predicted `proof_id`. Returns
    /// once the submission is accepted; actual anchoring may still be in
    /// flight when this returns.
    async fn create_proof(
        &self,
        proof_id: ProofId,
        proof_object_id: String,
        proof_object_hash: String,
        user_identity: String,
    ) -> Result<(), ProofServiceError>;

    /// Checks the current verification state of a previously submitted
    /// proof.
    async fn verify(&self, proof_id: &ProofId) -> Result<VerificationOutcome, ProofServiceError>;

    /// Best-effort removal of the anchored proof data. Changeset records
    /// are unaffected; subsequent `verify` calls report `proofMissing`.
    async fn remove(&self, proof_id: &ProofId) -> Result<(), ProofServiceError>;
}
