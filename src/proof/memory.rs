//! A non-durable [`ProofService`] that anchors proofs synchronously: useful
//! for tests exercising the "issued" and "verified" states without needing
//! to poll for eventual consistency.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{VerificationFailure, VerificationOutcome};
use crate::error::ProofServiceError;
use crate::types::ProofId;

use super::ProofService;

#[derive(Debug, Clone)]
struct ProofRecord {
    #[allow(dead_code)]
    proof_object_id: String,
    #[allow(dead_code)]
    proof_object_hash: String,
    #[allow(dead_code)]
    user_identity: String,
    removed: bool,
}

/// Reference [`ProofService`]: every submitted proof is treated as
/// immediately issued and verifiable, until [`ProofService::remove`] is
/// called on it.
#[derive(Default)]
pub struct InMemoryProofService {
    proofs: DashMap<ProofId, ProofRecord>,
}

impl InMemoryProofService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProofService for InMemoryProofService {
    async fn create_proof(
        &self,
        proof_id: ProofId,
        proof_object_id: String,
        proof_object_hash: String,
        user_identity: String,
    ) -> Result<(), ProofServiceError> {
        self.proofs.insert(
            proof_id,
            ProofRecord {
                proof_object_id,
                proof_object_hash,
                user_identity,
                removed: false,
            },
        );
        Ok(())
    }

    async fn verify(&self, proof_id: &ProofId) -> Result<VerificationOutcome, ProofServiceError> {
        match self.proofs.get(proof_id) {
            None => Ok(VerificationOutcome::failed(VerificationFailure::NotIssued)),
            Some(record) if record.removed => {
                Ok(VerificationOutcome::failed(VerificationFailure::ProofMissing))
            }
            Some(_) => Ok(VerificationOutcome::verified()),
        }
    }

    async fn remove(&self, proof_id: &ProofId) -> Result<(), ProofServiceError> {
        if let Some(mut record) = self.proofs.get_mut(proof_id) {
            record.removed = true;
        }
        Ok(())
    }
}
