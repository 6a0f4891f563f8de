//! The changeset aggregate: an ordered patch list plus a weak reference to
//! an externally-anchored proof.
//!
//! ```text
//!           insert           proof service        proof service
//! (none) ----------> pending-proof ----------> issued ----------> verified
//!                          |                                  \
//!                          |                                   -> failed
//!                          +-- removeVerifiable -----------------> failed
//! ```
//! The states to the right of `insert` are never stored on the changeset
//! itself; they are observed live from the proof collaborator via
//! [`crate::proof::ProofService::verify`].

use serde::{Deserialize, Serialize};

use crate::patch::Patch;
use crate::types::{ChangesetId, ProofId, Timestamp, VertexId};

/// A single recorded mutation of a vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changeset {
    pub id: ChangesetId,
    pub vertex_id: VertexId,
    pub date_created: Timestamp,
    pub user_identity: String,
    pub patches: Patch,
    pub proof_id: ProofId,
}

/// Why a changeset's proof failed to verify. `NotIssued` is the only
/// non-terminal value — the proof service has not finished anchoring yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationFailure {
    NotIssued,
    ProofMissing,
    HashMismatch,
    SignatureInvalid,
    Revoked,
}

/// The result of verifying one changeset's proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub failure: Option<VerificationFailure>,
}

impl VerificationOutcome {
    pub fn verified() -> Self {
        Self {
            verified: true,
            failure: None,
        }
    }

    pub fn failed(failure: VerificationFailure) -> Self {
        Self {
            verified: false,
            failure: Some(failure),
        }
    }
}

/// A changeset annotated with its verification outcome, as returned by
/// `AuditEngine::get` when `verifyDepth != none`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedChangeset {
    #[serde(flatten)]
    pub changeset: Changeset,
    pub verification: Option<VerificationOutcome>,
}
