//! Orchestrates vertex mutation (reconcile → diff → changeset → proof
//! submission) and vertex reads (load → optional verification →
//! projection).
//!
//! Generic over the four collaborator traits so a deployment can swap in
//! real storage/proof/event backends without touching this module.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::canonical::canonicalize;
use crate::domain::{Alias, Changeset, Edge, Resource, Vertex, VerificationOutcome, VerifiedChangeset};
use crate::error::{AigError, StoreError};
use crate::events::{Event, EventBus};
use crate::patch::{diff, Patch};
use crate::proof::ProofService;
use crate::query::{self, QueryOptions, QueryPage};
use crate::reconcile::reconcile;
use crate::store::{ChangesetStore, VertexStore};
use crate::types::{ChangesetId, ProofId, Timestamp, VertexId};

/// Loads a vertex, translating a missing record into [`AigError::NotFound`]
/// rather than leaking the store's own not-found variant.
async fn load_vertex<V: VertexStore>(store: &V, id: &VertexId) -> Result<Vertex, AigError> {
    match store.get(id).await {
        Ok(vertex) => Ok(vertex),
        Err(StoreError::NotFound) => Err(AigError::NotFound),
        Err(err) => Err(AigError::Storage(err)),
    }
}

/// Tunable knobs for constructing an [`AuditEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Default page size used by callers of `VertexStore::query` that
    /// don't specify one explicitly. See §4.4.
    pub default_page_size: usize,
    /// Initial capacity hint for the per-vertex advisory lock map.
    pub lock_map_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: crate::store::DEFAULT_PAGE_SIZE,
            lock_map_capacity: 1024,
        }
    }
}

/// The full desired state of a vertex's mutable content, as supplied by a
/// caller to `create`/`update`.
#[derive(Debug, Clone, Default)]
pub struct DesiredVertex {
    pub annotation_object: Option<crate::types::JsonValue>,
    pub aliases: Vec<Alias>,
    pub resources: Vec<Resource>,
    pub edges: Vec<Edge>,
}

/// How deep `get` should verify a vertex's changeset proofs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyDepth {
    #[default]
    None,
    Current,
    All,
}

/// Options controlling a `get` read.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub include_deleted: bool,
    pub include_changesets: bool,
    pub verify_depth: VerifyDepth,
}

/// The result of a `get`: the vertex, optionally its changeset history with
/// verification outcomes attached.
#[derive(Debug, Clone)]
pub struct ProjectedVertex {
    pub vertex: Vertex,
    pub changesets: Option<Vec<VerifiedChangeset>>,
    /// Logical AND of every attached changeset's verification outcome.
    /// `None` when `verify_depth == VerifyDepth::None`.
    pub verified: Option<bool>,
}

fn content_json(vertex: &Vertex) -> crate::types::JsonValue {
    json!({
        "annotationObject": vertex.annotation_object,
        "aliases": vertex.aliases,
        "resources": vertex.resources,
        "edges": vertex.edges,
    })
}

/// Hashes the patch-and-context envelope a proof anchors, per §4.6.1 step 8.
fn proof_object_hash(patches: &Patch, user_identity: &str) -> String {
    let envelope = json!({
        "@context": [crate::query::CONTEXT_URI],
        "patches": patches,
        "userIdentity": user_identity,
    });
    let bytes = canonicalize(&envelope);
    let digest = Sha256::digest(&bytes);
    hex::encode(digest)
}

/// Orchestrates create/update/get/removeVerifiable over pluggable
/// collaborators.
pub struct AuditEngine<V, C, P, E> {
    vertex_store: V,
    changeset_store: C,
    proof_service: P,
    event_bus: E,
    config: EngineConfig,
    locks: DashMap<VertexId, Arc<Mutex<()>>>,
}

impl<V, C, P, E> AuditEngine<V, C, P, E>
where
    V: VertexStore,
    C: ChangesetStore,
    P: ProofService,
    E: EventBus,
{
    pub fn new(vertex_store: V, changeset_store: C, proof_service: P, event_bus: E) -> Self {
        Self::with_config(vertex_store, changeset_store, proof_service, event_bus, EngineConfig::default())
    }

    pub fn with_config(
        vertex_store: V,
        changeset_store: C,
        proof_service: P,
        event_bus: E,
        config: EngineConfig,
    ) -> Self {
        Self {
            vertex_store,
            changeset_store,
            proof_service,
            event_bus,
            locks: DashMap::with_capacity(config.lock_map_capacity),
            config,
        }
    }

    async fn lock_for(&self, id: &VertexId) -> tokio::sync::OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    /// Creates a brand-new vertex from `desired`, records its first
    /// changeset, submits a proof and publishes `vertex-created`.
    ///
    /// See §4.6.1: id and changeset id are minted up front, including the
    /// changeset's proof id, so the proof can be submitted under an id the
    /// engine already knows rather than one handed back by the proof
    /// service.
    pub async fn create(
        &self,
        desired: DesiredVertex,
        user_identity: String,
        node_identity: String,
    ) -> Result<VertexId, AigError> {
        let id = VertexId::generate();
        let _guard = self.lock_for(&id).await;
        let now = chrono::Utc::now();

        let prior = Vertex {
            id: id.clone(),
            node_identity,
            date_created: now,
            date_modified: now,
            annotation_object: None,
            aliases: vec![],
            resources: vec![],
            edges: vec![],
        };

        let next = self.reconcile_into(&prior, desired, now)?;
        self.commit(prior, next, user_identity, now, true).await?;
        Ok(id)
    }

    /// Merges `desired` into the vertex identified by `id`, recording a new
    /// changeset (even if the merge is a no-op — see §4.6.2 and S5).
    pub async fn update(
        &self,
        id: &VertexId,
        desired: DesiredVertex,
        user_identity: String,
    ) -> Result<(), AigError> {
        let _guard = self.lock_for(id).await;
        let now = chrono::Utc::now();

        let prior = load_vertex(&self.vertex_store, id).await?;
        let next = self.reconcile_into(&prior, desired, now)?;
        self.commit(prior, next, user_identity, now, false).await?;
        Ok(())
    }

    fn reconcile_into(
        &self,
        prior: &Vertex,
        desired: DesiredVertex,
        now: Timestamp,
    ) -> Result<Vertex, AigError> {
        Ok(Vertex {
            id: prior.id.clone(),
            node_identity: prior.node_identity.clone(),
            date_created: prior.date_created,
            date_modified: prior.date_modified,
            annotation_object: desired.annotation_object,
            aliases: reconcile(prior.aliases.clone(), desired.aliases, now)?,
            resources: reconcile(prior.resources.clone(), desired.resources, now)?,
            edges: reconcile(prior.edges.clone(), desired.edges, now)?,
        })
    }

    async fn commit(
        &self,
        prior: Vertex,
        mut next: Vertex,
        user_identity: String,
        now: Timestamp,
        is_create: bool,
    ) -> Result<(), AigError> {
        let patches = diff(&content_json(&prior), &content_json(&next));

        if !patches.is_empty() || is_create {
            next.date_modified = now;
        } else {
            next.date_modified = prior.date_modified;
        }

        if let Err(err) = self.vertex_store.put(next.clone()).await {
            tracing::error!(vertex_id = %next.id, %err, "vertex store write failed");
            return Err(AigError::Storage(err));
        }

        let changeset_id = ChangesetId::generate();
        let proof_id = ProofId::from_hex_unchecked(changeset_id.as_str());
        let changeset = Changeset {
            id: changeset_id.clone(),
            vertex_id: next.id.clone(),
            date_created: now,
            user_identity: user_identity.clone(),
            patches: patches.clone(),
            proof_id: proof_id.clone(),
        };

        if let Err(err) = self.changeset_store.insert(changeset).await {
            tracing::error!(
                vertex_id = %next.id,
                changeset_id = %changeset_id,
                %err,
                "changeset store write failed after vertex was persisted"
            );
            return Err(AigError::PartialWrite(err.to_string()));
        }

        let proof_object_id = crate::types::Urn::changeset(&next.id, &changeset_id);
        let hash = proof_object_hash(&patches, &user_identity);
        if let Err(err) = self
            .proof_service
            .create_proof(proof_id, proof_object_id, hash, user_identity)
            .await
        {
            tracing::warn!(vertex_id = %next.id, %err, "proof submission failed, changeset remains pending-proof");
        }

        tracing::info!(
            vertex_id = %next.id,
            changeset_id = %changeset_id,
            patch_count = patches.len(),
            "vertex mutation committed"
        );

        let event = if is_create {
            Event::VertexCreated { id: next.id.clone() }
        } else {
            Event::VertexUpdated {
                id: next.id.clone(),
                patches,
            }
        };
        self.event_bus.publish(event).await;

        Ok(())
    }

    /// Loads a vertex, optionally filtering tombstones, attaching
    /// changesets and verifying their proofs.
    pub async fn get(&self, id: &VertexId, options: GetOptions) -> Result<ProjectedVertex, AigError> {
        let vertex = load_vertex(&self.vertex_store, id).await?;
        let vertex = if options.include_deleted {
            vertex
        } else {
            vertex.without_deleted()
        };

        if !options.include_changesets && options.verify_depth == VerifyDepth::None {
            return Ok(ProjectedVertex {
                vertex,
                changesets: None,
                verified: None,
            });
        }

        let all_changesets = self.changeset_store.list(id, None, usize::MAX).await.map_err(|err| {
            tracing::error!(vertex_id = %id, %err, "changeset store read failed");
            AigError::Storage(err)
        })?;

        let to_verify: Vec<&Changeset> = match options.verify_depth {
            VerifyDepth::None => vec![],
            VerifyDepth::All => all_changesets.iter().collect(),
            VerifyDepth::Current => all_changesets.last().into_iter().collect(),
        };

        let mut verified_by_id = std::collections::HashMap::new();
        for cs in &to_verify {
            let outcome = match self.proof_service.verify(&cs.proof_id).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(changeset_id = %cs.id, %err, "proof verification failed");
                    VerificationOutcome::failed(crate::domain::VerificationFailure::NotIssued)
                }
            };
            verified_by_id.insert(cs.id.clone(), outcome);
        }

        let overall_verified = if options.verify_depth == VerifyDepth::None {
            None
        } else {
            Some(verified_by_id.values().all(|o| o.verified))
        };

        let changesets = if options.include_changesets || options.verify_depth != VerifyDepth::None {
            Some(
                all_changesets
                    .into_iter()
                    .map(|cs| {
                        let verification = verified_by_id.get(&cs.id).copied();
                        VerifiedChangeset {
                            changeset: cs,
                            verification,
                        }
                    })
                    .collect(),
            )
        } else {
            None
        };

        Ok(ProjectedVertex {
            vertex,
            changesets,
            verified: overall_verified,
        })
    }

    /// Runs a §4.9 query: filters/sorts/pages via the vertex store, then
    /// projects each returned vertex into `options.shape`, restricted to
    /// `options.properties` if given.
    pub async fn query(&self, options: QueryOptions) -> Result<QueryPage, AigError> {
        let page_size = options.page_size.unwrap_or(self.config.default_page_size);
        let page = self
            .vertex_store
            .query(
                options.criteria,
                options.order_by.into(),
                options.direction.into(),
                options.cursor,
                page_size,
            )
            .await
            .map_err(|err| {
                tracing::error!(%err, "vertex store query failed");
                AigError::Storage(err)
            })?;

        let vertices = page
            .vertices
            .iter()
            .map(|v| query::project(v, options.shape, options.properties.as_deref()))
            .collect();

        Ok(QueryPage {
            vertices,
            next_cursor: page.next_cursor,
        })
    }

    /// Instructs the proof collaborator to drop every anchored proof for
    /// `id`'s changesets. The changeset records themselves are untouched;
    /// subsequent verification reports `proofMissing`.
    pub async fn remove_verifiable(&self, id: &VertexId) -> Result<(), AigError> {
        let _guard = self.lock_for(id).await;
        // Confirm the vertex exists before touching its proofs.
        load_vertex(&self.vertex_store, id).await?;

        let changesets = self.changeset_store.list(id, None, usize::MAX).await.map_err(|err| {
            tracing::error!(vertex_id = %id, %err, "changeset store read failed");
            AigError::Storage(err)
        })?;

        for cs in changesets {
            if let Err(err) = self.proof_service.remove(&cs.proof_id).await {
                tracing::warn!(changeset_id = %cs.id, %err, "failed to remove anchored proof");
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
