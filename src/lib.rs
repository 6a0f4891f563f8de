#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//! A persistent, append-only auditable item graph.
//!
//! Every vertex mutation is captured as an ordered changeset whose patches
//! are canonicalized, hashed and submitted to an external verifiable-proof
//! service. Nothing is ever physically deleted: child elements (aliases,
//! resources, edges) are tombstoned in place, and a vertex's changeset
//! history, replayed in order, reconstructs its current state.
//!
//! [`engine::AuditEngine`] is the entry point; it is generic over four
//! collaborator traits ([`store::VertexStore`], [`store::ChangesetStore`],
//! [`proof::ProofService`], [`events::EventBus`]) so a deployment can
//! plug in real storage and proof backends. This crate ships in-memory
//! reference implementations of all four behind the `test-utils` feature
//! (see [`assembly`]), enough to exercise the engine end-to-end without a
//! real backend.

/// Deterministic JSON canonicalization (JCS-style).
pub mod canonical;
/// RFC 6902 JSON-Patch diff/apply over RFC 6901 pointers.
pub mod patch;
/// Child-element array reconciliation with tombstone semantics.
pub mod reconcile;

/// Vertex and changeset aggregates.
pub mod domain;
/// Crate-wide error taxonomy.
pub mod error;
/// Shared identifier and value types.
pub mod types;

/// Persistence collaborator traits and in-memory reference stores.
pub mod store;

/// Verifiable-proof collaborator trait and in-memory reference service.
pub mod proof;

/// Vertex-mutation notification collaborator.
pub mod events;

/// The audit engine: orchestrates mutation and verified reads.
pub mod engine;

/// Read-side query options and projection shapes.
pub mod query;

/// Wiring of the in-memory reference collaborators, for tests/examples.
pub mod assembly;

pub use domain::{Alias, Changeset, Edge, Resource, Vertex};
pub use engine::{AuditEngine, DesiredVertex, EngineConfig, GetOptions, ProjectedVertex, VerifyDepth};
pub use error::AigError;
pub use query::{OutputShape, QueryOptions, QueryPage};
pub use types::{ChangesetId, ProofId, Urn, VertexId};
