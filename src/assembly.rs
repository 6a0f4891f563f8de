//! Wires together the reference in-memory collaborators into a ready-to-use
//! [`AuditEngine`]. Gated behind `test-utils` since the real collaborators
//! (a durable vertex/changeset store, a real proof service) are a
//! deployment's responsibility, not this crate's.

#![cfg(any(test, feature = "test-utils"))]

use crate::engine::{AuditEngine, EngineConfig};
use crate::events::NoopEventBus;
use crate::proof::memory::InMemoryProofService;
use crate::store::memory::{InMemoryChangesetStore, InMemoryVertexStore};

/// A fully in-memory [`AuditEngine`], suitable for tests and examples.
pub type InMemoryEngine =
    AuditEngine<InMemoryVertexStore, InMemoryChangesetStore, InMemoryProofService, NoopEventBus>;

/// Builds an [`InMemoryEngine`] with default configuration and a
/// discard-everything event bus.
pub fn in_memory_engine() -> InMemoryEngine {
    AuditEngine::new(
        InMemoryVertexStore::new(),
        InMemoryChangesetStore::new(),
        InMemoryProofService::new(),
        NoopEventBus,
    )
}

/// Builds an [`InMemoryEngine`] with caller-supplied configuration.
pub fn in_memory_engine_with_config(config: EngineConfig) -> InMemoryEngine {
    AuditEngine::with_config(
        InMemoryVertexStore::new(),
        InMemoryChangesetStore::new(),
        InMemoryProofService::new(),
        NoopEventBus,
        config,
    )
}
