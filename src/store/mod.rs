//! Persistence collaborators: `VertexStore` and `ChangesetStore`.
//!
//! These are the traits a deployment implements against a real database;
//! this crate ships only in-memory reference implementations (see
//! [`memory`]), gated behind `#[cfg(any(test, feature = "test-utils"))]` so
//! they can drive integration tests without a real backend.

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use async_trait::async_trait;

use crate::domain::{Changeset, Vertex};
use crate::error::StoreError;
use crate::types::{ChangesetId, VertexId};

/// How an `idPrefix` filter is matched against a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMode {
    Id,
    Alias,
    Both,
}

/// Sort key for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    DateCreated,
    DateModified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// An equality filter evaluated against a vertex's `annotationObject`: the
/// pointer must resolve and its canonical bytes must match the expected
/// value's canonical bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub pointer: String,
    pub expected: crate::types::JsonValue,
}

/// Filter criteria for `VertexStore::query`.
#[derive(Debug, Clone, Default)]
pub struct QueryCriteria {
    pub id_prefix: Option<String>,
    pub id_mode: Option<IdMode>,
    pub resource_types: Vec<String>,
    pub conditions: Vec<Condition>,
}

/// Opaque pagination cursor. Implementations are free to choose an
/// encoding; the in-memory reference store uses a plain offset.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Cursor(pub String);

/// A page of query results.
#[derive(Debug, Clone)]
pub struct Page {
    pub vertices: Vec<Vertex>,
    pub next_cursor: Option<Cursor>,
}

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Persists and loads vertices, including paged, filtered queries.
#[async_trait]
pub trait VertexStore: Send + Sync {
    async fn put(&self, vertex: Vertex) -> Result<(), StoreError>;
    async fn get(&self, id: &VertexId) -> Result<Vertex, StoreError>;
    async fn query(
        &self,
        criteria: QueryCriteria,
        order_by: OrderBy,
        direction: OrderDirection,
        cursor: Option<Cursor>,
        page_size: usize,
    ) -> Result<Page, StoreError>;
}

/// Persists changesets and lists a vertex's history in creation order.
#[async_trait]
pub trait ChangesetStore: Send + Sync {
    async fn insert(&self, changeset: Changeset) -> Result<(), StoreError>;
    async fn get(&self, id: &ChangesetId) -> Result<Changeset, StoreError>;
    /// Lists up to `limit` changesets for `vertex_id` in ascending creation
    /// order, starting after `after` (exclusive) when given.
    async fn list(
        &self,
        vertex_id: &VertexId,
        after: Option<ChangesetId>,
        limit: usize,
    ) -> Result<Vec<Changeset>, StoreError>;
}
