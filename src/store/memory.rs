//! In-memory reference implementations of [`super::VertexStore`] and
//! [`super::ChangesetStore`], good enough to exercise the audit engine in
//! tests and examples but with no durability.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::canonical::canonical_eq;
use crate::domain::{Changeset, Vertex};
use crate::error::StoreError;
use crate::patch::resolve;
use crate::types::{ChangesetId, VertexId};

use super::{ChangesetStore, Condition, Cursor, IdMode, OrderBy, OrderDirection, Page, QueryCriteria, VertexStore};

/// A non-durable [`VertexStore`] backed by a concurrent hash map.
#[derive(Default)]
pub struct InMemoryVertexStore {
    vertices: DashMap<VertexId, Vertex>,
}

impl InMemoryVertexStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_conditions(vertex: &Vertex, conditions: &[Condition]) -> bool {
    let Some(annotation) = vertex.annotation_object.as_ref() else {
        return conditions.is_empty();
    };
    conditions.iter().all(|c| match resolve(annotation, &c.pointer) {
        Ok(found) => canonical_eq(found, &c.expected),
        Err(_) => false,
    })
}

fn matches_id_prefix(vertex: &Vertex, prefix: &str, mode: IdMode) -> bool {
    let id_match = vertex.id.as_str().starts_with(prefix);
    let alias_match = vertex
        .alias_index()
        .split("||")
        .any(|a| !a.is_empty() && a.starts_with(prefix));
    match mode {
        IdMode::Id => id_match,
        IdMode::Alias => alias_match,
        IdMode::Both => id_match || alias_match,
    }
}

fn matches_resource_types(vertex: &Vertex, types: &[String]) -> bool {
    if types.is_empty() {
        return true;
    }
    let index = vertex.resource_type_index();
    let present: Vec<&str> = index.split("||").filter(|s| !s.is_empty()).collect();
    types.iter().any(|t| present.contains(&t.as_str()))
}

#[async_trait]
impl VertexStore for InMemoryVertexStore {
    async fn put(&self, vertex: Vertex) -> Result<(), StoreError> {
        self.vertices.insert(vertex.id.clone(), vertex);
        Ok(())
    }

    async fn get(&self, id: &VertexId) -> Result<Vertex, StoreError> {
        self.vertices
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn query(
        &self,
        criteria: QueryCriteria,
        order_by: OrderBy,
        direction: OrderDirection,
        cursor: Option<Cursor>,
        page_size: usize,
    ) -> Result<Page, StoreError> {
        let mut matching: Vec<Vertex> = self
            .vertices
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|v| {
                criteria
                    .id_prefix
                    .as_ref()
                    .map(|p| matches_id_prefix(v, p, criteria.id_mode.unwrap_or(IdMode::Id)))
                    .unwrap_or(true)
            })
            .filter(|v| matches_resource_types(v, &criteria.resource_types))
            .filter(|v| matches_conditions(v, &criteria.conditions))
            .collect();

        matching.sort_by(|a, b| {
            let key_a = match order_by {
                OrderBy::DateCreated => a.date_created,
                OrderBy::DateModified => a.date_modified,
            };
            let key_b = match order_by {
                OrderBy::DateCreated => b.date_created,
                OrderBy::DateModified => b.date_modified,
            };
            match direction {
                OrderDirection::Ascending => key_a.cmp(&key_b),
                OrderDirection::Descending => key_b.cmp(&key_a),
            }
            .then_with(|| a.id.cmp(&b.id))
        });

        let offset: usize = cursor
            .as_ref()
            .and_then(|c| c.0.parse().ok())
            .unwrap_or(0);

        let page: Vec<Vertex> = matching.iter().skip(offset).take(page_size).cloned().collect();
        let next_offset = offset + page.len();
        let next_cursor = if next_offset < matching.len() {
            Some(Cursor(next_offset.to_string()))
        } else {
            None
        };

        Ok(Page {
            vertices: page,
            next_cursor,
        })
    }
}

/// A non-durable [`ChangesetStore`] backed by a concurrent hash map, with a
/// per-vertex index to keep `list` cheap.
#[derive(Default)]
pub struct InMemoryChangesetStore {
    changesets: DashMap<ChangesetId, Changeset>,
    by_vertex: DashMap<VertexId, Vec<ChangesetId>>,
}

impl InMemoryChangesetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChangesetStore for InMemoryChangesetStore {
    async fn insert(&self, changeset: Changeset) -> Result<(), StoreError> {
        self.by_vertex
            .entry(changeset.vertex_id.clone())
            .or_default()
            .push(changeset.id.clone());
        self.changesets.insert(changeset.id.clone(), changeset);
        Ok(())
    }

    async fn get(&self, id: &ChangesetId) -> Result<Changeset, StoreError> {
        self.changesets
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn list(
        &self,
        vertex_id: &VertexId,
        after: Option<ChangesetId>,
        limit: usize,
    ) -> Result<Vec<Changeset>, StoreError> {
        let ids = self
            .by_vertex
            .get(vertex_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        let start = match after {
            Some(after_id) => ids.iter().position(|id| *id == after_id).map(|i| i + 1).unwrap_or(0),
            None => 0,
        };

        Ok(ids[start..]
            .iter()
            .take(limit)
            .filter_map(|id| self.changesets.get(id).map(|e| e.value().clone()))
            .collect())
    }
}
