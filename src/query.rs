//! Read-side query options and projection shapes (§4.9).
//!
//! `AuditEngine` owns the mechanics of loading and verifying a vertex;
//! this module owns turning a loaded [`Vertex`] into the shape a caller
//! asked for — a `properties` subset, and either the plain internal shape
//! or a JSON-LD-flavoured envelope.

use serde_json::{json, Map, Value};

use crate::domain::Vertex;
use crate::store::{Condition, Cursor, OrderBy, OrderDirection, QueryCriteria};

/// The JSON-LD `@context` URI this deployment's vertices are projected
/// under. Shared with the proof-object envelope (§4.6.1 step 8) so a
/// verifier canonicalizing a changeset's proof sees the same context a
/// JSON-LD query projection would.
pub const CONTEXT_URI: &str = "https://schema.auditable-item-graph.example/v1";

/// The output shape requested for a projected vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputShape {
    /// The internal data model, largely as-is.
    #[default]
    Plain,
    /// A JSON-LD flavoured envelope with `@context`/`@type` tags.
    JsonLd,
}

/// Everything a caller can ask `query`/`get` to shape the response with.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub criteria: QueryCriteria,
    pub order_by: OrderByOption,
    pub direction: OrderDirectionOption,
    pub shape: OutputShape,
    pub properties: Option<Vec<String>>,
    pub page_size: Option<usize>,
    pub cursor: Option<Cursor>,
}

/// A page of `AuditEngine::query` results: each vertex already projected
/// into the requested [`OutputShape`], plus an opaque cursor for the next
/// page (`None` once exhausted).
#[derive(Debug, Clone)]
pub struct QueryPage {
    pub vertices: Vec<Value>,
    pub next_cursor: Option<Cursor>,
}

#[derive(Debug, Clone, Copy, Default)]
pub enum OrderByOption {
    #[default]
    DateCreated,
    DateModified,
}

impl From<OrderByOption> for OrderBy {
    fn from(value: OrderByOption) -> Self {
        match value {
            OrderByOption::DateCreated => OrderBy::DateCreated,
            OrderByOption::DateModified => OrderBy::DateModified,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub enum OrderDirectionOption {
    #[default]
    Ascending,
    Descending,
}

impl From<OrderDirectionOption> for OrderDirection {
    fn from(value: OrderDirectionOption) -> Self {
        match value {
            OrderDirectionOption::Ascending => OrderDirection::Ascending,
            OrderDirectionOption::Descending => OrderDirection::Descending,
        }
    }
}

/// Builds a [`Condition`] matching `pointer` against `expected` (already a
/// [`serde_json::Value`]).
pub fn condition(pointer: impl Into<String>, expected: Value) -> Condition {
    Condition {
        pointer: pointer.into(),
        expected,
    }
}

/// Projects `vertex` into the requested output shape, restricted to
/// `properties` if given (top-level keys only).
pub fn project(vertex: &Vertex, shape: OutputShape, properties: Option<&[String]>) -> Value {
    let full = match shape {
        OutputShape::Plain => plain_envelope(vertex),
        OutputShape::JsonLd => json_ld_envelope(vertex),
    };
    match properties {
        None => full,
        Some(keys) => restrict_to_properties(full, keys),
    }
}

fn plain_envelope(vertex: &Vertex) -> Value {
    json!({
        "id": crate::types::Urn::vertex(&vertex.id),
        "nodeIdentity": vertex.node_identity,
        "dateCreated": vertex.date_created,
        "dateModified": vertex.date_modified,
        "annotationObject": vertex.annotation_object,
        "aliases": vertex.aliases,
        "resources": vertex.resources,
        "edges": vertex.edges,
    })
}

fn json_ld_envelope(vertex: &Vertex) -> Value {
    let mut envelope = plain_envelope(vertex);
    if let Value::Object(ref mut map) = envelope {
        map.insert("@context".into(), json!([CONTEXT_URI]));
        map.insert("@type".into(), json!("AuditableItemGraphVertex"));
    }
    envelope
}

fn restrict_to_properties(full: Value, keys: &[String]) -> Value {
    let Value::Object(map) = full else { return full };
    let mut kept = Map::new();
    // The envelope tags travel with every projection regardless of the
    // caller's requested properties.
    for envelope_key in ["@context", "@type", "id"] {
        if let Some(v) = map.get(envelope_key) {
            kept.insert(envelope_key.to_string(), v.clone());
        }
    }
    for key in keys {
        if let Some(v) = map.get(key) {
            kept.insert(key.clone(), v.clone());
        }
    }
    Value::Object(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VertexId;
    use chrono::Utc;

    fn sample_vertex() -> Vertex {
        Vertex {
            id: VertexId::generate(),
            node_identity: "node".into(),
            date_created: Utc::now(),
            date_modified: Utc::now(),
            annotation_object: Some(json!({"name": "thing"})),
            aliases: vec![],
            resources: vec![],
            edges: vec![],
        }
    }

    #[test]
    fn json_ld_shape_carries_context_and_type() {
        let v = sample_vertex();
        let projected = project(&v, OutputShape::JsonLd, None);
        assert_eq!(projected["@type"], json!("AuditableItemGraphVertex"));
    }

    #[test]
    fn properties_projection_keeps_only_requested_keys_plus_envelope() {
        let v = sample_vertex();
        let projected = project(&v, OutputShape::Plain, Some(&["annotationObject".to_string()]));
        assert!(projected.get("annotationObject").is_some());
        assert!(projected.get("aliases").is_none());
        assert!(projected.get("id").is_some());
    }

    #[test]
    fn condition_helper_builds_expected_shape() {
        let c = condition("/name", json!("thing"));
        assert_eq!(c.pointer, "/name");
        assert_eq!(c.expected, json!("thing"));
    }

    #[test]
    fn order_by_option_maps_to_store_order_by() {
        let mapped: OrderBy = OrderByOption::DateModified.into();
        assert!(matches!(mapped, OrderBy::DateModified));
    }
}
