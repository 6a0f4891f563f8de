//! The vertex aggregate and its child elements (aliases, resources, edges).

use serde::{Deserialize, Serialize};

use crate::types::{JsonValue, Timestamp, VertexId};

/// Marker trait for the three child-element kinds a vertex carries.
///
/// The reconciler (`crate::reconcile`) is generic over this trait: it knows
/// how to soft-delete, content-update and append elements without caring
/// whether it is looking at an alias, a resource or an edge.
pub trait ChildElement: Clone {
    fn id(&self) -> &str;
    fn date_created(&self) -> Timestamp;
    fn date_deleted(&self) -> Option<Timestamp>;
    fn set_date_created(&mut self, at: Timestamp);
    fn set_date_deleted(&mut self, at: Timestamp);
    fn set_date_modified(&mut self, at: Timestamp);

    /// The mutable payload fields, compared for content-equality under
    /// canonical JSON and overwritten in place on change. Excludes the
    /// bookkeeping timestamps.
    fn payload(&self) -> JsonValue;
    fn set_payload(&mut self, payload: JsonValue);
}

/// A caller-chosen alternative identifier for a vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub id: String,
    pub date_created: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_deleted: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_object: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_format: Option<String>,
}

impl ChildElement for Alias {
    fn id(&self) -> &str {
        &self.id
    }
    fn date_created(&self) -> Timestamp {
        self.date_created
    }
    fn date_deleted(&self) -> Option<Timestamp> {
        self.date_deleted
    }
    fn set_date_created(&mut self, at: Timestamp) {
        self.date_created = at;
    }
    fn set_date_deleted(&mut self, at: Timestamp) {
        self.date_deleted = Some(at);
    }
    fn set_date_modified(&mut self, at: Timestamp) {
        self.date_modified = Some(at);
    }
    fn payload(&self) -> JsonValue {
        serde_json::json!({
            "annotationObject": self.annotation_object,
            "aliasFormat": self.alias_format,
        })
    }
    fn set_payload(&mut self, payload: JsonValue) {
        self.annotation_object = payload.get("annotationObject").cloned().filter(|v| !v.is_null());
        self.alias_format = payload
            .get("aliasFormat")
            .and_then(|v| v.as_str())
            .map(String::from);
    }
}

/// An attached sub-document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub date_created: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_deleted: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_object: Option<JsonValue>,
}

impl ChildElement for Resource {
    fn id(&self) -> &str {
        &self.id
    }
    fn date_created(&self) -> Timestamp {
        self.date_created
    }
    fn date_deleted(&self) -> Option<Timestamp> {
        self.date_deleted
    }
    fn set_date_created(&mut self, at: Timestamp) {
        self.date_created = at;
    }
    fn set_date_deleted(&mut self, at: Timestamp) {
        self.date_deleted = Some(at);
    }
    fn set_date_modified(&mut self, at: Timestamp) {
        self.date_modified = Some(at);
    }
    fn payload(&self) -> JsonValue {
        serde_json::json!({ "resourceObject": self.resource_object })
    }
    fn set_payload(&mut self, payload: JsonValue) {
        self.resource_object = payload.get("resourceObject").cloned().filter(|v| !v.is_null());
    }
}

/// A typed relationship to another vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub date_created: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_deleted: Option<Timestamp>,
    pub edge_relationship: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_object: Option<JsonValue>,
}

impl ChildElement for Edge {
    fn id(&self) -> &str {
        &self.id
    }
    fn date_created(&self) -> Timestamp {
        self.date_created
    }
    fn date_deleted(&self) -> Option<Timestamp> {
        self.date_deleted
    }
    fn set_date_created(&mut self, at: Timestamp) {
        self.date_created = at;
    }
    fn set_date_deleted(&mut self, at: Timestamp) {
        self.date_deleted = Some(at);
    }
    fn set_date_modified(&mut self, at: Timestamp) {
        self.date_modified = Some(at);
    }
    fn payload(&self) -> JsonValue {
        serde_json::json!({
            "edgeRelationship": self.edge_relationship,
            "edgeObject": self.edge_object,
        })
    }
    fn set_payload(&mut self, payload: JsonValue) {
        if let Some(rel) = payload.get("edgeRelationship").and_then(|v| v.as_str()) {
            self.edge_relationship = rel.to_string();
        }
        self.edge_object = payload.get("edgeObject").cloned().filter(|v| !v.is_null());
    }
}

/// The persisted graph vertex: identity, timestamps, free-form annotation
/// and its three child-element arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub node_identity: String,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_object: Option<JsonValue>,
    #[serde(default)]
    pub aliases: Vec<Alias>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Vertex {
    /// `||`-joined ids of non-deleted aliases, used for alias-prefix queries.
    pub fn alias_index(&self) -> String {
        self.aliases
            .iter()
            .filter(|a| a.date_deleted.is_none())
            .map(|a| a.id.as_str())
            .collect::<Vec<_>>()
            .join("||")
    }

    /// `||`-joined `@type`s of non-deleted resources, used for resource-type
    /// filtering.
    pub fn resource_type_index(&self) -> String {
        self.resources
            .iter()
            .filter(|r| r.date_deleted.is_none())
            .filter_map(|r| r.resource_object.as_ref())
            .filter_map(|obj| obj.get("@type").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("||")
    }

    /// A copy of `self` with every tombstoned child element removed from
    /// each array, applied recursively (there is no nesting today, but the
    /// name documents the intended recursive-filter contract of §4.6.3).
    pub fn without_deleted(&self) -> Vertex {
        let mut v = self.clone();
        v.aliases.retain(|a| a.date_deleted.is_none());
        v.resources.retain(|r| r.date_deleted.is_none());
        v.edges.retain(|e| e.date_deleted.is_none());
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn now() -> Timestamp {
        Utc::now()
    }

    #[test]
    fn alias_index_excludes_tombstoned() {
        let mut v = Vertex {
            id: VertexId::generate(),
            node_identity: "node".into(),
            date_created: now(),
            date_modified: now(),
            annotation_object: None,
            aliases: vec![
                Alias {
                    id: "foo".into(),
                    date_created: now(),
                    date_modified: None,
                    date_deleted: None,
                    annotation_object: None,
                    alias_format: None,
                },
                Alias {
                    id: "bar".into(),
                    date_created: now(),
                    date_modified: None,
                    date_deleted: Some(now()),
                    annotation_object: None,
                    alias_format: None,
                },
            ],
            resources: vec![],
            edges: vec![],
        };
        assert_eq!(v.alias_index(), "foo");
        v.aliases[0].set_date_deleted(now());
        assert_eq!(v.alias_index(), "");
    }

    #[test]
    fn without_deleted_drops_tombstones_from_every_array() {
        let v = Vertex {
            id: VertexId::generate(),
            node_identity: "node".into(),
            date_created: now(),
            date_modified: now(),
            annotation_object: None,
            aliases: vec![Alias {
                id: "a".into(),
                date_created: now(),
                date_modified: None,
                date_deleted: Some(now()),
                annotation_object: None,
                alias_format: None,
            }],
            resources: vec![],
            edges: vec![],
        };
        assert!(v.without_deleted().aliases.is_empty());
    }
}
