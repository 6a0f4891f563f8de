//! Shared primitive types used across the crate: opaque hex-encoded
//! identifiers, the JSON value alias, and URN parsing for the `aig:` scheme.

use std::fmt;
use std::str::FromStr;

use crate::error::AigError;

/// Opaque JSON value. The core never interprets the contents of an
/// `annotationObject`/`resourceObject`/`edgeObject` — it only canonicalizes,
/// diffs and stores them.
pub type JsonValue = serde_json::Value;

/// UTC timestamp, millisecond precision, serialized as ISO-8601.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

fn new_hex32() -> String {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes).expect("OS entropy source must be available");
    hex::encode(bytes)
}

macro_rules! hex_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh, random 32-byte id, lowercase hex encoded.
            pub fn generate() -> Self {
                Self(new_hex32())
            }

            /// Wraps an already-hex-encoded id without validating its shape.
            ///
            /// Used by stores reconstituting ids they previously validated on
            /// the way in.
            pub fn from_hex_unchecked(hex: impl Into<String>) -> Self {
                Self(hex.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = AigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
                    Ok(Self(s.to_ascii_lowercase()))
                } else {
                    Err(AigError::NamespaceMismatch(format!(
                        "expected 32-byte lowercase hex id, got {s:?}"
                    )))
                }
            }
        }
    };
}

hex_id!(VertexId);
hex_id!(ChangesetId);
hex_id!(ProofId);

/// A parsed `aig:` URN, either naming a vertex or a vertex's changeset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Urn {
    Vertex(VertexId),
    Changeset(VertexId, ChangesetId),
}

impl Urn {
    pub fn vertex(id: &VertexId) -> String {
        format!("aig:{id}")
    }

    pub fn changeset(vertex_id: &VertexId, changeset_id: &ChangesetId) -> String {
        format!("aig:{vertex_id}:changeset:{changeset_id}")
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urn::Vertex(id) => write!(f, "aig:{id}"),
            Urn::Changeset(vertex_id, changeset_id) => {
                write!(f, "aig:{vertex_id}:changeset:{changeset_id}")
            }
        }
    }
}

impl FromStr for Urn {
    type Err = AigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("aig:")
            .ok_or_else(|| AigError::NamespaceMismatch(format!("not an aig: urn: {s:?}")))?;
        match rest.split_once(":changeset:") {
            Some((vertex, changeset)) => Ok(Urn::Changeset(
                VertexId::from_str(vertex)?,
                ChangesetId::from_str(changeset)?,
            )),
            None => Ok(Urn::Vertex(VertexId::from_str(rest)?)),
        }
    }
}
