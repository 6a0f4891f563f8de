//! RFC 6902 JSON-Patch diff/apply over [`JsonValue`], addressed with RFC
//! 6901 JSON Pointers.
//!
//! The diff policy is deliberately minimal and non-LCS: objects are diffed
//! key-by-key, arrays element-wise by index. This keeps the implementation
//! small and the output stable, at the cost of verbose patches for arrays
//! whose elements shifted position — the reconciler is the component
//! responsible for keeping child-element arrays aligned by id before a diff
//! is ever computed, so that cost never bites the vertex patch stream.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_eq;
use crate::types::JsonValue;

/// A single RFC 6902 patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    Add { path: String, value: JsonValue },
    Remove { path: String },
    Replace { path: String, value: JsonValue },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: JsonValue },
}

/// An ordered list of patch operations, as stored on a changeset.
pub type Patch = Vec<PatchOp>;

/// Error applying or addressing a patch.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum PatchError {
    #[error("json pointer {0:?} does not resolve")]
    PointerNotFound(String),
    #[error("cannot apply {op} at {path:?}: {reason}")]
    Inapplicable {
        op: &'static str,
        path: String,
        reason: String,
    },
    #[error("test operation failed at {0:?}: value mismatch")]
    TestFailed(String),
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

fn tokenize(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .split('/')
        .skip(1)
        .map(unescape_token)
        .collect()
}

fn pointer_of(segments: &[String]) -> String {
    let mut out = String::new();
    for seg in segments {
        out.push('/');
        out.push_str(&escape_token(seg));
    }
    out
}

/// Resolves a JSON Pointer against `doc`, returning a reference to the
/// pointed-at value.
pub fn resolve<'a>(doc: &'a JsonValue, pointer: &str) -> Result<&'a JsonValue, PatchError> {
    let mut current = doc;
    for token in tokenize(pointer) {
        current = match current {
            JsonValue::Object(map) => map
                .get(&token)
                .ok_or_else(|| PatchError::PointerNotFound(pointer.to_string()))?,
            JsonValue::Array(items) => {
                let idx: usize = token
                    .parse()
                    .map_err(|_| PatchError::PointerNotFound(pointer.to_string()))?;
                items
                    .get(idx)
                    .ok_or_else(|| PatchError::PointerNotFound(pointer.to_string()))?
            }
            _ => return Err(PatchError::PointerNotFound(pointer.to_string())),
        };
    }
    Ok(current)
}

fn resolve_parent_mut<'a>(
    doc: &'a mut JsonValue,
    segments: &[String],
) -> Result<&'a mut JsonValue, PatchError> {
    let mut current = doc;
    for token in &segments[..segments.len() - 1] {
        current = match current {
            JsonValue::Object(map) => map
                .get_mut(token)
                .ok_or_else(|| PatchError::PointerNotFound(pointer_of(segments)))?,
            JsonValue::Array(items) => {
                let idx: usize = token
                    .parse()
                    .map_err(|_| PatchError::PointerNotFound(pointer_of(segments)))?;
                items
                    .get_mut(idx)
                    .ok_or_else(|| PatchError::PointerNotFound(pointer_of(segments)))?
            }
            _ => return Err(PatchError::PointerNotFound(pointer_of(segments))),
        };
    }
    Ok(current)
}

fn set_at(doc: &mut JsonValue, pointer: &str, value: JsonValue) -> Result<(), PatchError> {
    let segments = tokenize(pointer);
    if segments.is_empty() {
        *doc = value;
        return Ok(());
    }
    let last = segments.last().unwrap().clone();
    let parent = resolve_parent_mut(doc, &segments)?;
    match parent {
        JsonValue::Object(map) => {
            map.insert(last, value);
            Ok(())
        }
        JsonValue::Array(items) => {
            if last == "-" {
                items.push(value);
            } else {
                let idx: usize = last.parse().map_err(|_| PatchError::Inapplicable {
                    op: "add",
                    path: pointer.to_string(),
                    reason: "array index is not a number".into(),
                })?;
                if idx > items.len() {
                    return Err(PatchError::Inapplicable {
                        op: "add",
                        path: pointer.to_string(),
                        reason: "array index out of bounds".into(),
                    });
                }
                items.insert(idx, value);
            }
            Ok(())
        }
        _ => Err(PatchError::Inapplicable {
            op: "add",
            path: pointer.to_string(),
            reason: "parent is not a container".into(),
        }),
    }
}

fn replace_at(doc: &mut JsonValue, pointer: &str, value: JsonValue) -> Result<(), PatchError> {
    let segments = tokenize(pointer);
    if segments.is_empty() {
        *doc = value;
        return Ok(());
    }
    let last = segments.last().unwrap().clone();
    let parent = resolve_parent_mut(doc, &segments)?;
    match parent {
        JsonValue::Object(map) => {
            if !map.contains_key(&last) {
                return Err(PatchError::PointerNotFound(pointer.to_string()));
            }
            map.insert(last, value);
            Ok(())
        }
        JsonValue::Array(items) => {
            let idx: usize = last.parse().map_err(|_| PatchError::Inapplicable {
                op: "replace",
                path: pointer.to_string(),
                reason: "array index is not a number".into(),
            })?;
            if idx >= items.len() {
                return Err(PatchError::PointerNotFound(pointer.to_string()));
            }
            items[idx] = value;
            Ok(())
        }
        _ => Err(PatchError::Inapplicable {
            op: "replace",
            path: pointer.to_string(),
            reason: "parent is not a container".into(),
        }),
    }
}

fn remove_at(doc: &mut JsonValue, pointer: &str) -> Result<JsonValue, PatchError> {
    let segments = tokenize(pointer);
    if segments.is_empty() {
        return Err(PatchError::Inapplicable {
            op: "remove",
            path: pointer.to_string(),
            reason: "cannot remove document root".into(),
        });
    }
    let last = segments.last().unwrap().clone();
    let parent = resolve_parent_mut(doc, &segments)?;
    match parent {
        JsonValue::Object(map) => map
            .remove(&last)
            .ok_or_else(|| PatchError::PointerNotFound(pointer.to_string())),
        JsonValue::Array(items) => {
            let idx: usize = last.parse().map_err(|_| PatchError::Inapplicable {
                op: "remove",
                path: pointer.to_string(),
                reason: "array index is not a number".into(),
            })?;
            if idx >= items.len() {
                return Err(PatchError::PointerNotFound(pointer.to_string()));
            }
            Ok(items.remove(idx))
        }
        _ => Err(PatchError::Inapplicable {
            op: "remove",
            path: pointer.to_string(),
            reason: "parent is not a container".into(),
        }),
    }
}

/// Applies `patch` to `doc` in order, returning the resulting document.
pub fn apply(patch: &Patch, doc: &JsonValue) -> Result<JsonValue, PatchError> {
    let mut out = doc.clone();
    for op in patch {
        match op {
            PatchOp::Add { path, value } => set_at(&mut out, path, value.clone())?,
            PatchOp::Remove { path } => {
                remove_at(&mut out, path)?;
            }
            PatchOp::Replace { path, value } => replace_at(&mut out, path, value.clone())?,
            PatchOp::Move { from, path } => {
                let value = remove_at(&mut out, from)?;
                set_at(&mut out, path, value)?;
            }
            PatchOp::Copy { from, path } => {
                let value = resolve(&out, from)?.clone();
                set_at(&mut out, path, value)?;
            }
            PatchOp::Test { path, value } => {
                let found = resolve(&out, path)?;
                if !canonical_eq(found, value) {
                    return Err(PatchError::TestFailed(path.clone()));
                }
            }
        }
    }
    Ok(out)
}

/// Computes a minimal, stable patch turning `prior` into `proposed`.
///
/// Objects are diffed key-by-key; arrays element-wise by index with
/// `add`/`remove` padding when lengths differ; everything else not
/// canonically equal becomes a `replace`.
pub fn diff(prior: &JsonValue, proposed: &JsonValue) -> Patch {
    let mut ops = Vec::new();
    diff_at("", prior, proposed, &mut ops);
    ops
}

fn diff_at(path: &str, prior: &JsonValue, proposed: &JsonValue, ops: &mut Patch) {
    match (prior, proposed) {
        (JsonValue::Object(a), JsonValue::Object(b)) => {
            let mut keys: Vec<&String> = a.keys().chain(b.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                let child_path = format!("{path}/{}", escape_token(key));
                match (a.get(key), b.get(key)) {
                    (Some(av), Some(bv)) => diff_at(&child_path, av, bv, ops),
                    (Some(_), None) => ops.push(PatchOp::Remove { path: child_path }),
                    (None, Some(bv)) => ops.push(PatchOp::Add {
                        path: child_path,
                        value: bv.clone(),
                    }),
                    (None, None) => unreachable!(),
                }
            }
        }
        (JsonValue::Array(a), JsonValue::Array(b)) => {
            let common = a.len().min(b.len());
            for i in 0..common {
                let child_path = format!("{path}/{i}");
                diff_at(&child_path, &a[i], &b[i], ops);
            }
            if a.len() > b.len() {
                for i in (b.len()..a.len()).rev() {
                    ops.push(PatchOp::Remove {
                        path: format!("{path}/{i}"),
                    });
                }
            } else {
                for item in &b[common..] {
                    ops.push(PatchOp::Add {
                        path: format!("{path}/-"),
                        value: item.clone(),
                    });
                }
            }
        }
        (a, b) => {
            if !canonical_eq(a, b) {
                ops.push(PatchOp::Replace {
                    path: path.to_string(),
                    value: b.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn diff_of_equal_values_is_empty() {
        let v = json!({"a": 1, "b": [1, 2]});
        assert!(diff(&v, &v).is_empty());
    }

    #[test]
    fn diff_detects_added_and_removed_keys() {
        let prior = json!({"a": 1});
        let proposed = json!({"b": 2});
        let patch = diff(&prior, &proposed);
        assert_eq!(patch.len(), 2);
        assert!(patch.contains(&PatchOp::Remove { path: "/a".into() }));
        assert!(patch.contains(&PatchOp::Add {
            path: "/b".into(),
            value: json!(2)
        }));
    }

    #[test]
    fn diff_then_apply_round_trips() {
        let prior = json!({"x": {"y": 1}, "arr": [1, 2, 3]});
        let proposed = json!({"x": {"y": 2}, "arr": [1, 2], "new": true});
        let patch = diff(&prior, &proposed);
        let applied = apply(&patch, &prior).unwrap();
        assert!(canonical_eq(&applied, &proposed));
    }

    #[test]
    fn array_append_uses_dash_token() {
        let prior = json!({"items": [1]});
        let proposed = json!({"items": [1, 2]});
        let patch = diff(&prior, &proposed);
        assert_eq!(
            patch,
            vec![PatchOp::Add {
                path: "/items/-".into(),
                value: json!(2)
            }]
        );
    }

    #[test]
    fn remove_unknown_pointer_errors() {
        let doc = json!({"a": 1});
        let patch = vec![PatchOp::Remove {
            path: "/missing".into(),
        }];
        assert!(matches!(
            apply(&patch, &doc),
            Err(PatchError::PointerNotFound(_))
        ));
    }

    #[test]
    fn pointer_tokens_are_escaped() {
        let doc = json!({"a/b": 1, "c~d": 2});
        assert_eq!(resolve(&doc, "/a~1b").unwrap(), &json!(1));
        assert_eq!(resolve(&doc, "/c~0d").unwrap(), &json!(2));
    }
}
