//! Deterministic byte representation of a [`JsonValue`] (JCS-style).
//!
//! Two values that are semantically equal produce identical bytes: object
//! keys are sorted, numbers use `serde_json`'s shortest round-trip form,
//! arrays preserve caller order and no whitespace appears outside strings.
//! Used as the hashing input for proof objects and as the equality relation
//! the patch engine and reconciler diff against.

use crate::types::JsonValue;

/// Serializes `value` to its canonical byte form.
///
/// Canonicalization never fails: any [`JsonValue`] produced by `serde_json`
/// is already a valid tree of the six JSON types this function handles.
pub fn canonicalize(value: &JsonValue) -> Vec<u8> {
    let mut out = Vec::new();
    write_canonical(value, &mut out);
    out
}

/// Convenience wrapper returning the canonical form as a `String`.
///
/// # Panics
/// Panics if the canonical bytes are not valid UTF-8, which cannot happen
/// for values built from `serde_json::Value`.
pub fn canonicalize_string(value: &JsonValue) -> String {
    String::from_utf8(canonicalize(value)).expect("canonical JSON is always valid UTF-8")
}

/// Two values are canonically equal iff their canonical byte forms match.
pub fn canonical_eq(a: &JsonValue, b: &JsonValue) -> bool {
    canonicalize(a) == canonicalize(b)
}

fn write_canonical(value: &JsonValue, out: &mut Vec<u8>) {
    match value {
        JsonValue::Null => out.extend_from_slice(b"null"),
        JsonValue::Bool(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
        JsonValue::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        JsonValue::String(s) => write_json_string(s, out),
        JsonValue::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out);
            }
            out.push(b']');
        }
        JsonValue::Object(map) => {
            out.push(b'{');
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_json_string(key.as_str(), out);
                out.push(b':');
                write_canonical(map.get(key.as_str()).expect("key came from this map"), out);
            }
            out.push(b'}');
        }
    }
}

fn write_json_string(s: &str, out: &mut Vec<u8>) {
    out.push(b'"');
    for c in s.chars() {
        match c {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\u{0008}' => out.extend_from_slice(b"\\b"),
            '\u{000C}' => out.extend_from_slice(b"\\f"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\t' => out.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                out.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out.push(b'"');
}
