#![no_main]

use aig_core::patch::{apply, diff};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, arbitrary::Arbitrary)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Array(Vec<FuzzValue>),
    Object(Vec<(String, FuzzValue)>),
}

impl From<FuzzValue> for serde_json::Value {
    fn from(v: FuzzValue) -> Self {
        match v {
            FuzzValue::Null => serde_json::Value::Null,
            FuzzValue::Bool(b) => serde_json::Value::Bool(b),
            FuzzValue::Int(i) => serde_json::json!(i),
            FuzzValue::Str(s) => serde_json::Value::String(s),
            FuzzValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            FuzzValue::Object(entries) => {
                let mut map = serde_json::Map::new();
                for (k, v) in entries {
                    map.insert(k, v.into());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

#[derive(Debug, arbitrary::Arbitrary)]
struct Input {
    prior: FuzzValue,
    proposed: FuzzValue,
}

fuzz_target!(|input: Input| {
    let prior: serde_json::Value = input.prior.into();
    let proposed: serde_json::Value = input.proposed.into();

    let patch = diff(&prior, &proposed);
    if let Ok(applied) = apply(&patch, &prior) {
        assert!(aig_core::canonical::canonical_eq(&applied, &proposed));
    }
});
