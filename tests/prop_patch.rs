//! Property tests for the patch engine's round-trip law:
//! `apply(diff(a, b), a) == b` under canonical equality.

use aig_core::canonical::canonical_eq;
use aig_core::patch::{apply, diff};
use proptest::prelude::*;
use serde_json::Value;

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| serde_json::json!(n)),
        ".*".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..5).prop_map(|entries| {
                let mut map = serde_json::Map::new();
                for (k, v) in entries {
                    map.insert(k, v);
                }
                Value::Object(map)
            }),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn diff_then_apply_reconstructs_proposed(a in arb_json(), b in arb_json()) {
        let patch = diff(&a, &b);
        let applied = apply(&patch, &a).expect("a self-generated diff always applies");
        prop_assert!(canonical_eq(&applied, &b));
    }

    #[test]
    fn diff_of_equal_values_is_always_empty(v in arb_json()) {
        prop_assert!(diff(&v, &v).is_empty());
    }
}
