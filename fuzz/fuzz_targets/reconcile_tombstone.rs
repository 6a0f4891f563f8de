#![no_main]

use aig_core::domain::Alias;
use aig_core::reconcile::reconcile;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, arbitrary::Arbitrary)]
struct FuzzAlias {
    id: String,
    deleted: bool,
}

fn to_alias(f: FuzzAlias, now: chrono::DateTime<chrono::Utc>) -> Alias {
    Alias {
        id: f.id,
        date_created: now,
        date_modified: None,
        date_deleted: if f.deleted { Some(now) } else { None },
        annotation_object: None,
        alias_format: None,
    }
}

#[derive(Debug, arbitrary::Arbitrary)]
struct Input {
    prior: Vec<FuzzAlias>,
    desired: Vec<FuzzAlias>,
}

fuzz_target!(|input: Input| {
    let now = chrono::Utc::now();
    let prior: Vec<Alias> = input.prior.into_iter().map(|f| to_alias(f, now)).collect();
    let desired: Vec<Alias> = input
        .desired
        .into_iter()
        .map(|f| to_alias(f, now))
        .collect();

    if let Ok(next) = reconcile(prior, desired, now) {
        // Among live (non-deleted) entries, ids must be unique.
        let mut live_ids = std::collections::HashSet::new();
        for a in &next {
            if a.date_deleted.is_none() {
                assert!(live_ids.insert(a.id.clone()), "duplicate live id after reconcile");
            }
        }
    }
});
