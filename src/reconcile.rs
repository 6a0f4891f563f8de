//! Merges a caller-supplied desired array of child elements (aliases,
//! resources or edges) against the prior stored array, preserving
//! tombstones and never resurrecting a deleted id.

use std::collections::{HashMap, HashSet};

use crate::canonical::canonical_eq;
use crate::domain::ChildElement;
use crate::error::AigError;
use crate::types::Timestamp;

/// Reconciles one child-element array.
///
/// `desired` elements are matched against `prior` by id. An id present in
/// `prior` (live) but absent from `desired` is tombstoned. An id present in
/// both with a different canonical payload gets its payload overwritten and
/// `dateModified` stamped. An id only in `desired` is appended as fresh, in
/// the order it appeared in `desired`, even if a tombstoned element with the
/// same id already exists in `prior` — its `dateCreated` is stamped to `now`
/// rather than trusted from the caller, so a desired element can't backdate
/// its own audit trail.
///
/// Errors with [`AigError::Validation`] if `desired` contains the same id
/// twice.
pub fn reconcile<T: ChildElement>(
    prior: Vec<T>,
    desired: Vec<T>,
    now: Timestamp,
) -> Result<Vec<T>, AigError> {
    let mut seen = HashSet::new();
    for d in &desired {
        if !seen.insert(d.id().to_string()) {
            return Err(AigError::Validation(format!(
                "duplicate id {:?} in desired element array",
                d.id()
            )));
        }
    }

    let fresh_order: Vec<String> = desired.iter().map(|d| d.id().to_string()).collect();
    let mut desired_by_id: HashMap<String, T> = desired
        .into_iter()
        .map(|d| (d.id().to_string(), d))
        .collect();

    let mut next: Vec<T> = Vec::with_capacity(prior.len());
    for mut p in prior {
        if p.date_deleted().is_some() {
            next.push(p);
            continue;
        }
        match desired_by_id.remove(p.id()) {
            None => {
                tracing::debug!(id = %p.id(), "reconciler: tombstoning vanished element");
                p.set_date_deleted(now);
                next.push(p);
            }
            Some(d) => {
                if !canonical_eq(&p.payload(), &d.payload()) {
                    tracing::debug!(id = %p.id(), "reconciler: content update");
                    p.set_payload(d.payload());
                    p.set_date_modified(now);
                }
                next.push(p);
            }
        }
    }

    for id in fresh_order {
        if let Some(mut d) = desired_by_id.remove(&id) {
            tracing::debug!(%id, "reconciler: fresh append");
            d.set_date_created(now);
            next.push(d);
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Alias;
    use chrono::Utc;

    fn alias(id: &str) -> Alias {
        Alias {
            id: id.to_string(),
            date_created: Utc::now(),
            date_modified: None,
            date_deleted: None,
            annotation_object: None,
            alias_format: None,
        }
    }

    #[test]
    fn vanished_id_is_tombstoned_not_removed() {
        let now = Utc::now();
        let prior = vec![alias("foo")];
        let next = reconcile(prior, vec![], now).unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].date_deleted, Some(now));
    }

    #[test]
    fn resurrecting_a_tombstoned_id_appends_a_new_element() {
        let now = Utc::now();
        let mut tombstoned = alias("foo");
        tombstoned.date_deleted = Some(now);
        let prior = vec![tombstoned.clone()];
        let next = reconcile(prior, vec![alias("foo")], now).unwrap();
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].date_deleted, Some(now));
        assert!(next[1].date_deleted.is_none());
    }

    #[test]
    fn unchanged_payload_is_a_no_op() {
        let now = Utc::now();
        let a = alias("foo");
        let prior = vec![a.clone()];
        let next = reconcile(prior, vec![a], now).unwrap();
        assert_eq!(next[0].date_modified, None);
    }

    #[test]
    fn duplicate_desired_ids_are_rejected() {
        let now = Utc::now();
        let err = reconcile(vec![], vec![alias("foo"), alias("foo")], now).unwrap_err();
        assert!(matches!(err, AigError::Validation(_)));
    }

    #[test]
    fn fresh_append_stamps_date_created_to_now_not_caller_supplied_value() {
        let now = Utc::now();
        let mut backdated = alias("foo");
        backdated.date_created = now - chrono::Duration::days(365);
        let next = reconcile(vec![], vec![backdated], now).unwrap();
        assert_eq!(next[0].date_created, now);
        assert_eq!(next[0].date_modified, None);
    }

    #[test]
    fn fresh_append_preserves_existing_live_order_first() {
        let now = Utc::now();
        let prior = vec![alias("a")];
        let next = reconcile(prior, vec![alias("a"), alias("b")], now).unwrap();
        assert_eq!(next[0].id, "a");
        assert_eq!(next[1].id, "b");
    }
}
