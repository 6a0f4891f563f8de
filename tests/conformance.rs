//! End-to-end scenarios exercising `AuditEngine` against the in-memory
//! reference collaborators.

use aig_core::assembly::in_memory_engine;
use aig_core::domain::{Alias, VerificationFailure};
use aig_core::engine::{DesiredVertex, GetOptions, VerifyDepth};
use aig_core::patch::PatchOp;
use chrono::Utc;
use serde_json::json;

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

// S1: creating a vertex with no content yields an empty vertex and a
// single, empty-patch changeset.
#[tokio::test]
async fn s1_create_with_no_content() {
    let engine = in_memory_engine();
    let id = engine
        .create(DesiredVertex::default(), "user-1".into(), "node-1".into())
        .await
        .unwrap();

    let projected = engine
        .get(
            &id,
            GetOptions {
                include_changesets: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(projected.vertex.aliases.is_empty());
    assert_eq!(projected.vertex.date_created, projected.vertex.date_modified);
    let changesets = projected.changesets.unwrap();
    assert_eq!(changesets.len(), 1);
    assert!(changesets[0].changeset.patches.is_empty());
}

// S2: creating with two aliases preserves order and builds the alias index.
#[tokio::test]
async fn s2_create_with_two_aliases() {
    let engine = in_memory_engine();
    let desired = DesiredVertex {
        aliases: vec![alias("foo123"), alias("bar456")],
        ..Default::default()
    };
    let id = engine.create(desired, "user-1".into(), "node-1".into()).await.unwrap();

    let projected = engine.get(&id, GetOptions::default()).await.unwrap();
    assert_eq!(projected.vertex.aliases.len(), 2);
    assert_eq!(projected.vertex.aliases[0].id, "foo123");
    assert_eq!(projected.vertex.aliases[1].id, "bar456");
    assert_eq!(projected.vertex.alias_index(), "foo123||bar456");
}

// S3: replacing an alias tombstones the old one and appends the new one;
// the old id remains present (soft-deleted) in storage.
#[tokio::test]
async fn s3_update_replaces_alias() {
    let engine = in_memory_engine();
    let id = engine
        .create(
            DesiredVertex {
                aliases: vec![alias("foo123"), alias("bar456")],
                ..Default::default()
            },
            "user-1".into(),
            "node-1".into(),
        )
        .await
        .unwrap();

    engine
        .update(
            &id,
            DesiredVertex {
                aliases: vec![alias("bar456"), alias("foo321")],
                ..Default::default()
            },
            "user-1".into(),
        )
        .await
        .unwrap();

    let projected = engine
        .get(
            &id,
            GetOptions {
                include_deleted: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(projected.vertex.aliases.len(), 3);
    assert_eq!(projected.vertex.aliases[0].id, "foo123");
    assert!(projected.vertex.aliases[0].date_deleted.is_some());
    assert_eq!(projected.vertex.aliases[1].id, "bar456");
    assert!(projected.vertex.aliases[1].date_deleted.is_none());
    assert_eq!(projected.vertex.aliases[2].id, "foo321");

    let live = engine.get(&id, GetOptions::default()).await.unwrap();
    assert_eq!(live.vertex.aliases.len(), 2);
}

// S4: a content-only update against the annotation object produces a
// single replace patch and bumps dateModified.
#[tokio::test]
async fn s4_content_only_update() {
    let engine = in_memory_engine();
    let id = engine
        .create(
            DesiredVertex {
                annotation_object: Some(json!({"content": "v1"})),
                ..Default::default()
            },
            "user-1".into(),
            "node-1".into(),
        )
        .await
        .unwrap();
    let before = engine.get(&id, GetOptions::default()).await.unwrap();

    engine
        .update(
            &id,
            DesiredVertex {
                annotation_object: Some(json!({"content": "v2"})),
                ..Default::default()
            },
            "user-1".into(),
        )
        .await
        .unwrap();

    let after = engine.get(&id, GetOptions::default()).await.unwrap();
    assert_eq!(after.vertex.annotation_object, Some(json!({"content": "v2"})));
    assert!(after.vertex.date_modified >= before.vertex.date_modified);
}

// S5: a no-op update produces an empty patch list and leaves dateModified
// unchanged, but still records a changeset.
#[tokio::test]
async fn s5_no_op_update_leaves_vertex_unchanged() {
    let engine = in_memory_engine();
    let desired = DesiredVertex {
        annotation_object: Some(json!({"content": "same"})),
        aliases: vec![alias("foo")],
        ..Default::default()
    };
    let id = engine
        .create(desired.clone(), "user-1".into(), "node-1".into())
        .await
        .unwrap();
    let before = engine.get(&id, GetOptions::default()).await.unwrap();

    engine.update(&id, desired, "user-1".into()).await.unwrap();

    let after = engine
        .get(
            &id,
            GetOptions {
                include_changesets: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(after.vertex.date_modified, before.vertex.date_modified);
    let changesets = after.changesets.unwrap();
    assert_eq!(changesets.len(), 2);
    assert!(changesets[1].changeset.patches.is_empty());
}

// S6: after removeVerifiable, every changeset's proof is reported missing
// and the vertex's overall verified flag is false.
#[tokio::test]
async fn s6_remove_verifiable_makes_every_changeset_unverifiable() {
    let engine = in_memory_engine();
    let id = engine
        .create(DesiredVertex::default(), "user-1".into(), "node-1".into())
        .await
        .unwrap();
    engine
        .update(&id, DesiredVertex::default(), "user-1".into())
        .await
        .unwrap();

    engine.remove_verifiable(&id).await.unwrap();

    let projected = engine
        .get(
            &id,
            GetOptions {
                verify_depth: VerifyDepth::All,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(projected.verified, Some(false));
    for cs in projected.changesets.unwrap() {
        assert_eq!(
            cs.verification.unwrap().failure,
            Some(VerificationFailure::ProofMissing)
        );
    }
}

// S7: querying by alias prefix only returns vertices whose live alias
// index matches.
#[tokio::test]
async fn s7_query_by_alias_prefix() {
    use aig_core::query::{OrderDirectionOption, OutputShape, QueryOptions};
    use aig_core::store::IdMode;
    use aig_core::types::Urn;

    let engine = in_memory_engine();
    let with_alias = engine
        .create(
            DesiredVertex {
                aliases: vec![alias("foo4")],
                ..Default::default()
            },
            "user-1".into(),
            "node-1".into(),
        )
        .await
        .unwrap();
    engine
        .create(DesiredVertex::default(), "user-1".into(), "node-1".into())
        .await
        .unwrap();

    let page = engine
        .query(QueryOptions {
            criteria: aig_core::store::QueryCriteria {
                id_prefix: Some("foo".into()),
                id_mode: Some(IdMode::Alias),
                ..Default::default()
            },
            direction: OrderDirectionOption::Descending,
            shape: OutputShape::Plain,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.vertices.len(), 1);
    assert_eq!(page.vertices[0]["id"], json!(Urn::vertex(&with_alias)));
}

#[tokio::test]
async fn update_of_unknown_vertex_is_not_found() {
    let engine = in_memory_engine();
    let err = engine
        .update(
            &aig_core::VertexId::generate(),
            DesiredVertex::default(),
            "user-1".into(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, aig_core::AigError::NotFound));
}

#[tokio::test]
async fn duplicate_alias_ids_are_rejected_as_validation_errors() {
    let engine = in_memory_engine();
    let err = engine
        .create(
            DesiredVertex {
                aliases: vec![alias("dup"), alias("dup")],
                ..Default::default()
            },
            "user-1".into(),
            "node-1".into(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, aig_core::AigError::Validation(_)));
}

#[tokio::test]
async fn update_patches_reference_alias_path() {
    let engine = in_memory_engine();
    let id = engine
        .create(DesiredVertex::default(), "user-1".into(), "node-1".into())
        .await
        .unwrap();
    engine
        .update(
            &id,
            DesiredVertex {
                aliases: vec![alias("new")],
                ..Default::default()
            },
            "user-1".into(),
        )
        .await
        .unwrap();

    let projected = engine
        .get(
            &id,
            GetOptions {
                include_changesets: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let latest = &projected.changesets.unwrap()[1];
    assert!(latest
        .changeset
        .patches
        .iter()
        .any(|op| matches!(op, PatchOp::Add { path, .. } if path == "/aliases/-")));
}
