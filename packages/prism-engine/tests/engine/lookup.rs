use prism_catalog::entity::EntityType;
use prism_engine::{Error, GetByIdsRequest};
use prism_testkit::scene;

use super::*;

fn lookup_req(ids: &[&str]) -> GetByIdsRequest {
	GetByIdsRequest {
		entity_type: EntityType::Scene,
		user_id: "u1".to_string(),
		ids: ids.iter().map(|id| id.to_string()).collect(),
		source_hint: None,
	}
}

#[tokio::test]
async fn preserves_request_order() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![
		scene("s1", "main", "Alpha"),
		scene("s2", "main", "Beta"),
		scene("s3", "main", "Gamma"),
	];

	let harness = harness(snapshot);
	let hits = harness.engine.get_by_ids(lookup_req(&["s3", "s1"])).await.unwrap();

	assert_eq!(hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s3", "s1"]);
}

#[tokio::test]
async fn ambiguous_bare_id_errors_and_hint_resolves() {
	let mut snapshot = two_source_snapshot();

	snapshot.scenes = vec![scene("s1", "main", "Main copy"), scene("s1", "backup", "Backup copy")];

	let harness = harness(snapshot);
	let err = harness.engine.get_by_ids(lookup_req(&["s1"])).await.unwrap_err();

	match err {
		Error::AmbiguousLookup { id, matches } => {
			assert_eq!(id, "s1");
			assert_eq!(matches.len(), 2);
			assert!(matches.iter().any(|m| m.source_label == "Backup"));
		},
		other => panic!("expected AmbiguousLookup, got {other:?}"),
	}

	let mut hinted = lookup_req(&["s1"]);

	hinted.source_hint = Some("backup".to_string());

	let hits = harness.engine.get_by_ids(hinted).await.unwrap();

	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].source_id, "backup");
}

#[tokio::test]
async fn single_missing_id_is_not_found() {
	let harness = harness(base_snapshot());
	let err = harness.engine.get_by_ids(lookup_req(&["nope"])).await.unwrap_err();

	assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn invisible_ids_are_silently_dropped_in_bulk_lookups() {
	let mut snapshot = base_snapshot();
	let mut secret = scene("s_hidden", "main", "Hidden");

	secret.hidden = true;
	snapshot.scenes = vec![secret, scene("s_open", "main", "Open")];

	let harness = harness(snapshot);
	let hits = harness.engine.get_by_ids(lookup_req(&["s_hidden", "s_open"])).await.unwrap();

	assert_eq!(hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s_open"]);
}
