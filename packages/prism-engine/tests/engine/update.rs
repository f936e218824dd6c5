use serde_json::json;

use prism_catalog::entity::{EntityRef, EntityType};
use prism_engine::{
	Error, RecordWatchRequest, SetFavoriteRequest, SetRatingRequest, UpdateEntityRequest,
};
use prism_testkit::scene;

use super::*;

#[tokio::test]
async fn rating_and_favorite_writes_preserve_each_other() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![scene("s1", "main", "Alpha")];

	let harness = harness(snapshot);
	let entity = EntityRef::new("s1", "main");

	harness
		.engine
		.set_rating(SetRatingRequest {
			user_id: "u1".to_string(),
			entity_type: EntityType::Scene,
			entity: entity.clone(),
			rating: Some(80),
		})
		.await
		.unwrap();
	harness
		.engine
		.set_favorite(SetFavoriteRequest {
			user_id: "u1".to_string(),
			entity_type: EntityType::Scene,
			entity: entity.clone(),
			favorite: true,
		})
		.await
		.unwrap();
	harness
		.engine
		.record_watch(RecordWatchRequest {
			user_id: "u1".to_string(),
			entity_type: EntityType::Scene,
			entity,
		})
		.await
		.unwrap();

	let result = harness.engine.query(query_req(EntityType::Scene, "u1")).await.unwrap();

	assert_eq!(result.hits[0].rating, Some(80));
	assert!(result.hits[0].favorite);
	assert_eq!(result.hits[0].play_count, 1);
	assert!(result.hits[0].last_watched_at.is_some());
}

#[tokio::test]
async fn rating_out_of_range_is_rejected() {
	let harness = harness(base_snapshot());
	let err = harness
		.engine
		.set_rating(SetRatingRequest {
			user_id: "u1".to_string(),
			entity_type: EntityType::Scene,
			entity: EntityRef::new("s1", "main"),
			rating: Some(150),
		})
		.await
		.unwrap_err();

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn entity_updates_are_forwarded_upstream() {
	let harness = harness(base_snapshot());

	harness
		.engine
		.update_entity(UpdateEntityRequest {
			user_id: "u1".to_string(),
			entity_type: EntityType::Scene,
			entity: EntityRef::new("s1", "main"),
			fields: json!({ "title": "Renamed" }),
		})
		.await
		.unwrap();

	let updates = harness.catalog.recorded_updates();

	assert_eq!(updates.len(), 1);
	assert_eq!(updates[0].entity.id, "s1");
	assert_eq!(updates[0].fields["title"], "Renamed");
}

#[tokio::test]
async fn empty_update_payload_is_rejected() {
	let harness = harness(base_snapshot());
	let err = harness
		.engine
		.update_entity(UpdateEntityRequest {
			user_id: "u1".to_string(),
			entity_type: EntityType::Scene,
			entity: EntityRef::new("s1", "main"),
			fields: json!({}),
		})
		.await
		.unwrap_err();

	assert!(matches!(err, Error::InvalidRequest { .. }));
}
