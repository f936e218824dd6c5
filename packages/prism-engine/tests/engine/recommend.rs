use time::OffsetDateTime;

use prism_catalog::entity::EntityType;
use prism_engine::{Error, RecommendRequest, RecommendedResponse, SimilarRequest};
use prism_testkit::{performer, scene};

use super::*;

fn recommend_req(user_id: &str) -> RecommendRequest {
	RecommendRequest { user_id: user_id.to_string(), page: 1, per_page: None }
}

fn similar_req(entity_id: &str) -> SimilarRequest {
	SimilarRequest {
		entity_type: EntityType::Scene,
		entity_id: entity_id.to_string(),
		source_hint: None,
		user_id: "u1".to_string(),
		page: 1,
		per_page: None,
	}
}

#[tokio::test]
async fn no_evidence_yields_empty_with_reason() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![scene("s1", "main", "Alpha")];

	let harness = harness(snapshot);
	let response = harness.engine.recommended_for(recommend_req("u1")).await.unwrap();

	match response {
		RecommendedResponse::Empty { reason } => assert!(!reason.is_empty()),
		RecommendedResponse::Page(_) => panic!("expected empty response without evidence"),
	}
}

#[tokio::test]
async fn favorited_performer_lifts_their_scenes() {
	let mut snapshot = base_snapshot();
	let mut with_performer = scene("s_with", "main", "Featuring Alice");
	let plain = scene("s_plain", "main", "Plain");

	with_performer.performer_ids = vec!["p1".to_string()];
	snapshot.performers = vec![performer("p1", "main", "Alice")];
	snapshot.scenes = vec![with_performer, plain];

	let harness = harness(snapshot);

	harness.overlay.seed_rating("u1", EntityType::Performer, rating_row("p1", "main", None, true));

	let response = harness.engine.recommended_for(recommend_req("u1")).await.unwrap();
	let RecommendedResponse::Page(page) = response else {
		panic!("expected a ranked page");
	};

	assert_eq!(page.total_count, 2);
	assert_eq!(page.hits[0].id, "s_with");
}

#[tokio::test]
async fn high_rated_scenes_spread_weight_onto_relations() {
	let mut snapshot = base_snapshot();
	let mut rated = scene("s_rated", "main", "Rated");
	let mut same_cast = scene("s_same_cast", "main", "Same cast");
	let other = scene("s_other", "main", "Other");

	rated.performer_ids = vec!["p1".to_string()];
	same_cast.performer_ids = vec!["p1".to_string()];
	snapshot.performers = vec![performer("p1", "main", "Alice")];
	snapshot.scenes = vec![rated, same_cast, other];

	let harness = harness(snapshot);

	harness.overlay.seed_rating("u1", EntityType::Scene, rating_row("s_rated", "main", Some(90), false));

	let response = harness.engine.recommended_for(recommend_req("u1")).await.unwrap();
	let RecommendedResponse::Page(page) = response else {
		panic!("expected a ranked page");
	};

	// Both performer-sharing scenes outrank the unrelated one.
	let position = |id: &str| page.hits.iter().position(|hit| hit.id == id).unwrap();

	assert!(position("s_other") > position("s_same_cast"));
	assert!(position("s_other") > position("s_rated"));
}

#[tokio::test]
async fn recently_watched_scenes_are_pushed_down() {
	let mut snapshot = base_snapshot();
	let mut watched = scene("s_watched", "main", "Watched");
	let mut fresh = scene("s_fresh", "main", "Fresh");

	watched.performer_ids = vec!["p1".to_string()];
	fresh.performer_ids = vec!["p1".to_string()];
	snapshot.performers = vec![performer("p1", "main", "Alice")];
	snapshot.scenes = vec![watched, fresh];

	let harness = harness(snapshot);

	harness.overlay.seed_rating("u1", EntityType::Performer, rating_row("p1", "main", None, true));
	harness.overlay.seed_watch(
		"u1",
		EntityType::Scene,
		watch_row(
			"s_watched",
			"main",
			1,
			Some(OffsetDateTime::now_utc() - time::Duration::hours(1)),
		),
	);

	let response = harness.engine.recommended_for(recommend_req("u1")).await.unwrap();
	let RecommendedResponse::Page(page) = response else {
		panic!("expected a ranked page");
	};

	// Within the last day the penalty outweighs the affinity, dropping the
	// watched scene from the feed entirely.
	assert_eq!(page.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s_fresh"]);
}

#[tokio::test]
async fn recommendation_pages_never_repeat() {
	let mut snapshot = base_snapshot();

	snapshot.performers = vec![performer("p1", "main", "Alice")];
	snapshot.scenes = (1..=5)
		.map(|n| {
			let mut item = scene(&format!("s{n}"), "main", &format!("Scene {n}"));

			item.performer_ids = vec!["p1".to_string()];

			item
		})
		.collect();

	let harness = harness(snapshot);

	harness.overlay.seed_rating("u1", EntityType::Performer, rating_row("p1", "main", None, true));

	let mut seen = Vec::new();

	for page_number in 1..=5 {
		let mut req = recommend_req("u1");

		req.page = page_number;
		req.per_page = Some(1);

		let RecommendedResponse::Page(page) =
			harness.engine.recommended_for(req).await.unwrap()
		else {
			panic!("expected a ranked page");
		};

		assert_eq!(page.total_count, 5);

		seen.extend(page.hits.iter().map(|hit| hit.id.clone()));
	}

	let mut unique = seen.clone();

	unique.sort();
	unique.dedup();

	assert_eq!(unique.len(), 5);
}

#[tokio::test]
async fn similar_ranks_by_shared_relations() {
	let mut snapshot = base_snapshot();
	let mut anchor = scene("s_anchor", "main", "Anchor");
	let mut close = scene("s_close", "main", "Close");
	let mut distant = scene("s_distant", "main", "Distant");
	let unrelated = scene("s_unrelated", "main", "Unrelated");

	anchor.performer_ids = vec!["p1".to_string(), "p2".to_string()];
	anchor.tag_ids = vec!["t1".to_string()];
	close.performer_ids = vec!["p1".to_string(), "p2".to_string()];
	distant.tag_ids = vec!["t1".to_string()];
	snapshot.performers = vec![performer("p1", "main", "Alice"), performer("p2", "main", "Bea")];
	snapshot.tags = vec![prism_testkit::tag("t1", "main", "Style")];
	snapshot.scenes = vec![anchor, close, distant, unrelated];

	let harness = harness(snapshot);
	let page = harness.engine.similar_to(similar_req("s_anchor")).await.unwrap();

	assert_eq!(
		page.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(),
		["s_close", "s_distant"],
	);
}

#[tokio::test]
async fn similar_pushes_recently_watched_candidates_down() {
	let mut snapshot = base_snapshot();
	let mut anchor = scene("s_anchor", "main", "Anchor");
	let mut watched = scene("s_watched", "main", "Watched");
	let mut fresh = scene("s_fresh", "main", "Fresh");

	anchor.performer_ids = vec!["p1".to_string()];
	watched.performer_ids = vec!["p1".to_string()];
	fresh.performer_ids = vec!["p1".to_string()];
	snapshot.performers = vec![performer("p1", "main", "Alice")];
	snapshot.scenes = vec![anchor, watched, fresh];

	let harness = harness(snapshot);

	harness.overlay.seed_watch(
		"u1",
		EntityType::Scene,
		watch_row(
			"s_watched",
			"main",
			1,
			Some(OffsetDateTime::now_utc() - time::Duration::hours(1)),
		),
	);

	let page = harness.engine.similar_to(similar_req("s_anchor")).await.unwrap();

	// The day-watch penalty outweighs the overlap, so only the unwatched
	// candidate survives.
	assert_eq!(page.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s_fresh"]);
}

#[tokio::test]
async fn similar_anchor_must_be_unambiguous() {
	let mut snapshot = two_source_snapshot();

	snapshot.scenes = vec![scene("s1", "main", "Main copy"), scene("s1", "backup", "Backup copy")];

	let harness = harness(snapshot);
	let err = harness.engine.similar_to(similar_req("s1")).await.unwrap_err();

	assert!(matches!(err, Error::AmbiguousLookup { .. }));

	let mut hinted = similar_req("s1");

	hinted.source_hint = Some("main".to_string());

	assert!(harness.engine.similar_to(hinted).await.is_ok());
}

#[tokio::test]
async fn similar_anchor_missing_is_not_found() {
	let harness = harness(base_snapshot());
	let err = harness.engine.similar_to(similar_req("nope")).await.unwrap_err();

	assert!(matches!(err, Error::NotFound { .. }));
}
