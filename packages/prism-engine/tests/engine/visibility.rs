use prism_catalog::{
	entity::EntityType,
	overlay::{Restriction, RestrictionMode, UserProfile},
};
use prism_testkit::{performer, scene, studio, tag};

use super::*;

#[tokio::test]
async fn hidden_entities_are_excluded_for_everyone() {
	let mut snapshot = base_snapshot();
	let mut secret = scene("s_hidden", "main", "Hidden");

	secret.hidden = true;
	snapshot.scenes = vec![secret, scene("s_open", "main", "Open")];

	let harness = harness(snapshot);

	harness.overlay.set_profile(UserProfile { user_id: "admin".to_string(), elevated: true });

	for user in ["viewer", "admin"] {
		let result = harness.engine.query(query_req(EntityType::Scene, user)).await.unwrap();

		assert_eq!(
			result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(),
			["s_open"],
			"hidden scene leaked for {user}",
		);
	}
}

#[tokio::test]
async fn include_restriction_keeps_only_listed_ids() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![
		scene("s1", "main", "Alpha"),
		scene("s2", "main", "Beta"),
		scene("s3", "main", "Gamma"),
	];

	let harness = harness(snapshot);

	harness.overlay.set_restriction(
		"u1",
		EntityType::Scene,
		Restriction { mode: RestrictionMode::Include, ids: vec!["s2".to_string()] },
	);

	let result = harness.engine.query(query_req(EntityType::Scene, "u1")).await.unwrap();

	assert_eq!(result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s2"]);
}

#[tokio::test]
async fn exclude_restriction_removes_listed_ids() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![scene("s1", "main", "Alpha"), scene("s2", "main", "Beta")];

	let harness = harness(snapshot);

	harness.overlay.set_restriction(
		"u1",
		EntityType::Scene,
		Restriction { mode: RestrictionMode::Exclude, ids: vec!["s1".to_string()] },
	);

	let result = harness.engine.query(query_req(EntityType::Scene, "u1")).await.unwrap();

	assert_eq!(result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s2"]);
}

#[tokio::test]
async fn elevated_users_skip_restrictions_only() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![scene("s1", "main", "Alpha"), scene("s2", "main", "Beta")];

	let harness = harness(snapshot);

	harness.overlay.set_profile(UserProfile { user_id: "admin".to_string(), elevated: true });
	harness.overlay.set_restriction(
		"admin",
		EntityType::Scene,
		Restriction { mode: RestrictionMode::Exclude, ids: vec!["s1".to_string()] },
	);

	let result = harness.engine.query(query_req(EntityType::Scene, "admin")).await.unwrap();

	assert_eq!(result.total_count, 2);
}

#[tokio::test]
async fn performer_with_no_visible_content_is_excluded() {
	let mut snapshot = base_snapshot();
	let mut hidden_scene = scene("s_hidden", "main", "Hidden");
	let mut open_scene = scene("s_open", "main", "Open");

	hidden_scene.hidden = true;
	hidden_scene.performer_ids = vec!["p_gone".to_string()];
	open_scene.performer_ids = vec!["p_kept".to_string()];
	snapshot.scenes = vec![hidden_scene, open_scene];
	snapshot.performers =
		vec![performer("p_gone", "main", "Gone"), performer("p_kept", "main", "Kept")];

	let harness = harness(snapshot);
	let result = harness.engine.query(query_req(EntityType::Performer, "u1")).await.unwrap();

	assert_eq!(result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["p_kept"]);
}

#[tokio::test]
async fn emptiness_cascades_up_the_studio_tree() {
	let mut snapshot = base_snapshot();
	let mut orphan_child = studio("st_orphan", "main", "Orphan child");
	let mut kept_child = studio("st_kept", "main", "Kept child");

	orphan_child.parent_ids = vec!["st_orphan_parent".to_string()];
	kept_child.parent_ids = vec!["st_kept_parent".to_string()];
	snapshot.studios = vec![
		orphan_child,
		studio("st_orphan_parent", "main", "Orphan parent"),
		kept_child,
		studio("st_kept_parent", "main", "Kept parent"),
	];

	let mut hidden_scene = scene("s_hidden", "main", "Hidden");
	let mut open_scene = scene("s_open", "main", "Open");

	hidden_scene.hidden = true;
	hidden_scene.studio_id = Some("st_orphan".to_string());
	open_scene.studio_id = Some("st_kept".to_string());
	snapshot.scenes = vec![hidden_scene, open_scene];

	let harness = harness(snapshot);
	let result = harness.engine.query(query_req(EntityType::Studio, "u1")).await.unwrap();
	let ids = result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>();

	// The kept child keeps its whole ancestor chain; the orphan chain goes.
	assert!(ids.contains(&"st_kept"));
	assert!(ids.contains(&"st_kept_parent"));
	assert!(!ids.contains(&"st_orphan"));
	assert!(!ids.contains(&"st_orphan_parent"));
}

#[tokio::test]
async fn tags_on_visible_performers_stay_visible() {
	let mut snapshot = base_snapshot();
	let mut featured = performer("p1", "main", "Alice");

	featured.tag_ids = vec!["t_style".to_string()];
	snapshot.performers = vec![featured];
	snapshot.tags = vec![tag("t_style", "main", "Style"), tag("t_unused", "main", "Unused")];

	let mut open_scene = scene("s_open", "main", "Open");

	open_scene.performer_ids = vec!["p1".to_string()];
	snapshot.scenes = vec![open_scene];

	let harness = harness(snapshot);
	let result = harness.engine.query(query_req(EntityType::Tag, "u1")).await.unwrap();

	assert_eq!(result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["t_style"]);
}

#[tokio::test]
async fn restricting_content_cascades_to_relations() {
	let mut snapshot = base_snapshot();
	let mut only_scene = scene("s1", "main", "Only");

	only_scene.performer_ids = vec!["p1".to_string()];
	snapshot.scenes = vec![only_scene];
	snapshot.performers = vec![performer("p1", "main", "Alice")];

	let harness = harness(snapshot);

	harness.overlay.set_restriction(
		"u1",
		EntityType::Scene,
		Restriction { mode: RestrictionMode::Exclude, ids: vec!["s1".to_string()] },
	);

	let result = harness.engine.query(query_req(EntityType::Performer, "u1")).await.unwrap();

	assert_eq!(result.total_count, 0);

	// Another user without the restriction still sees the performer.
	let result = harness.engine.query(query_req(EntityType::Performer, "u2")).await.unwrap();

	assert_eq!(result.total_count, 1);
}
