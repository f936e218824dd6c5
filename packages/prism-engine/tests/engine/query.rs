use prism_catalog::entity::EntityType;
use prism_domain::criterion::Modifier;
use prism_engine::{CriterionInput, Error, FilterClause};
use prism_testkit::{performer, scene, tag};

use super::*;

fn number(modifier: Modifier, value: &str) -> CriterionInput {
	CriterionInput::Number { modifier, value: Some(value.to_string()), value2: None }
}

fn id_set(modifier: Modifier, ids: &[&str], depth: i32) -> CriterionInput {
	CriterionInput::IdSet {
		modifier,
		ids: ids.iter().map(|id| id.to_string()).collect(),
		depth,
	}
}

#[tokio::test]
async fn defaults_sort_by_name_ascending() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![
		scene("s1", "main", "Gamma"),
		scene("s2", "main", "Alpha"),
		scene("s3", "main", "Beta"),
	];

	let harness = harness(snapshot);
	let result = harness.engine.query(query_req(EntityType::Scene, "u1")).await.unwrap();

	assert_eq!(result.total_count, 3);
	assert_eq!(result.per_page, 25);
	assert_eq!(
		result.hits.iter().map(|hit| hit.name.as_str()).collect::<Vec<_>>(),
		["Alpha", "Beta", "Gamma"],
	);
}

#[tokio::test]
async fn unknown_filter_field_is_rejected() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![scene("s1", "main", "Alpha")];

	let harness = harness(snapshot);
	let mut req = query_req(EntityType::Scene, "u1");

	req.filters.clauses.push(FilterClause {
		field: "bogus".to_string(),
		criterion: number(Modifier::Equals, "1"),
	});

	let err = harness.engine.query(req).await.unwrap_err();

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn unsupported_field_for_type_is_rejected() {
	let mut snapshot = base_snapshot();

	snapshot.tags = vec![tag("t1", "main", "Outdoor")];

	let harness = harness(snapshot);
	let mut req = query_req(EntityType::Tag, "u1");

	req.filters.clauses.push(FilterClause {
		field: "duration".to_string(),
		criterion: number(Modifier::GreaterThan, "10"),
	});

	let err = harness.engine.query(req).await.unwrap_err();

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn unparseable_number_criterion_is_dropped() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![scene("s1", "main", "Alpha"), scene("s2", "main", "Beta")];

	let harness = harness(snapshot);
	let mut req = query_req(EntityType::Scene, "u1");

	req.filters.clauses.push(FilterClause {
		field: "duration".to_string(),
		criterion: number(Modifier::GreaterThan, "not a number"),
	});

	let result = harness.engine.query(req).await.unwrap();

	assert_eq!(result.total_count, 2);
}

#[tokio::test]
async fn duration_comparisons_are_strict() {
	let mut snapshot = base_snapshot();
	let mut short = scene("s1", "main", "Short");
	let mut exact = scene("s2", "main", "Exact");
	let mut long = scene("s3", "main", "Long");

	short.duration_secs = 50.0;
	exact.duration_secs = 100.0;
	long.duration_secs = 150.0;
	snapshot.scenes = vec![short, exact, long];

	let harness = harness(snapshot);
	let mut req = query_req(EntityType::Scene, "u1");

	req.filters.clauses.push(FilterClause {
		field: "duration".to_string(),
		criterion: number(Modifier::GreaterThan, "100"),
	});

	let result = harness.engine.query(req).await.unwrap();

	assert_eq!(result.hits.len(), 1);
	assert_eq!(result.hits[0].id, "s3");
}

#[tokio::test]
async fn between_includes_both_bounds() {
	let mut snapshot = base_snapshot();
	let durations = [("s1", 59.0), ("s2", 60.0), ("s3", 90.0), ("s4", 120.0), ("s5", 121.0)];

	snapshot.scenes = durations
		.iter()
		.map(|(id, duration)| {
			let mut item = scene(id, "main", id);

			item.duration_secs = *duration;

			item
		})
		.collect();

	let harness = harness(snapshot);
	let mut req = query_req(EntityType::Scene, "u1");

	req.filters.clauses.push(FilterClause {
		field: "duration".to_string(),
		criterion: CriterionInput::Number {
			modifier: Modifier::Between,
			value: Some("60".to_string()),
			value2: Some("120".to_string()),
		},
	});

	let result = harness.engine.query(req).await.unwrap();

	assert_eq!(
		result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(),
		["s2", "s3", "s4"],
	);
}

#[tokio::test]
async fn tag_filter_expands_hierarchy_per_depth() {
	let mut snapshot = base_snapshot();
	let mut child = tag("t_child", "main", "Child");

	child.parent_ids = vec!["t_parent".to_string()];
	snapshot.tags = vec![tag("t_parent", "main", "Parent"), child];

	let mut on_parent = scene("s_parent", "main", "On parent");
	let mut on_child = scene("s_child", "main", "On child");

	on_parent.tag_ids = vec!["t_parent".to_string()];
	on_child.tag_ids = vec!["t_child".to_string()];
	snapshot.scenes = vec![on_parent, on_child];

	let harness = harness(snapshot);
	let mut shallow = query_req(EntityType::Scene, "u1");

	shallow.filters.clauses.push(FilterClause {
		field: "tags".to_string(),
		criterion: id_set(Modifier::Includes, &["t_parent"], 0),
	});

	let result = harness.engine.query(shallow).await.unwrap();

	assert_eq!(result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s_parent"]);

	let mut deep = query_req(EntityType::Scene, "u1");

	deep.filters.clauses.push(FilterClause {
		field: "tags".to_string(),
		criterion: id_set(Modifier::Includes, &["t_parent"], -1),
	});

	let result = harness.engine.query(deep).await.unwrap();

	assert_eq!(result.total_count, 2);
}

#[tokio::test]
async fn includes_all_requires_every_branch() {
	let mut snapshot = base_snapshot();
	let mut child = tag("t_child", "main", "Child");

	child.parent_ids = vec!["t_parent".to_string()];
	snapshot.tags =
		vec![tag("t_parent", "main", "Parent"), child, tag("t_other", "main", "Other")];

	let mut both = scene("s_both", "main", "Both");
	let mut partial = scene("s_partial", "main", "Partial");

	// The child satisfies the parent's branch only through expansion.
	both.tag_ids = vec!["t_child".to_string(), "t_other".to_string()];
	partial.tag_ids = vec!["t_child".to_string()];
	snapshot.scenes = vec![both, partial];

	let harness = harness(snapshot);
	let mut req = query_req(EntityType::Scene, "u1");

	req.filters.clauses.push(FilterClause {
		field: "tags".to_string(),
		criterion: id_set(Modifier::IncludesAll, &["t_parent", "t_other"], -1),
	});

	let result = harness.engine.query(req).await.unwrap();

	assert_eq!(result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s_both"]);
}

#[tokio::test]
async fn excludes_removes_descendant_matches() {
	let mut snapshot = base_snapshot();
	let mut child = tag("t_child", "main", "Child");

	child.parent_ids = vec!["t_parent".to_string()];
	snapshot.tags = vec![tag("t_parent", "main", "Parent"), child];

	let mut tagged = scene("s_tagged", "main", "Tagged");

	tagged.tag_ids = vec!["t_child".to_string()];
	snapshot.scenes = vec![tagged, scene("s_plain", "main", "Plain")];

	let harness = harness(snapshot);
	let mut req = query_req(EntityType::Scene, "u1");

	req.filters.clauses.push(FilterClause {
		field: "tags".to_string(),
		criterion: id_set(Modifier::Excludes, &["t_parent"], -1),
	});

	let result = harness.engine.query(req).await.unwrap();

	assert_eq!(result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s_plain"]);
}

#[tokio::test]
async fn rating_filter_reads_overlay_rows() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![scene("s1", "main", "Rated"), scene("s2", "main", "Unrated")];

	let harness = harness(snapshot);

	harness.overlay.seed_rating("u1", EntityType::Scene, rating_row("s1", "main", Some(90), false));

	let mut req = query_req(EntityType::Scene, "u1");

	req.filters.clauses.push(FilterClause {
		field: "rating".to_string(),
		criterion: number(Modifier::GreaterThan, "80"),
	});

	let result = harness.engine.query(req).await.unwrap();

	assert_eq!(result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s1"]);
	assert_eq!(result.hits[0].rating, Some(90));
}

#[tokio::test]
async fn favorite_flag_filter() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![scene("s1", "main", "Loved"), scene("s2", "main", "Other")];

	let harness = harness(snapshot);

	harness.overlay.seed_rating("u1", EntityType::Scene, rating_row("s1", "main", None, true));

	let mut req = query_req(EntityType::Scene, "u1");

	req.filters.clauses.push(FilterClause {
		field: "favorite".to_string(),
		criterion: CriterionInput::Flag { value: true },
	});

	let result = harness.engine.query(req).await.unwrap();

	assert_eq!(result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s1"]);
	assert!(result.hits[0].favorite);
}

#[tokio::test]
async fn search_text_matches_relation_names() {
	let mut snapshot = base_snapshot();
	let mut featured = scene("s1", "main", "Untitled");

	featured.performer_ids = vec!["p1".to_string()];
	snapshot.performers = vec![performer("p1", "main", "Alice Quinn")];
	snapshot.scenes = vec![featured, scene("s2", "main", "Other")];

	let harness = harness(snapshot);
	let mut req = query_req(EntityType::Scene, "u1");

	req.search_text = Some("quinn".to_string());

	let result = harness.engine.query(req).await.unwrap();

	assert_eq!(result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(), ["s1"]);
	assert_eq!(result.hits[0].performers[0].name, "Alice Quinn");
}

#[tokio::test]
async fn random_sort_paginates_without_repeats_or_skips() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = (1..=6).map(|n| scene(&format!("s{n}"), "main", &format!("Scene {n}"))).collect();

	let harness = harness(snapshot);
	let mut seen = Vec::new();

	for page in 1..=3 {
		let mut req = query_req(EntityType::Scene, "u1");

		req.sort = Some("random_42".to_string());
		req.page = page;
		req.per_page = Some(2);

		let result = harness.engine.query(req).await.unwrap();

		assert_eq!(result.hits.len(), 2);

		seen.extend(result.hits.iter().map(|hit| hit.id.clone()));
	}

	let mut unique = seen.clone();

	unique.sort();
	unique.dedup();

	assert_eq!(unique.len(), 6);

	// Re-reading a page yields the same slice of the same ordering.
	let mut req = query_req(EntityType::Scene, "u1");

	req.sort = Some("random_42".to_string());
	req.page = 2;
	req.per_page = Some(2);

	let result = harness.engine.query(req).await.unwrap();

	assert_eq!(
		result.hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>(),
		[seen[2].as_str(), seen[3].as_str()],
	);
}

#[tokio::test]
async fn descending_sort_prefix() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![
		scene("s1", "main", "Alpha"),
		scene("s2", "main", "Beta"),
		scene("s3", "main", "Gamma"),
	];

	let harness = harness(snapshot);
	let mut req = query_req(EntityType::Scene, "u1");

	req.sort = Some("-name".to_string());

	let result = harness.engine.query(req).await.unwrap();

	assert_eq!(
		result.hits.iter().map(|hit| hit.name.as_str()).collect::<Vec<_>>(),
		["Gamma", "Beta", "Alpha"],
	);
}

#[tokio::test]
async fn page_bounds_are_validated() {
	let harness = harness(base_snapshot());
	let mut zero_page = query_req(EntityType::Scene, "u1");

	zero_page.page = 0;

	assert!(matches!(
		harness.engine.query(zero_page).await.unwrap_err(),
		Error::InvalidRequest { .. },
	));

	let mut oversized = query_req(EntityType::Scene, "u1");

	oversized.per_page = Some(100_000);

	assert!(matches!(
		harness.engine.query(oversized).await.unwrap_err(),
		Error::InvalidRequest { .. },
	));
}

#[tokio::test]
async fn cross_source_display_names_are_disambiguated() {
	let mut snapshot = two_source_snapshot();

	snapshot.performers =
		vec![performer("p1", "main", "Alice"), performer("p9", "backup", "Alice")];

	let mut on_main = scene("s1", "main", "Main scene");
	let mut on_backup = scene("s9", "backup", "Backup scene");

	on_main.performer_ids = vec!["p1".to_string()];
	on_backup.performer_ids = vec!["p9".to_string()];
	snapshot.scenes = vec![on_main, on_backup];

	let harness = harness(snapshot);
	let result = harness.engine.query(query_req(EntityType::Performer, "u1")).await.unwrap();
	let names = result.hits.iter().map(|hit| hit.name.as_str()).collect::<Vec<_>>();

	assert!(names.contains(&"Alice"));
	assert!(names.contains(&"Alice (Backup)"));
}

#[tokio::test]
async fn snapshot_refresh_follows_version_signal() {
	let mut snapshot = base_snapshot();

	snapshot.scenes = vec![scene("s1", "main", "Alpha")];

	let harness = harness(snapshot);
	let result = harness.engine.query(query_req(EntityType::Scene, "u1")).await.unwrap();

	assert_eq!(result.total_count, 1);

	let mut refreshed = base_snapshot();

	refreshed.version = 2;
	refreshed.scenes = vec![scene("s1", "main", "Alpha"), scene("s2", "main", "Beta")];
	harness.catalog.replace_snapshot(refreshed);

	let result = harness.engine.query(query_req(EntityType::Scene, "u1")).await.unwrap();

	assert_eq!(result.total_count, 2);
}
