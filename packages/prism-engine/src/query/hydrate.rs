use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::query::{
	fields::{Field, Queryable},
	overlay::OverlayJoin,
	text::NameIndex,
};
use prism_catalog::{entity::EntityType, snapshot::CatalogSnapshot};
use prism_domain::disambiguate::{NameEntry, disambiguate};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NamedRef {
	pub id: String,
	pub name: String,
}

/// One fully hydrated result row. Relation lists are empty for entity
/// types that do not carry the relation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EntityHit {
	pub entity_type: EntityType,
	pub id: String,
	pub source_id: String,
	pub name: String,
	pub rating: Option<i16>,
	pub favorite: bool,
	pub play_count: i64,
	pub last_watched_at: Option<OffsetDateTime>,
	pub performers: Vec<NamedRef>,
	pub tags: Vec<NamedRef>,
	pub studios: Vec<NamedRef>,
}

/// Hydrate one page of entities. Display names are disambiguated within
/// the page: identical names from different sources get a source-label
/// suffix, except the default source which keeps the bare name.
pub(crate) fn hydrate_page<T>(
	page: &[&T],
	snapshot: &CatalogSnapshot,
	names: &NameIndex<'_>,
	overlay: Option<&OverlayJoin>,
) -> Vec<EntityHit>
where
	T: Queryable,
{
	let entries = page
		.iter()
		.map(|entity| NameEntry {
			id: entity.id().to_string(),
			name: entity.name().to_string(),
			source_id: entity.source_id().to_string(),
			source_label: snapshot.source_label(entity.source_id()).to_string(),
			default_source: snapshot.is_default_source(entity.source_id()),
		})
		.collect::<Vec<_>>();
	let display_names = disambiguate(&entries);

	page.iter()
		.zip(display_names)
		.map(|(entity, name)| {
			let entity_ref = entity.entity_ref();

			EntityHit {
				entity_type: T::TYPE,
				id: entity.id().to_string(),
				source_id: entity.source_id().to_string(),
				name,
				rating: overlay.and_then(|join| join.rating(&entity_ref)),
				favorite: overlay.map(|join| join.favorite(&entity_ref)).unwrap_or(false),
				play_count: overlay.map(|join| join.play_count(&entity_ref)).unwrap_or(0),
				last_watched_at: overlay.and_then(|join| join.last_watched_at(&entity_ref)),
				performers: relation_refs(*entity, Field::Performers, names),
				tags: relation_refs(*entity, Field::Tags, names),
				studios: relation_refs(*entity, Field::Studios, names),
			}
		})
		.collect()
}

fn relation_refs<T>(entity: &T, field: Field, names: &NameIndex<'_>) -> Vec<NamedRef>
where
	T: Queryable,
{
	if !T::supports(field) {
		return Vec::new();
	}

	let Some(ids) = entity.id_set_field(field) else { return Vec::new() };

	ids.iter()
		.map(|id| NamedRef {
			id: id.clone(),
			name: names
				.relation_name(field, entity.source_id(), id)
				.unwrap_or(id.as_str())
				.to_string(),
		})
		.collect()
}
