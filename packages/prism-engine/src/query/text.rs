use ahash::AHashMap;

use crate::query::fields::{Field, Queryable};
use prism_catalog::snapshot::CatalogSnapshot;

/// Relation-name lookup for free-text search. Search matches an entity's
/// own text fields plus the names of performers, tags and studios it
/// references, keyed per source so cross-source id collisions stay apart.
pub(crate) struct NameIndex<'a> {
	performers: AHashMap<(&'a str, &'a str), &'a str>,
	tags: AHashMap<(&'a str, &'a str), &'a str>,
	studios: AHashMap<(&'a str, &'a str), &'a str>,
}

impl<'a> NameIndex<'a> {
	pub fn build(snapshot: &'a CatalogSnapshot) -> Self {
		Self {
			performers: snapshot
				.performers
				.iter()
				.map(|p| ((p.source_id.as_str(), p.id.as_str()), p.name.as_str()))
				.collect(),
			tags: snapshot
				.tags
				.iter()
				.map(|t| ((t.source_id.as_str(), t.id.as_str()), t.name.as_str()))
				.collect(),
			studios: snapshot
				.studios
				.iter()
				.map(|s| ((s.source_id.as_str(), s.id.as_str()), s.name.as_str()))
				.collect(),
		}
	}

	pub fn relation_name(&self, field: Field, source_id: &str, id: &str) -> Option<&'a str> {
		self.names_for(field).and_then(|map| map.get(&(source_id, id)).copied())
	}

	fn names_for(&self, field: Field) -> Option<&AHashMap<(&'a str, &'a str), &'a str>> {
		match field {
			Field::Performers => Some(&self.performers),
			Field::Tags => Some(&self.tags),
			Field::Studios => Some(&self.studios),
			_ => None,
		}
	}
}

const TEXT_FIELDS: [Field; 3] = [Field::Name, Field::Details, Field::Path];
const RELATION_FIELDS: [Field; 3] = [Field::Performers, Field::Tags, Field::Studios];

/// Case-insensitive substring match over the entity's haystack. The needle
/// must already be lowercased by the caller.
pub(crate) fn matches_search<T>(entity: &T, needle: &str, names: &NameIndex<'_>) -> bool
where
	T: Queryable,
{
	for field in TEXT_FIELDS {
		if T::supports(field)
			&& let Some(value) = entity.text_field(field)
			&& value.to_lowercase().contains(needle)
		{
			return true;
		}
	}

	for field in RELATION_FIELDS {
		if !T::supports(field) {
			continue;
		}

		let Some(map) = names.names_for(field) else { continue };
		let Some(ids) = entity.id_set_field(field) else { continue };

		for id in ids {
			if let Some(name) = map.get(&(entity.source_id(), id.as_str()))
				&& name.to_lowercase().contains(needle)
			{
				return true;
			}
		}
	}

	false
}
