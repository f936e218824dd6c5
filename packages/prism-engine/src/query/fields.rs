use std::slice;

use time::Date;

use prism_catalog::{
	entity::{
		Collection, EntityRef, EntityType, Gallery, Image, Performer, Scene, Studio, Tag,
	},
	snapshot::CatalogSnapshot,
};

/// Closed set of filterable/sortable fields. Unknown field names fail fast
/// at the boundary instead of silently matching nothing.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Field {
	Name,
	Details,
	Path,
	Date,
	CreatedAt,
	Duration,
	Gender,
	Birthdate,
	Rating,
	Favorite,
	PlayCount,
	LastWatchedAt,
	Performers,
	Tags,
	Studios,
	Galleries,
	Scenes,
	Collections,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FieldKind {
	Number,
	Date,
	Text,
	IdSet,
	Flag,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum HierarchyKind {
	Tag,
	Studio,
}

impl Field {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"name" | "title" => Some(Self::Name),
			"details" | "description" => Some(Self::Details),
			"path" => Some(Self::Path),
			"date" => Some(Self::Date),
			"created_at" => Some(Self::CreatedAt),
			"duration" => Some(Self::Duration),
			"gender" => Some(Self::Gender),
			"birthdate" => Some(Self::Birthdate),
			"rating" => Some(Self::Rating),
			"favorite" => Some(Self::Favorite),
			"play_count" => Some(Self::PlayCount),
			"last_watched_at" => Some(Self::LastWatchedAt),
			"performers" => Some(Self::Performers),
			"tags" => Some(Self::Tags),
			"studio" | "studios" => Some(Self::Studios),
			"galleries" => Some(Self::Galleries),
			"scenes" => Some(Self::Scenes),
			"collections" => Some(Self::Collections),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Name => "name",
			Self::Details => "details",
			Self::Path => "path",
			Self::Date => "date",
			Self::CreatedAt => "created_at",
			Self::Duration => "duration",
			Self::Gender => "gender",
			Self::Birthdate => "birthdate",
			Self::Rating => "rating",
			Self::Favorite => "favorite",
			Self::PlayCount => "play_count",
			Self::LastWatchedAt => "last_watched_at",
			Self::Performers => "performers",
			Self::Tags => "tags",
			Self::Studios => "studio",
			Self::Galleries => "galleries",
			Self::Scenes => "scenes",
			Self::Collections => "collections",
		}
	}

	pub fn kind(self) -> FieldKind {
		match self {
			Self::Name | Self::Details | Self::Path | Self::Gender => FieldKind::Text,
			Self::Date | Self::CreatedAt | Self::Birthdate | Self::LastWatchedAt =>
				FieldKind::Date,
			Self::Duration | Self::Rating | Self::PlayCount => FieldKind::Number,
			Self::Favorite => FieldKind::Flag,
			Self::Performers
			| Self::Tags
			| Self::Studios
			| Self::Galleries
			| Self::Scenes
			| Self::Collections => FieldKind::IdSet,
		}
	}

	/// Fields served from engine-owned overlay rows rather than the catalog
	/// snapshot. Filtering or sorting on these is the expensive tier.
	pub fn overlay(self) -> bool {
		matches!(self, Self::Rating | Self::Favorite | Self::PlayCount | Self::LastWatchedAt)
	}

	pub fn hierarchy(self) -> Option<HierarchyKind> {
		match self {
			Self::Tags => Some(HierarchyKind::Tag),
			Self::Studios => Some(HierarchyKind::Studio),
			_ => None,
		}
	}
}

/// Typed accessor table one entity type exposes to the generic executor.
/// Accessors return `None` for fields the type does not carry; `supports`
/// is checked at the request boundary so that never happens mid-pipeline.
pub(crate) trait Queryable
where
	Self: Send + Sync,
{
	const TYPE: EntityType;

	fn items(snapshot: &CatalogSnapshot) -> &[Self]
	where
		Self: Sized;

	fn id(&self) -> &str;

	fn source_id(&self) -> &str;

	fn hidden(&self) -> bool;

	/// Canonical display name, also the deterministic sort tiebreak.
	fn name(&self) -> &str;

	fn supports(field: Field) -> bool;

	fn text_field(&self, field: Field) -> Option<&str>;

	fn number_field(&self, field: Field) -> Option<f64>;

	fn date_field(&self, field: Field) -> Option<Option<Date>>;

	fn id_set_field(&self, field: Field) -> Option<&[String]>;

	fn entity_ref(&self) -> EntityRef {
		EntityRef::new(self.id(), self.source_id())
	}
}

fn singleton(id: &Option<String>) -> Option<&[String]> {
	id.as_ref().map(slice::from_ref)
}

impl Queryable for Scene {
	const TYPE: EntityType = EntityType::Scene;

	fn items(snapshot: &CatalogSnapshot) -> &[Self] {
		&snapshot.scenes
	}

	fn id(&self) -> &str {
		&self.id
	}

	fn source_id(&self) -> &str {
		&self.source_id
	}

	fn hidden(&self) -> bool {
		self.hidden
	}

	fn name(&self) -> &str {
		&self.title
	}

	fn supports(field: Field) -> bool {
		field.overlay()
			|| matches!(
				field,
				Field::Name
					| Field::Details
					| Field::Path
					| Field::Date
					| Field::CreatedAt
					| Field::Duration
					| Field::Performers
					| Field::Tags
					| Field::Studios
					| Field::Galleries
					| Field::Collections
			)
	}

	fn text_field(&self, field: Field) -> Option<&str> {
		match field {
			Field::Name => Some(&self.title),
			Field::Details => Some(&self.details),
			Field::Path => Some(&self.path),
			_ => None,
		}
	}

	fn number_field(&self, field: Field) -> Option<f64> {
		match field {
			Field::Duration => Some(self.duration_secs),
			_ => None,
		}
	}

	fn date_field(&self, field: Field) -> Option<Option<Date>> {
		match field {
			Field::Date => Some(self.date),
			Field::CreatedAt => Some(Some(self.created_at.date())),
			_ => None,
		}
	}

	fn id_set_field(&self, field: Field) -> Option<&[String]> {
		match field {
			Field::Performers => Some(&self.performer_ids),
			Field::Tags => Some(&self.tag_ids),
			Field::Studios => singleton(&self.studio_id),
			Field::Galleries => Some(&self.gallery_ids),
			Field::Collections => Some(&self.collection_ids),
			_ => None,
		}
	}
}

impl Queryable for Performer {
	const TYPE: EntityType = EntityType::Performer;

	fn items(snapshot: &CatalogSnapshot) -> &[Self] {
		&snapshot.performers
	}

	fn id(&self) -> &str {
		&self.id
	}

	fn source_id(&self) -> &str {
		&self.source_id
	}

	fn hidden(&self) -> bool {
		self.hidden
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn supports(field: Field) -> bool {
		field.overlay()
			|| matches!(
				field,
				Field::Name | Field::Details | Field::Gender | Field::Birthdate | Field::Tags
			)
	}

	fn text_field(&self, field: Field) -> Option<&str> {
		match field {
			Field::Name => Some(&self.name),
			Field::Details => Some(&self.details),
			Field::Gender => Some(self.gender.as_deref().unwrap_or("")),
			_ => None,
		}
	}

	fn number_field(&self, _field: Field) -> Option<f64> {
		None
	}

	fn date_field(&self, field: Field) -> Option<Option<Date>> {
		match field {
			Field::Birthdate => Some(self.birthdate),
			_ => None,
		}
	}

	fn id_set_field(&self, field: Field) -> Option<&[String]> {
		match field {
			Field::Tags => Some(&self.tag_ids),
			_ => None,
		}
	}
}

impl Queryable for Studio {
	const TYPE: EntityType = EntityType::Studio;

	fn items(snapshot: &CatalogSnapshot) -> &[Self] {
		&snapshot.studios
	}

	fn id(&self) -> &str {
		&self.id
	}

	fn source_id(&self) -> &str {
		&self.source_id
	}

	fn hidden(&self) -> bool {
		self.hidden
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn supports(field: Field) -> bool {
		field.overlay() || matches!(field, Field::Name | Field::Details)
	}

	fn text_field(&self, field: Field) -> Option<&str> {
		match field {
			Field::Name => Some(&self.name),
			Field::Details => Some(&self.details),
			_ => None,
		}
	}

	fn number_field(&self, _field: Field) -> Option<f64> {
		None
	}

	fn date_field(&self, _field: Field) -> Option<Option<Date>> {
		None
	}

	fn id_set_field(&self, _field: Field) -> Option<&[String]> {
		None
	}
}

impl Queryable for Tag {
	const TYPE: EntityType = EntityType::Tag;

	fn items(snapshot: &CatalogSnapshot) -> &[Self] {
		&snapshot.tags
	}

	fn id(&self) -> &str {
		&self.id
	}

	fn source_id(&self) -> &str {
		&self.source_id
	}

	fn hidden(&self) -> bool {
		self.hidden
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn supports(field: Field) -> bool {
		field.overlay() || matches!(field, Field::Name | Field::Details)
	}

	fn text_field(&self, field: Field) -> Option<&str> {
		match field {
			Field::Name => Some(&self.name),
			Field::Details => Some(&self.description),
			_ => None,
		}
	}

	fn number_field(&self, _field: Field) -> Option<f64> {
		None
	}

	fn date_field(&self, _field: Field) -> Option<Option<Date>> {
		None
	}

	fn id_set_field(&self, _field: Field) -> Option<&[String]> {
		None
	}
}

impl Queryable for Gallery {
	const TYPE: EntityType = EntityType::Gallery;

	fn items(snapshot: &CatalogSnapshot) -> &[Self] {
		&snapshot.galleries
	}

	fn id(&self) -> &str {
		&self.id
	}

	fn source_id(&self) -> &str {
		&self.source_id
	}

	fn hidden(&self) -> bool {
		self.hidden
	}

	fn name(&self) -> &str {
		&self.title
	}

	fn supports(field: Field) -> bool {
		field.overlay()
			|| matches!(
				field,
				Field::Name
					| Field::Path | Field::Date
					| Field::Performers
					| Field::Tags | Field::Studios
					| Field::Scenes
			)
	}

	fn text_field(&self, field: Field) -> Option<&str> {
		match field {
			Field::Name => Some(&self.title),
			Field::Path => Some(&self.path),
			_ => None,
		}
	}

	fn number_field(&self, _field: Field) -> Option<f64> {
		None
	}

	fn date_field(&self, field: Field) -> Option<Option<Date>> {
		match field {
			Field::Date => Some(self.date),
			_ => None,
		}
	}

	fn id_set_field(&self, field: Field) -> Option<&[String]> {
		match field {
			Field::Performers => Some(&self.performer_ids),
			Field::Tags => Some(&self.tag_ids),
			Field::Studios => singleton(&self.studio_id),
			Field::Scenes => Some(&self.scene_ids),
			_ => None,
		}
	}
}

impl Queryable for Image {
	const TYPE: EntityType = EntityType::Image;

	fn items(snapshot: &CatalogSnapshot) -> &[Self] {
		&snapshot.images
	}

	fn id(&self) -> &str {
		&self.id
	}

	fn source_id(&self) -> &str {
		&self.source_id
	}

	fn hidden(&self) -> bool {
		self.hidden
	}

	fn name(&self) -> &str {
		&self.title
	}

	fn supports(field: Field) -> bool {
		field.overlay()
			|| matches!(
				field,
				Field::Name
					| Field::Path | Field::Date
					| Field::Performers
					| Field::Tags | Field::Studios
					| Field::Galleries
			)
	}

	fn text_field(&self, field: Field) -> Option<&str> {
		match field {
			Field::Name => Some(&self.title),
			Field::Path => Some(&self.path),
			_ => None,
		}
	}

	fn number_field(&self, _field: Field) -> Option<f64> {
		None
	}

	fn date_field(&self, field: Field) -> Option<Option<Date>> {
		match field {
			Field::Date => Some(self.date),
			_ => None,
		}
	}

	fn id_set_field(&self, field: Field) -> Option<&[String]> {
		match field {
			Field::Performers => Some(&self.performer_ids),
			Field::Tags => Some(&self.tag_ids),
			Field::Studios => singleton(&self.studio_id),
			Field::Galleries => Some(&self.gallery_ids),
			_ => None,
		}
	}
}

impl Queryable for Collection {
	const TYPE: EntityType = EntityType::Collection;

	fn items(snapshot: &CatalogSnapshot) -> &[Self] {
		&snapshot.collections
	}

	fn id(&self) -> &str {
		&self.id
	}

	fn source_id(&self) -> &str {
		&self.source_id
	}

	fn hidden(&self) -> bool {
		self.hidden
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn supports(field: Field) -> bool {
		field.overlay()
			|| matches!(
				field,
				Field::Name | Field::Details | Field::Tags | Field::Studios | Field::Scenes
			)
	}

	fn text_field(&self, field: Field) -> Option<&str> {
		match field {
			Field::Name => Some(&self.name),
			Field::Details => Some(&self.description),
			_ => None,
		}
	}

	fn number_field(&self, _field: Field) -> Option<f64> {
		None
	}

	fn date_field(&self, _field: Field) -> Option<Option<Date>> {
		None
	}

	fn id_set_field(&self, field: Field) -> Option<&[String]> {
		match field {
			Field::Tags => Some(&self.tag_ids),
			Field::Studios => singleton(&self.studio_id),
			Field::Scenes => Some(&self.scene_ids),
			_ => None,
		}
	}
}
