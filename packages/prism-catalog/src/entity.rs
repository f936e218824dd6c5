use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
	Scene,
	Performer,
	Studio,
	Tag,
	Gallery,
	Image,
	Collection,
}

impl EntityType {
	pub const ALL: [Self; 7] = [
		Self::Scene,
		Self::Performer,
		Self::Studio,
		Self::Tag,
		Self::Gallery,
		Self::Image,
		Self::Collection,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Scene => "scene",
			Self::Performer => "performer",
			Self::Studio => "studio",
			Self::Tag => "tag",
			Self::Gallery => "gallery",
			Self::Image => "image",
			Self::Collection => "collection",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|entity_type| entity_type.as_str() == raw)
	}
}

/// Identity of a catalog entity. The catalog ID alone is not globally
/// unique; multiple upstream sources may reuse IDs, so every exclusion set
/// and overlay join keys on the pair.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct EntityRef {
	pub id: String,
	pub source_id: String,
}

impl EntityRef {
	pub fn new(id: impl Into<String>, source_id: impl Into<String>) -> Self {
		Self { id: id.into(), source_id: source_id.into() }
	}
}

/// One upstream catalog source. Exactly one source is the canonical default;
/// its entities keep bare display names during disambiguation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SourceInstance {
	pub id: String,
	pub label: String,
	pub default: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Scene {
	pub id: String,
	pub source_id: String,
	pub title: String,
	pub details: String,
	pub path: String,
	pub date: Option<Date>,
	pub created_at: OffsetDateTime,
	pub duration_secs: f64,
	pub studio_id: Option<String>,
	pub performer_ids: Vec<String>,
	pub tag_ids: Vec<String>,
	pub gallery_ids: Vec<String>,
	pub collection_ids: Vec<String>,
	pub hidden: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Performer {
	pub id: String,
	pub source_id: String,
	pub name: String,
	pub details: String,
	pub gender: Option<String>,
	pub birthdate: Option<Date>,
	pub tag_ids: Vec<String>,
	pub hidden: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Studio {
	pub id: String,
	pub source_id: String,
	pub name: String,
	pub details: String,
	pub parent_ids: Vec<String>,
	pub hidden: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Tag {
	pub id: String,
	pub source_id: String,
	pub name: String,
	pub description: String,
	pub parent_ids: Vec<String>,
	pub hidden: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Gallery {
	pub id: String,
	pub source_id: String,
	pub title: String,
	pub path: String,
	pub date: Option<Date>,
	pub studio_id: Option<String>,
	pub performer_ids: Vec<String>,
	pub tag_ids: Vec<String>,
	pub scene_ids: Vec<String>,
	pub hidden: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Image {
	pub id: String,
	pub source_id: String,
	pub title: String,
	pub path: String,
	pub date: Option<Date>,
	pub studio_id: Option<String>,
	pub performer_ids: Vec<String>,
	pub tag_ids: Vec<String>,
	pub gallery_ids: Vec<String>,
	pub hidden: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Collection {
	pub id: String,
	pub source_id: String,
	pub name: String,
	pub description: String,
	pub studio_id: Option<String>,
	pub tag_ids: Vec<String>,
	pub scene_ids: Vec<String>,
	pub hidden: bool,
}
