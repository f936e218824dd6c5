use time::OffsetDateTime;

use prism_catalog::{
	entity::EntityRef,
	overlay::{EngagementRow, RatingRow, WatchRow},
};

#[derive(Debug, sqlx::FromRow)]
pub struct RatingRecord {
	pub entity_id: String,
	pub source_id: String,
	pub rating: Option<i16>,
	pub favorite: bool,
	pub updated_at: OffsetDateTime,
}

impl From<RatingRecord> for RatingRow {
	fn from(record: RatingRecord) -> Self {
		Self {
			entity: EntityRef::new(record.entity_id, record.source_id),
			rating: record.rating,
			favorite: record.favorite,
			updated_at: record.updated_at,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct WatchRecord {
	pub entity_id: String,
	pub source_id: String,
	pub play_count: i64,
	pub last_watched_at: Option<OffsetDateTime>,
}

impl From<WatchRecord> for WatchRow {
	fn from(record: WatchRecord) -> Self {
		Self {
			entity: EntityRef::new(record.entity_id, record.source_id),
			play_count: record.play_count,
			last_watched_at: record.last_watched_at,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct EngagementRecord {
	pub entity_id: String,
	pub source_id: String,
	pub view_count: i64,
	pub engagement_rate: f64,
}

impl From<EngagementRecord> for EngagementRow {
	fn from(record: EngagementRecord) -> Self {
		Self {
			entity: EntityRef::new(record.entity_id, record.source_id),
			view_count: record.view_count,
			engagement_rate: record.engagement_rate,
		}
	}
}
