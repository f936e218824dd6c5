use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::entity::EntityRef;

/// Explicit user evidence on one entity. Created and updated only by
/// explicit user action, never implicitly.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RatingRow {
	pub entity: EntityRef,
	pub rating: Option<i16>,
	pub favorite: bool,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WatchRow {
	pub entity: EntityRef,
	pub play_count: i64,
	pub last_watched_at: Option<OffsetDateTime>,
}

/// Global (not per-user) engagement aggregate used for percentile bonuses.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EngagementRow {
	pub entity: EntityRef,
	pub view_count: i64,
	pub engagement_rate: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionMode {
	Include,
	Exclude,
}

/// Per-(user, entity type) allow/deny list. The modes are mutually
/// exclusive: Include keeps only the listed IDs, Exclude removes them.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Restriction {
	pub mode: RestrictionMode,
	pub ids: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UserProfile {
	pub user_id: String,
	pub elevated: bool,
}
