use serde_json::Value;

use crate::{
	BoxFuture, Result,
	entity::{EntityRef, EntityType},
	overlay::{EngagementRow, RatingRow, Restriction, UserProfile, WatchRow},
	snapshot::CatalogSnapshot,
};

/// Single-record mutation forwarded to the upstream catalog. The engine
/// never pushes partial updates on its own; mutation is delegate-only.
#[derive(Clone, Debug)]
pub struct EntityUpdate {
	pub entity_type: EntityType,
	pub entity: EntityRef,
	pub fields: Value,
}

/// Upstream catalog, consumed as snapshots. Failures surface as
/// [`Error::Upstream`](crate::Error), never as a silently empty snapshot.
pub trait CatalogProvider
where
	Self: Send + Sync,
{
	fn fetch_snapshot(&self) -> BoxFuture<'_, Result<CatalogSnapshot>>;

	fn update_entity<'a>(&'a self, update: &'a EntityUpdate) -> BoxFuture<'a, Result<()>>;
}

/// Monotonically increasing catalog version, polled purely for cache
/// invalidation.
pub trait VersionSignal
where
	Self: Send + Sync,
{
	fn current_version(&self) -> BoxFuture<'_, Result<u64>>;
}

/// Engine-owned store for per-user overlay rows (ratings, favorites, watch
/// history) plus global engagement aggregates and visibility restrictions.
pub trait OverlayStore
where
	Self: Send + Sync,
{
	fn profile<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<UserProfile>>>;

	fn restriction<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
	) -> BoxFuture<'a, Result<Option<Restriction>>>;

	fn ratings<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
	) -> BoxFuture<'a, Result<Vec<RatingRow>>>;

	fn ratings_for<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		refs: &'a [EntityRef],
	) -> BoxFuture<'a, Result<Vec<RatingRow>>>;

	fn watch_stats<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
	) -> BoxFuture<'a, Result<Vec<WatchRow>>>;

	fn watch_stats_for<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		refs: &'a [EntityRef],
	) -> BoxFuture<'a, Result<Vec<WatchRow>>>;

	fn engagement(&self, entity_type: EntityType) -> BoxFuture<'_, Result<Vec<EngagementRow>>>;

	fn upsert_rating<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		entity: &'a EntityRef,
		rating: Option<i16>,
	) -> BoxFuture<'a, Result<()>>;

	fn set_favorite<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		entity: &'a EntityRef,
		favorite: bool,
	) -> BoxFuture<'a, Result<()>>;

	fn record_watch<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		entity: &'a EntityRef,
	) -> BoxFuture<'a, Result<()>>;
}
