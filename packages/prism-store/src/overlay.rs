use std::sync::Arc;

use time::OffsetDateTime;

use crate::{
	Db,
	models::{EngagementRecord, RatingRecord, WatchRecord},
};
use prism_catalog::{
	BoxFuture, Error, Result,
	entity::{EntityRef, EntityType},
	overlay::{EngagementRow, RatingRow, Restriction, RestrictionMode, UserProfile, WatchRow},
	provider::OverlayStore,
};

/// [`OverlayStore`] backed by the engine-owned Postgres schema.
#[derive(Clone)]
pub struct PgOverlay {
	db: Arc<Db>,
}

impl PgOverlay {
	pub fn new(db: Arc<Db>) -> Self {
		Self { db }
	}

	async fn fetch_ratings(
		&self,
		user_id: &str,
		entity_type: EntityType,
		refs: Option<&[EntityRef]>,
	) -> Result<Vec<RatingRow>> {
		let mut builder = sqlx::QueryBuilder::new(
			"SELECT entity_id, source_id, rating, favorite, updated_at \
			 FROM overlay_ratings WHERE user_id = ",
		);

		builder.push_bind(user_id);
		builder.push(" AND entity_type = ");
		builder.push_bind(entity_type.as_str());

		if let Some(refs) = refs {
			if refs.is_empty() {
				return Ok(Vec::new());
			}

			builder.push(" AND (entity_id, source_id) IN ");
			builder.push_tuples(refs, |mut row, entity| {
				row.push_bind(&entity.id).push_bind(&entity.source_id);
			});
		}

		let records: Vec<RatingRecord> =
			builder.build_query_as().fetch_all(&self.db.pool).await.map_err(storage_err)?;

		Ok(records.into_iter().map(RatingRow::from).collect())
	}

	async fn fetch_watch_stats(
		&self,
		user_id: &str,
		entity_type: EntityType,
		refs: Option<&[EntityRef]>,
	) -> Result<Vec<WatchRow>> {
		let mut builder = sqlx::QueryBuilder::new(
			"SELECT entity_id, source_id, play_count, last_watched_at \
			 FROM overlay_watch WHERE user_id = ",
		);

		builder.push_bind(user_id);
		builder.push(" AND entity_type = ");
		builder.push_bind(entity_type.as_str());

		if let Some(refs) = refs {
			if refs.is_empty() {
				return Ok(Vec::new());
			}

			builder.push(" AND (entity_id, source_id) IN ");
			builder.push_tuples(refs, |mut row, entity| {
				row.push_bind(&entity.id).push_bind(&entity.source_id);
			});
		}

		let records: Vec<WatchRecord> =
			builder.build_query_as().fetch_all(&self.db.pool).await.map_err(storage_err)?;

		Ok(records.into_iter().map(WatchRow::from).collect())
	}
}

impl OverlayStore for PgOverlay {
	fn profile<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<UserProfile>>> {
		Box::pin(async move {
			let row: Option<(String, bool)> =
				sqlx::query_as("SELECT user_id, elevated FROM user_profiles WHERE user_id = $1")
					.bind(user_id)
					.fetch_optional(&self.db.pool)
					.await
					.map_err(storage_err)?;

			Ok(row.map(|(user_id, elevated)| UserProfile { user_id, elevated }))
		})
	}

	fn restriction<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
	) -> BoxFuture<'a, Result<Option<Restriction>>> {
		Box::pin(async move {
			let row: Option<(String, Vec<String>)> = sqlx::query_as(
				"SELECT mode, ids FROM user_restrictions WHERE user_id = $1 AND entity_type = $2",
			)
			.bind(user_id)
			.bind(entity_type.as_str())
			.fetch_optional(&self.db.pool)
			.await
			.map_err(storage_err)?;
			let Some((mode, ids)) = row else {
				return Ok(None);
			};
			let mode = match mode.as_str() {
				"include" => RestrictionMode::Include,
				"exclude" => RestrictionMode::Exclude,
				other =>
					return Err(Error::Storage(format!("Unknown restriction mode '{other}'."))),
			};

			Ok(Some(Restriction { mode, ids }))
		})
	}

	fn ratings<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
	) -> BoxFuture<'a, Result<Vec<RatingRow>>> {
		Box::pin(self.fetch_ratings(user_id, entity_type, None))
	}

	fn ratings_for<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		refs: &'a [EntityRef],
	) -> BoxFuture<'a, Result<Vec<RatingRow>>> {
		Box::pin(self.fetch_ratings(user_id, entity_type, Some(refs)))
	}

	fn watch_stats<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
	) -> BoxFuture<'a, Result<Vec<WatchRow>>> {
		Box::pin(self.fetch_watch_stats(user_id, entity_type, None))
	}

	fn watch_stats_for<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		refs: &'a [EntityRef],
	) -> BoxFuture<'a, Result<Vec<WatchRow>>> {
		Box::pin(self.fetch_watch_stats(user_id, entity_type, Some(refs)))
	}

	fn engagement(&self, entity_type: EntityType) -> BoxFuture<'_, Result<Vec<EngagementRow>>> {
		Box::pin(async move {
			let records: Vec<EngagementRecord> = sqlx::query_as(
				"SELECT entity_id, source_id, view_count, engagement_rate \
				 FROM overlay_engagement WHERE entity_type = $1",
			)
			.bind(entity_type.as_str())
			.fetch_all(&self.db.pool)
			.await
			.map_err(storage_err)?;

			Ok(records.into_iter().map(EngagementRow::from).collect())
		})
	}

	fn upsert_rating<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		entity: &'a EntityRef,
		rating: Option<i16>,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO overlay_ratings (user_id, entity_type, entity_id, source_id, rating, favorite, updated_at)
VALUES ($1, $2, $3, $4, $5, FALSE, $6)
ON CONFLICT (user_id, entity_type, entity_id, source_id)
DO UPDATE
SET rating = EXCLUDED.rating, updated_at = EXCLUDED.updated_at",
			)
			.bind(user_id)
			.bind(entity_type.as_str())
			.bind(&entity.id)
			.bind(&entity.source_id)
			.bind(rating)
			.bind(OffsetDateTime::now_utc())
			.execute(&self.db.pool)
			.await
			.map_err(storage_err)?;

			Ok(())
		})
	}

	fn set_favorite<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		entity: &'a EntityRef,
		favorite: bool,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO overlay_ratings (user_id, entity_type, entity_id, source_id, rating, favorite, updated_at)
VALUES ($1, $2, $3, $4, NULL, $5, $6)
ON CONFLICT (user_id, entity_type, entity_id, source_id)
DO UPDATE
SET favorite = EXCLUDED.favorite, updated_at = EXCLUDED.updated_at",
			)
			.bind(user_id)
			.bind(entity_type.as_str())
			.bind(&entity.id)
			.bind(&entity.source_id)
			.bind(favorite)
			.bind(OffsetDateTime::now_utc())
			.execute(&self.db.pool)
			.await
			.map_err(storage_err)?;

			Ok(())
		})
	}

	fn record_watch<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		entity: &'a EntityRef,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO overlay_watch (user_id, entity_type, entity_id, source_id, play_count, last_watched_at)
VALUES ($1, $2, $3, $4, 1, $5)
ON CONFLICT (user_id, entity_type, entity_id, source_id)
DO UPDATE
SET play_count = overlay_watch.play_count + 1, last_watched_at = EXCLUDED.last_watched_at",
			)
			.bind(user_id)
			.bind(entity_type.as_str())
			.bind(&entity.id)
			.bind(&entity.source_id)
			.bind(OffsetDateTime::now_utc())
			.execute(&self.db.pool)
			.await
			.map_err(storage_err)?;

			Ok(())
		})
	}
}

fn storage_err(err: sqlx::Error) -> Error {
	Error::Storage(err.to_string())
}
