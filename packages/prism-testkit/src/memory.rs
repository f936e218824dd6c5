use std::{
	collections::HashMap,
	sync::Mutex,
};

use time::OffsetDateTime;

use prism_catalog::{
	BoxFuture, Result,
	entity::{EntityRef, EntityType},
	overlay::{EngagementRow, RatingRow, Restriction, UserProfile, WatchRow},
	provider::{CatalogProvider, EntityUpdate, OverlayStore, VersionSignal},
	snapshot::CatalogSnapshot,
};

/// In-memory catalog double. Serves clones of one snapshot and records
/// forwarded entity updates for assertions.
pub struct MemoryCatalog {
	snapshot: Mutex<CatalogSnapshot>,
	updates: Mutex<Vec<EntityUpdate>>,
}

impl MemoryCatalog {
	pub fn new(snapshot: CatalogSnapshot) -> Self {
		Self { snapshot: Mutex::new(snapshot), updates: Mutex::new(Vec::new()) }
	}

	/// Swap the served snapshot; bump its version to simulate an upstream
	/// change.
	pub fn replace_snapshot(&self, snapshot: CatalogSnapshot) {
		*self.snapshot.lock().unwrap_or_else(|err| err.into_inner()) = snapshot;
	}

	pub fn recorded_updates(&self) -> Vec<EntityUpdate> {
		self.updates.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}

impl CatalogProvider for MemoryCatalog {
	fn fetch_snapshot(&self) -> BoxFuture<'_, Result<CatalogSnapshot>> {
		Box::pin(async move {
			Ok(self.snapshot.lock().unwrap_or_else(|err| err.into_inner()).clone())
		})
	}

	fn update_entity<'a>(&'a self, update: &'a EntityUpdate) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.updates.lock().unwrap_or_else(|err| err.into_inner()).push(update.clone());

			Ok(())
		})
	}
}

impl VersionSignal for MemoryCatalog {
	fn current_version(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			Ok(self.snapshot.lock().unwrap_or_else(|err| err.into_inner()).version)
		})
	}
}

type UserTypeKey = (String, EntityType);

/// In-memory overlay store with the same write semantics as the Postgres
/// one: rating and favorite writes preserve each other, watches increment.
#[derive(Default)]
pub struct MemoryOverlay {
	profiles: Mutex<HashMap<String, UserProfile>>,
	restrictions: Mutex<HashMap<UserTypeKey, Restriction>>,
	ratings: Mutex<HashMap<UserTypeKey, HashMap<EntityRef, RatingRow>>>,
	watch: Mutex<HashMap<UserTypeKey, HashMap<EntityRef, WatchRow>>>,
	engagement: Mutex<HashMap<EntityType, Vec<EngagementRow>>>,
}

impl MemoryOverlay {
	pub fn set_profile(&self, profile: UserProfile) {
		self.profiles
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.insert(profile.user_id.clone(), profile);
	}

	pub fn set_restriction(
		&self,
		user_id: &str,
		entity_type: EntityType,
		restriction: Restriction,
	) {
		self.restrictions
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.insert((user_id.to_string(), entity_type), restriction);
	}

	pub fn seed_rating(&self, user_id: &str, entity_type: EntityType, row: RatingRow) {
		self.ratings
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.entry((user_id.to_string(), entity_type))
			.or_default()
			.insert(row.entity.clone(), row);
	}

	pub fn seed_watch(&self, user_id: &str, entity_type: EntityType, row: WatchRow) {
		self.watch
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.entry((user_id.to_string(), entity_type))
			.or_default()
			.insert(row.entity.clone(), row);
	}

	pub fn seed_engagement(&self, entity_type: EntityType, rows: Vec<EngagementRow>) {
		self.engagement
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.insert(entity_type, rows);
	}

	fn rating_rows(&self, user_id: &str, entity_type: EntityType) -> Vec<RatingRow> {
		self.ratings
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.get(&(user_id.to_string(), entity_type))
			.map(|rows| rows.values().cloned().collect())
			.unwrap_or_default()
	}

	fn watch_rows(&self, user_id: &str, entity_type: EntityType) -> Vec<WatchRow> {
		self.watch
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.get(&(user_id.to_string(), entity_type))
			.map(|rows| rows.values().cloned().collect())
			.unwrap_or_default()
	}
}

impl OverlayStore for MemoryOverlay {
	fn profile<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Option<UserProfile>>> {
		Box::pin(async move {
			Ok(self
				.profiles
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.get(user_id)
				.cloned())
		})
	}

	fn restriction<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
	) -> BoxFuture<'a, Result<Option<Restriction>>> {
		Box::pin(async move {
			Ok(self
				.restrictions
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.get(&(user_id.to_string(), entity_type))
				.cloned())
		})
	}

	fn ratings<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
	) -> BoxFuture<'a, Result<Vec<RatingRow>>> {
		Box::pin(async move { Ok(self.rating_rows(user_id, entity_type)) })
	}

	fn ratings_for<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		refs: &'a [EntityRef],
	) -> BoxFuture<'a, Result<Vec<RatingRow>>> {
		Box::pin(async move {
			Ok(self
				.rating_rows(user_id, entity_type)
				.into_iter()
				.filter(|row| refs.contains(&row.entity))
				.collect())
		})
	}

	fn watch_stats<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
	) -> BoxFuture<'a, Result<Vec<WatchRow>>> {
		Box::pin(async move { Ok(self.watch_rows(user_id, entity_type)) })
	}

	fn watch_stats_for<'a>(
		&'a self,
		user_id: &'a str,
		entity_type: EntityType,
		refs: &'a [EntityRef],
	) -> BoxFuture<'a, Result<Vec<WatchRow>>> {
		Box::pin(async move {
			Ok(self
				.watch_rows(user_id, entity_type)
				.into_iter()
				.filter(|row| refs.contains(&row.entity))
				.collect())
		})
	}

	fn engagement(&self, entity_type: EntityType) -> BoxFuture<'_, Result<Vec<EngagementRow>>> {
		Box::pin(async move {
			Ok(self
				.engagement
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.get(&entity_type)
				.cloned()
				.unwrap_or_default())
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
			let mut guard = self.ratings.lock().unwrap_or_else(|err| err.into_inner());
			let rows = guard.entry((user_id.to_string(), entity_type)).or_default();
			let row = rows.entry(entity.clone()).or_insert_with(|| RatingRow {
				entity: entity.clone(),
				rating: None,
				favorite: false,
				updated_at: OffsetDateTime::now_utc(),
			});

			row.rating = rating;
			row.updated_at = OffsetDateTime::now_utc();

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
			let mut guard = self.ratings.lock().unwrap_or_else(|err| err.into_inner());
			let rows = guard.entry((user_id.to_string(), entity_type)).or_default();
			let row = rows.entry(entity.clone()).or_insert_with(|| RatingRow {
				entity: entity.clone(),
				rating: None,
				favorite: false,
				updated_at: OffsetDateTime::now_utc(),
			});

			row.favorite = favorite;
			row.updated_at = OffsetDateTime::now_utc();

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
			let mut guard = self.watch.lock().unwrap_or_else(|err| err.into_inner());
			let rows = guard.entry((user_id.to_string(), entity_type)).or_default();
			let row = rows.entry(entity.clone()).or_insert_with(|| WatchRow {
				entity: entity.clone(),
				play_count: 0,
				last_watched_at: None,
			});

			row.play_count += 1;
			row.last_watched_at = Some(OffsetDateTime::now_utc());

			Ok(())
		})
	}
}
