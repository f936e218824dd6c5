use ahash::AHashMap;
use time::OffsetDateTime;

use prism_catalog::{
	entity::EntityRef,
	overlay::{RatingRow, WatchRow},
};

/// Per-user overlay rows materialized into lookup maps. Built once per
/// request, only when an overlay-backed criterion or sort makes it
/// necessary.
#[derive(Debug, Default)]
pub(crate) struct OverlayJoin {
	ratings: AHashMap<EntityRef, (Option<i16>, bool)>,
	watch: AHashMap<EntityRef, (i64, Option<OffsetDateTime>)>,
}

impl OverlayJoin {
	pub fn new(ratings: Vec<RatingRow>, watch: Vec<WatchRow>) -> Self {
		Self {
			ratings: ratings
				.into_iter()
				.map(|row| (row.entity, (row.rating, row.favorite)))
				.collect(),
			watch: watch
				.into_iter()
				.map(|row| (row.entity, (row.play_count, row.last_watched_at)))
				.collect(),
		}
	}

	pub fn rating(&self, entity: &EntityRef) -> Option<i16> {
		self.ratings.get(entity).and_then(|(rating, _)| *rating)
	}

	pub fn favorite(&self, entity: &EntityRef) -> bool {
		self.ratings.get(entity).map(|(_, favorite)| *favorite).unwrap_or(false)
	}

	pub fn play_count(&self, entity: &EntityRef) -> i64 {
		self.watch.get(entity).map(|(plays, _)| *plays).unwrap_or(0)
	}

	pub fn last_watched_at(&self, entity: &EntityRef) -> Option<OffsetDateTime> {
		self.watch.get(entity).and_then(|(_, at)| *at)
	}
}
