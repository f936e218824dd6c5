use ahash::{AHashMap, AHashSet};
use time::OffsetDateTime;

use crate::query::overlay::OverlayJoin;
use prism_catalog::{
	entity::{EntityRef, Scene},
	overlay::{EngagementRow, RatingRow},
	snapshot::CatalogSnapshot,
};
use prism_config::Scoring;

/// Affinity weights derived from the user's explicit evidence. Favorited
/// or high-rated scenes spread their relation weights onto the performers,
/// tags and studio they carry; directly favorited or high-rated relations
/// contribute their own weight on top.
pub(crate) struct UserEvidence {
	favorites: AHashSet<EntityRef>,
	high_rated: AHashSet<EntityRef>,
	performer_weights: AHashMap<EntityRef, f64>,
	tag_weights: AHashMap<EntityRef, f64>,
	studio_weights: AHashMap<EntityRef, f64>,
	evidence_rows: usize,
}

impl UserEvidence {
	pub fn build(
		snapshot: &CatalogSnapshot,
		scoring: &Scoring,
		scene_ratings: &[RatingRow],
		performer_ratings: &[RatingRow],
		studio_ratings: &[RatingRow],
		tag_ratings: &[RatingRow],
	) -> Self {
		let liked = |row: &RatingRow| {
			row.favorite || row.rating.map(|r| r >= scoring.rating_threshold).unwrap_or(false)
		};
		let mut evidence = Self {
			favorites: AHashSet::new(),
			high_rated: AHashSet::new(),
			performer_weights: AHashMap::new(),
			tag_weights: AHashMap::new(),
			studio_weights: AHashMap::new(),
			evidence_rows: 0,
		};

		for rows in [scene_ratings, performer_ratings, studio_ratings, tag_ratings] {
			for row in rows {
				if row.favorite || row.rating.is_some() {
					evidence.evidence_rows += 1;
				}
				if row.favorite {
					evidence.favorites.insert(row.entity.clone());
				}
				if row.rating.map(|r| r >= scoring.rating_threshold).unwrap_or(false) {
					evidence.high_rated.insert(row.entity.clone());
				}
			}
		}

		let scene_by_ref = snapshot
			.scenes
			.iter()
			.map(|scene| ((scene.source_id.as_str(), scene.id.as_str()), scene))
			.collect::<AHashMap<_, _>>();

		for row in scene_ratings.iter().filter(|row| liked(row)) {
			let Some(scene) =
				scene_by_ref.get(&(row.entity.source_id.as_str(), row.entity.id.as_str()))
			else {
				continue;
			};

			for performer_id in &scene.performer_ids {
				*evidence
					.performer_weights
					.entry(EntityRef::new(performer_id, &scene.source_id))
					.or_default() += scoring.performer_weight;
			}
			for tag_id in &scene.tag_ids {
				*evidence
					.tag_weights
					.entry(EntityRef::new(tag_id, &scene.source_id))
					.or_default() += scoring.tag_weight;
			}
			if let Some(studio_id) = &scene.studio_id {
				*evidence
					.studio_weights
					.entry(EntityRef::new(studio_id, &scene.source_id))
					.or_default() += scoring.studio_weight;
			}
		}

		for row in performer_ratings.iter().filter(|row| liked(row)) {
			*evidence.performer_weights.entry(row.entity.clone()).or_default() +=
				scoring.performer_weight;
		}
		for row in tag_ratings.iter().filter(|row| liked(row)) {
			*evidence.tag_weights.entry(row.entity.clone()).or_default() += scoring.tag_weight;
		}
		for row in studio_ratings.iter().filter(|row| liked(row)) {
			*evidence.studio_weights.entry(row.entity.clone()).or_default() +=
				scoring.studio_weight;
		}

		evidence
	}

	pub fn is_empty(&self) -> bool {
		self.evidence_rows == 0
	}

	/// Two-phase score for one candidate scene: relation affinity plus
	/// direct-evidence bonuses, engagement and watch-recency modifiers,
	/// then the capped popularity multiplier on positive totals.
	pub fn score_scene(
		&self,
		scene: &Scene,
		scoring: &Scoring,
		join: &OverlayJoin,
		engagement: &EngagementIndex,
		now: OffsetDateTime,
	) -> f64 {
		let entity_ref = EntityRef::new(&scene.id, &scene.source_id);
		let mut score = 0.0;

		for performer_id in &scene.performer_ids {
			score += self
				.performer_weights
				.get(&EntityRef::new(performer_id, &scene.source_id))
				.copied()
				.unwrap_or(0.0);
		}
		for tag_id in &scene.tag_ids {
			score += self
				.tag_weights
				.get(&EntityRef::new(tag_id, &scene.source_id))
				.copied()
				.unwrap_or(0.0);
		}
		if let Some(studio_id) = &scene.studio_id {
			score += self
				.studio_weights
				.get(&EntityRef::new(studio_id, &scene.source_id))
				.copied()
				.unwrap_or(0.0);
		}

		if self.favorites.contains(&entity_ref) {
			score += scoring.favorite_bonus;
		}
		if self.high_rated.contains(&entity_ref) {
			score += scoring.rating_bonus;
		}
		if engagement.bonus_eligible(&entity_ref) {
			score += scoring.engagement_bonus;
		}

		score += recency_modifier(join.last_watched_at(&entity_ref), scoring, now);

		if score > 0.0 {
			score *= engagement.multiplier(&entity_ref, scoring.engagement_cap);
		}

		score
	}
}

/// Fresh content is pushed up, recently watched content down. The
/// twenty-four-hour window carries the heaviest penalty; anything older
/// than two weeks counts as stale and earns a rewatch bonus.
pub(crate) fn recency_modifier(
	last_watched_at: Option<OffsetDateTime>,
	scoring: &Scoring,
	now: OffsetDateTime,
) -> f64 {
	let Some(watched_at) = last_watched_at else {
		return scoring.unwatched_bonus;
	};
	let age = now - watched_at;

	if age < time::Duration::hours(24) {
		-scoring.day_watch_penalty
	} else if age <= time::Duration::days(14) {
		-scoring.recent_watch_penalty
	} else {
		scoring.stale_watch_bonus
	}
}

/// Global engagement aggregates indexed for scoring. The percentile
/// threshold is computed once over every row of the entity type.
pub(crate) struct EngagementIndex {
	rows: AHashMap<EntityRef, (i64, f64)>,
	threshold: f64,
}

impl EngagementIndex {
	pub fn build(rows: Vec<EngagementRow>, percentile: f64) -> Self {
		let mut rates = rows.iter().map(|row| row.engagement_rate).collect::<Vec<_>>();

		rates.sort_by(f64::total_cmp);

		let threshold = if rates.is_empty() {
			f64::INFINITY
		} else {
			let rank = ((rates.len() - 1) as f64 * percentile).round() as usize;

			rates[rank.min(rates.len() - 1)]
		};

		Self {
			rows: rows
				.into_iter()
				.map(|row| (row.entity, (row.view_count, row.engagement_rate)))
				.collect(),
			threshold,
		}
	}

	pub fn bonus_eligible(&self, entity: &EntityRef) -> bool {
		self.rows
			.get(entity)
			.map(|(_, rate)| *rate >= self.threshold)
			.unwrap_or(false)
	}

	/// `1.0..=2.0`, scaling with interaction volume up to the cap.
	pub fn multiplier(&self, entity: &EntityRef, cap: i64) -> f64 {
		if cap <= 0 {
			return 1.0;
		}

		let views = self.rows.get(entity).map(|(views, _)| *views).unwrap_or(0);

		1.0 + views.clamp(0, cap) as f64 / cap as f64
	}
}
