pub(crate) mod tiers;
pub(crate) mod weights;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::{
	Error, PrismEngine, Result,
	query::{
		PagedResult,
		fields::{Field, Queryable},
		hydrate::EntityHit,
		overlay::OverlayJoin,
	},
	recommend::{
		tiers::{ScoredRef, rank},
		weights::{EngagementIndex, UserEvidence, recency_modifier},
	},
};
use prism_catalog::entity::{
	Collection, EntityRef, EntityType, Gallery, Image, Performer, Scene, Studio, Tag,
};
use prism_domain::shuffle::seed_from_parts;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecommendRequest {
	pub user_id: String,
	#[serde(default = "first_page")]
	pub page: u32,
	#[serde(default)]
	pub per_page: Option<u32>,
}

fn first_page() -> u32 {
	1
}

/// Recommendations degrade explicitly: a user with no evidence gets an
/// empty response with a reason instead of an arbitrary ranking.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendedResponse {
	Page(PagedResult),
	Empty { reason: String },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimilarRequest {
	pub entity_type: EntityType,
	pub entity_id: String,
	#[serde(default)]
	pub source_hint: Option<String>,
	pub user_id: String,
	#[serde(default = "first_page")]
	pub page: u32,
	#[serde(default)]
	pub per_page: Option<u32>,
}

impl PrismEngine {
	/// Personalized scene feed. Phase one scores every visible scene from
	/// the user's explicit evidence; phase two hydrates only the requested
	/// page. The shuffle seed is a pure function of user and snapshot
	/// version, so pagination within one snapshot never repeats or skips.
	pub async fn recommended_for(&self, req: RecommendRequest) -> Result<RecommendedResponse> {
		let per_page = self.page_size(req.per_page)?;

		if req.page == 0 {
			return Err(Error::InvalidRequest { message: "Pages are numbered from 1.".into() });
		}
		if req.user_id.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "A user id is required.".into() });
		}

		let bundle = self.bundle().await?;
		let snapshot = &bundle.snapshot;
		let visibility =
			self.visibility.user(self.overlay.as_ref(), &bundle, &req.user_id).await?;
		let excluded = visibility.excluded(EntityType::Scene);
		let user_id = req.user_id.as_str();
		let (scene_ratings, performer_ratings, studio_ratings, tag_ratings, watch, engagement) =
			tokio::try_join!(
				self.overlay.ratings(user_id, EntityType::Scene),
				self.overlay.ratings(user_id, EntityType::Performer),
				self.overlay.ratings(user_id, EntityType::Studio),
				self.overlay.ratings(user_id, EntityType::Tag),
				self.overlay.watch_stats(user_id, EntityType::Scene),
				self.overlay.engagement(EntityType::Scene),
			)?;
		let evidence = UserEvidence::build(
			snapshot,
			&self.config.scoring,
			&scene_ratings,
			&performer_ratings,
			&studio_ratings,
			&tag_ratings,
		);

		if evidence.is_empty() {
			debug!(user_id, "No recommendation evidence.");

			return Ok(RecommendedResponse::Empty {
				reason: "Rate or favorite a few items first to get recommendations.".into(),
			});
		}

		let join = OverlayJoin::new(scene_ratings, watch);
		let engagement =
			EngagementIndex::build(engagement, self.config.scoring.engagement_percentile);
		let now = OffsetDateTime::now_utc();
		let scored = snapshot
			.scenes
			.iter()
			.filter(|scene| !excluded.contains(&scene.entity_ref()))
			.map(|scene| ScoredRef {
				entity: scene.entity_ref(),
				score: evidence.score_scene(
					scene,
					&self.config.scoring,
					&join,
					&engagement,
					now,
				),
			})
			.collect::<Vec<_>>();
		let seed = seed_from_parts(&[user_id, &snapshot.version.to_string()]);
		let ranked = rank(
			scored,
			self.config.scoring.tier_count,
			self.config.scoring.max_candidates,
			seed,
		);
		let (hits, total_count) =
			self.ranked_page::<Scene>(user_id, &bundle, &ranked, req.page, per_page).await?;

		debug!(user_id, total_count, page = req.page, "Recommendations ranked.");

		Ok(RecommendedResponse::Page(PagedResult {
			hits,
			total_count,
			page: req.page,
			per_page,
		}))
	}

	/// Relation-overlap similarity anchored on one entity. Candidates come
	/// from the anchor's own source; shared performers, tags and studios
	/// contribute their configured weights, and candidates with any overlap
	/// pick up the same watch-recency and engagement modifiers the
	/// recommendation feed uses.
	pub async fn similar_to(&self, req: SimilarRequest) -> Result<PagedResult> {
		match req.entity_type {
			EntityType::Scene => self.similar_typed::<Scene>(&req).await,
			EntityType::Performer => self.similar_typed::<Performer>(&req).await,
			EntityType::Studio => self.similar_typed::<Studio>(&req).await,
			EntityType::Tag => self.similar_typed::<Tag>(&req).await,
			EntityType::Gallery => self.similar_typed::<Gallery>(&req).await,
			EntityType::Image => self.similar_typed::<Image>(&req).await,
			EntityType::Collection => self.similar_typed::<Collection>(&req).await,
		}
	}

	async fn similar_typed<T>(&self, req: &SimilarRequest) -> Result<PagedResult>
	where
		T: Queryable,
	{
		let per_page = self.page_size(req.per_page)?;

		if req.page == 0 {
			return Err(Error::InvalidRequest { message: "Pages are numbered from 1.".into() });
		}
		if req.user_id.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "A user id is required.".into() });
		}

		let bundle = self.bundle().await?;
		let snapshot = &bundle.snapshot;
		let visibility =
			self.visibility.user(self.overlay.as_ref(), &bundle, &req.user_id).await?;
		let excluded = visibility.excluded(T::TYPE);
		let anchor = self.resolve_anchor::<T>(
			snapshot,
			&excluded,
			&req.entity_id,
			req.source_hint.as_deref(),
		)?;
		let scoring = &self.config.scoring;
		let anchor_performers = relation_set(anchor, Field::Performers);
		let anchor_tags = relation_set(anchor, Field::Tags);
		let anchor_studios = relation_set(anchor, Field::Studios);
		let (watch, engagement_rows) = tokio::try_join!(
			self.overlay.watch_stats(&req.user_id, T::TYPE),
			self.overlay.engagement(T::TYPE),
		)?;
		let join = OverlayJoin::new(Vec::new(), watch);
		let engagement = EngagementIndex::build(engagement_rows, scoring.engagement_percentile);
		let now = OffsetDateTime::now_utc();
		let scored = T::items(snapshot)
			.iter()
			.filter(|item| item.source_id() == anchor.source_id())
			.filter(|item| item.id() != anchor.id())
			.filter(|item| !excluded.contains(&item.entity_ref()))
			.map(|item| {
				let base = overlap(item, Field::Performers, &anchor_performers)
					* scoring.performer_weight
					+ overlap(item, Field::Tags, &anchor_tags) * scoring.tag_weight
					+ overlap(item, Field::Studios, &anchor_studios) * scoring.studio_weight;
				let entity = item.entity_ref();
				// Modifiers only adjust candidates that share something with
				// the anchor; they never pull in unrelated entities.
				let score = if base > 0.0 {
					let mut score =
						base + recency_modifier(join.last_watched_at(&entity), scoring, now);

					if engagement.bonus_eligible(&entity) {
						score += scoring.engagement_bonus;
					}
					if score > 0.0 {
						score *= engagement.multiplier(&entity, scoring.engagement_cap);
					}

					score
				} else {
					0.0
				};

				ScoredRef { entity, score }
			})
			.collect::<Vec<_>>();
		let seed = seed_from_parts(&[
			req.user_id.as_str(),
			req.entity_id.as_str(),
			&snapshot.version.to_string(),
		]);
		let ranked = rank(scored, scoring.tier_count, scoring.max_candidates, seed);
		let (hits, total_count) = self
			.ranked_page::<T>(&req.user_id, &bundle, &ranked, req.page, per_page)
			.await?;

		Ok(PagedResult { hits, total_count, page: req.page, per_page })
	}

	fn resolve_anchor<'a, T>(
		&self,
		snapshot: &'a prism_catalog::snapshot::CatalogSnapshot,
		excluded: &AHashSet<EntityRef>,
		entity_id: &str,
		source_hint: Option<&str>,
	) -> Result<&'a T>
	where
		T: Queryable,
	{
		let matches = T::items(snapshot)
			.iter()
			.filter(|item| item.id() == entity_id)
			.filter(|item| source_hint.map(|hint| item.source_id() == hint).unwrap_or(true))
			.filter(|item| !excluded.contains(&item.entity_ref()))
			.collect::<Vec<_>>();

		match matches.as_slice() {
			[] => Err(Error::NotFound {
				message: format!("No visible {} with id '{entity_id}'.", T::TYPE.as_str()),
			}),
			[only] => Ok(*only),
			many => Err(Error::AmbiguousLookup {
				id: entity_id.to_string(),
				matches: many
					.iter()
					.map(|item| crate::lookup::LookupMatch {
						id: item.id().to_string(),
						source_id: item.source_id().to_string(),
						name: item.name().to_string(),
						source_label: snapshot.source_label(item.source_id()).to_string(),
					})
					.collect(),
			}),
		}
	}

	async fn ranked_page<T>(
		&self,
		user_id: &str,
		bundle: &crate::snapshot::SnapshotBundle,
		ranked: &[EntityRef],
		page: u32,
		per_page: u32,
	) -> Result<(Vec<EntityHit>, usize)>
	where
		T: Queryable,
	{
		let start = (page - 1) as usize * per_page as usize;
		let page_refs = ranked
			.iter()
			.skip(start)
			.take(per_page as usize)
			.cloned()
			.collect::<Vec<_>>();
		let hits = self.hydrate_refs::<T>(user_id, bundle, &page_refs).await?;

		Ok((hits, ranked.len()))
	}
}

fn relation_set<T>(item: &T, field: Field) -> AHashSet<&str>
where
	T: Queryable,
{
	if !T::supports(field) {
		return AHashSet::new();
	}

	item.id_set_field(field)
		.unwrap_or(&[])
		.iter()
		.map(String::as_str)
		.collect()
}

fn overlap<T>(item: &T, field: Field, anchor: &AHashSet<&str>) -> f64
where
	T: Queryable,
{
	if anchor.is_empty() || !T::supports(field) {
		return 0.0;
	}

	item.id_set_field(field)
		.unwrap_or(&[])
		.iter()
		.filter(|id| anchor.contains(id.as_str()))
		.count() as f64
}
