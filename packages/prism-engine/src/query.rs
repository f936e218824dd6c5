pub mod criteria;
pub mod fields;
pub mod hydrate;
pub(crate) mod overlay;
pub(crate) mod sorting;
pub(crate) mod text;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
	Error, PrismEngine, Result,
	query::{
		criteria::{FilterSet, entity_matches, overlay_matches, resolve_clauses},
		fields::Queryable,
		hydrate::{EntityHit, hydrate_page},
		overlay::OverlayJoin,
		sorting::{parse_sort, sort_candidates},
		text::{NameIndex, matches_search},
	},
};
use prism_catalog::entity::{
	Collection, EntityRef, EntityType, Gallery, Image, Performer, Scene, Studio, Tag,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct QueryRequest {
	pub entity_type: EntityType,
	pub user_id: String,
	#[serde(default)]
	pub filters: FilterSet,
	#[serde(default)]
	pub sort: Option<String>,
	#[serde(default)]
	pub search_text: Option<String>,
	#[serde(default = "first_page")]
	pub page: u32,
	#[serde(default)]
	pub per_page: Option<u32>,
}

fn first_page() -> u32 {
	1
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PagedResult {
	pub hits: Vec<EntityHit>,
	pub total_count: usize,
	pub page: u32,
	pub per_page: u32,
}

impl PrismEngine {
	pub async fn query(&self, req: QueryRequest) -> Result<PagedResult> {
		match req.entity_type {
			EntityType::Scene => self.query_typed::<Scene>(&req).await,
			EntityType::Performer => self.query_typed::<Performer>(&req).await,
			EntityType::Studio => self.query_typed::<Studio>(&req).await,
			EntityType::Tag => self.query_typed::<Tag>(&req).await,
			EntityType::Gallery => self.query_typed::<Gallery>(&req).await,
			EntityType::Image => self.query_typed::<Image>(&req).await,
			EntityType::Collection => self.query_typed::<Collection>(&req).await,
		}
	}

	/// Candidate evaluation runs cheap to expensive: catalog-backed filters
	/// first, overlay-backed ones only over the survivors, exclusion last so
	/// the total count reflects exactly what the user may see.
	async fn query_typed<T>(&self, req: &QueryRequest) -> Result<PagedResult>
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
		let items = T::items(snapshot);
		let clauses = resolve_clauses::<T>(&req.filters.clauses, &bundle)?;
		let sort = parse_sort::<T>(req.sort.as_deref(), &req.user_id, snapshot.version)?;
		let (expensive, cheap) = clauses
			.into_iter()
			.partition::<Vec<_>, _>(|clause| clause.expensive());

		let mut order = match &req.filters.ids {
			Some(ids) => {
				let wanted = ids.iter().map(String::as_str).collect::<AHashSet<_>>();

				items
					.iter()
					.enumerate()
					.filter(|(_, item)| wanted.contains(item.id()))
					.map(|(position, _)| position as u32)
					.collect::<Vec<_>>()
			},
			None => (0..items.len() as u32).collect(),
		};
		let names = NameIndex::build(snapshot);

		if let Some(needle) =
			req.search_text.as_deref().map(str::trim).filter(|needle| !needle.is_empty())
		{
			let needle = needle.to_lowercase();

			order.retain(|&position| {
				matches_search(&items[position as usize], &needle, &names)
			});
		}
		if !cheap.is_empty() {
			order.retain(|&position| entity_matches(&items[position as usize], &cheap));
		}

		let join = if !expensive.is_empty() || sort.needs_overlay() {
			let (ratings, watch) = tokio::try_join!(
				self.overlay.ratings(&req.user_id, T::TYPE),
				self.overlay.watch_stats(&req.user_id, T::TYPE),
			)?;

			Some(OverlayJoin::new(ratings, watch))
		} else {
			None
		};

		if let Some(join) = join.as_ref()
			&& !expensive.is_empty()
		{
			order.retain(|&position| {
				overlay_matches(&items[position as usize], &expensive, join)
			});
		}

		order.retain(|&position| !excluded.contains(&items[position as usize].entity_ref()));

		let total_count = order.len();

		sort_candidates(items, &mut order, &sort, join.as_ref());

		let start = (req.page - 1) as usize * per_page as usize;
		let page_items = order
			.iter()
			.skip(start)
			.take(per_page as usize)
			.map(|&position| &items[position as usize])
			.collect::<Vec<_>>();

		let page_join;
		let join_for_page = match join.as_ref() {
			Some(join) => Some(join),
			None if page_items.is_empty() => None,
			None => {
				let refs =
					page_items.iter().map(|item| item.entity_ref()).collect::<Vec<EntityRef>>();
				let (ratings, watch) = tokio::try_join!(
					self.overlay.ratings_for(&req.user_id, T::TYPE, &refs),
					self.overlay.watch_stats_for(&req.user_id, T::TYPE, &refs),
				)?;

				page_join = OverlayJoin::new(ratings, watch);

				Some(&page_join)
			},
		};
		let hits = hydrate_page(&page_items, snapshot, &names, join_for_page);

		debug!(
			entity_type = T::TYPE.as_str(),
			total_count,
			page = req.page,
			returned = hits.len(),
			"Query executed."
		);

		Ok(PagedResult { hits, total_count, page: req.page, per_page })
	}
}
