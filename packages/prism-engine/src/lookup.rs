use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{
	Error, PrismEngine, Result,
	query::{
		fields::Queryable,
		hydrate::{EntityHit, hydrate_page},
		overlay::OverlayJoin,
		text::NameIndex,
	},
	snapshot::SnapshotBundle,
};
use prism_catalog::entity::{
	Collection, EntityRef, EntityType, Gallery, Image, Performer, Scene, Studio, Tag,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GetByIdsRequest {
	pub entity_type: EntityType,
	pub user_id: String,
	pub ids: Vec<String>,
	/// Narrows bare-id lookups to one source when the same id exists in
	/// several sources.
	#[serde(default)]
	pub source_hint: Option<String>,
}

/// One candidate resolution of an ambiguous bare-id lookup, returned so the
/// caller can retry with a source hint.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LookupMatch {
	pub id: String,
	pub source_id: String,
	pub name: String,
	pub source_label: String,
}

impl PrismEngine {
	/// Point lookup by bare ids, in request order. Invisible entities are
	/// dropped as if they did not exist; an id matched by several sources
	/// without a hint is an error rather than a guess.
	pub async fn get_by_ids(&self, req: GetByIdsRequest) -> Result<Vec<EntityHit>> {
		match req.entity_type {
			EntityType::Scene => self.get_by_ids_typed::<Scene>(&req).await,
			EntityType::Performer => self.get_by_ids_typed::<Performer>(&req).await,
			EntityType::Studio => self.get_by_ids_typed::<Studio>(&req).await,
			EntityType::Tag => self.get_by_ids_typed::<Tag>(&req).await,
			EntityType::Gallery => self.get_by_ids_typed::<Gallery>(&req).await,
			EntityType::Image => self.get_by_ids_typed::<Image>(&req).await,
			EntityType::Collection => self.get_by_ids_typed::<Collection>(&req).await,
		}
	}

	async fn get_by_ids_typed<T>(&self, req: &GetByIdsRequest) -> Result<Vec<EntityHit>>
	where
		T: Queryable,
	{
		if req.user_id.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "A user id is required.".into() });
		}
		if req.ids.is_empty() {
			return Ok(Vec::new());
		}

		let bundle = self.bundle().await?;
		let refs = {
			let visibility =
				self.visibility.user(self.overlay.as_ref(), &bundle, &req.user_id).await?;
			let excluded = visibility.excluded(T::TYPE);
			let snapshot = &bundle.snapshot;
			let mut by_id: AHashMap<&str, Vec<&T>> = AHashMap::new();

			for item in T::items(snapshot) {
				if excluded.contains(&item.entity_ref()) {
					continue;
				}
				if let Some(hint) = req.source_hint.as_deref()
					&& item.source_id() != hint
				{
					continue;
				}

				by_id.entry(item.id()).or_default().push(item);
			}

			let mut refs = Vec::with_capacity(req.ids.len());

			for id in &req.ids {
				let matches = by_id.get(id.as_str()).map(Vec::as_slice).unwrap_or(&[]);

				match matches {
					[] if req.ids.len() == 1 =>
						return Err(Error::NotFound {
							message: format!("No visible {} with id '{id}'.", T::TYPE.as_str()),
						}),
					[] => {},
					[only] => refs.push(only.entity_ref()),
					many =>
						return Err(Error::AmbiguousLookup {
							id: id.clone(),
							matches: many
								.iter()
								.map(|item| LookupMatch {
									id: item.id().to_string(),
									source_id: item.source_id().to_string(),
									name: item.name().to_string(),
									source_label: snapshot
										.source_label(item.source_id())
										.to_string(),
								})
								.collect(),
						}),
				}
			}

			refs
		};

		self.hydrate_refs::<T>(&req.user_id, &bundle, &refs).await
	}

	/// Hydrate an already-resolved ref list, preserving its order. Shared by
	/// the id lookup and the recommenders.
	pub(crate) async fn hydrate_refs<T>(
		&self,
		user_id: &str,
		bundle: &SnapshotBundle,
		refs: &[EntityRef],
	) -> Result<Vec<EntityHit>>
	where
		T: Queryable,
	{
		if refs.is_empty() {
			return Ok(Vec::new());
		}

		let snapshot = &bundle.snapshot;
		let by_ref = T::items(snapshot)
			.iter()
			.map(|item| ((item.source_id(), item.id()), item))
			.collect::<AHashMap<_, _>>();
		let page_items = refs
			.iter()
			.filter_map(|entity_ref| {
				by_ref.get(&(entity_ref.source_id.as_str(), entity_ref.id.as_str())).copied()
			})
			.collect::<Vec<_>>();
		let (ratings, watch) = tokio::try_join!(
			self.overlay.ratings_for(user_id, T::TYPE, refs),
			self.overlay.watch_stats_for(user_id, T::TYPE, refs),
		)?;
		let join = OverlayJoin::new(ratings, watch);
		let names = NameIndex::build(snapshot);

		Ok(hydrate_page(&page_items, snapshot, &names, Some(&join)))
	}
}
