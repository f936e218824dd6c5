//! Personalization engine over an external media catalog. Reads catalog
//! snapshots through a provider trait, keeps per-user evidence in an
//! overlay store, and answers filtered, visibility-scoped, deterministic
//! queries and recommendations.

mod error;
mod lookup;
mod query;
mod recommend;
mod snapshot;
mod update;
mod visibility;

pub use crate::{
	error::{Error, Result},
	lookup::{GetByIdsRequest, LookupMatch},
	query::{
		PagedResult, QueryRequest,
		criteria::{CriterionInput, FilterClause, FilterSet},
		hydrate::{EntityHit, NamedRef},
	},
	recommend::{RecommendRequest, RecommendedResponse, SimilarRequest},
	update::{RecordWatchRequest, SetFavoriteRequest, SetRatingRequest, UpdateEntityRequest},
};

use std::sync::Arc;

use crate::{
	snapshot::{SnapshotBundle, SnapshotCache},
	visibility::VisibilityCache,
};
use prism_catalog::provider::{CatalogProvider, OverlayStore, VersionSignal};
use prism_config::Config;

pub struct PrismEngine {
	config: Config,
	catalog: Arc<dyn CatalogProvider>,
	version: Arc<dyn VersionSignal>,
	overlay: Arc<dyn OverlayStore>,
	snapshots: SnapshotCache,
	visibility: VisibilityCache,
}

impl PrismEngine {
	pub fn new(
		config: Config,
		catalog: Arc<dyn CatalogProvider>,
		version: Arc<dyn VersionSignal>,
		overlay: Arc<dyn OverlayStore>,
	) -> Self {
		Self {
			config,
			catalog,
			version,
			overlay,
			snapshots: SnapshotCache::default(),
			visibility: VisibilityCache::default(),
		}
	}

	/// Drop a user's cached visibility so the next request recomputes it,
	/// e.g. after their restrictions changed out of band.
	pub fn invalidate_visibility(&self, user_id: &str) {
		self.visibility.invalidate(user_id);
	}

	pub(crate) async fn bundle(&self) -> Result<Arc<SnapshotBundle>> {
		self.snapshots.bundle(self.catalog.as_ref(), self.version.as_ref()).await
	}

	pub(crate) fn page_size(&self, requested: Option<u32>) -> Result<u32> {
		let query = &self.config.query;

		match requested {
			None => Ok(query.default_per_page),
			Some(0) => Err(Error::InvalidRequest {
				message: "Page size must be greater than zero.".into(),
			}),
			Some(size) if size > query.max_per_page => Err(Error::InvalidRequest {
				message: format!("Page size {size} exceeds the maximum {}.", query.max_per_page),
			}),
			Some(size) => Ok(size),
		}
	}
}
