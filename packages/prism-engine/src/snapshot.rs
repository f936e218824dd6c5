use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::Result;
use prism_catalog::{
	provider::{CatalogProvider, VersionSignal},
	snapshot::CatalogSnapshot,
};
use prism_domain::hierarchy::Graph;

/// One catalog snapshot plus the hierarchy graphs derived from it. Shared
/// immutably; a new bundle replaces the whole thing when the version moves.
pub struct SnapshotBundle {
	pub snapshot: CatalogSnapshot,
	pub tag_graph: Graph,
	pub studio_graph: Graph,
}

impl SnapshotBundle {
	pub fn new(snapshot: CatalogSnapshot) -> Self {
		let tag_graph = Graph::from_parent_edges(
			snapshot.tags.iter().map(|tag| (tag.id.as_str(), tag.parent_ids.as_slice())),
		);
		let studio_graph = Graph::from_parent_edges(
			snapshot
				.studios
				.iter()
				.map(|studio| (studio.id.as_str(), studio.parent_ids.as_slice())),
		);

		Self { snapshot, tag_graph, studio_graph }
	}
}

/// Version-gated snapshot cache. Readers share the current bundle; a bundle
/// tagged with version V is discarded, never reused, once the signal reports
/// a version above V. Concurrent refreshes for the same version race
/// harmlessly: population is last-writer-wins, and recomputation is
/// idempotent.
#[derive(Default)]
pub struct SnapshotCache {
	current: RwLock<Option<Arc<SnapshotBundle>>>,
}

impl SnapshotCache {
	pub async fn bundle(
		&self,
		catalog: &dyn CatalogProvider,
		version: &dyn VersionSignal,
	) -> Result<Arc<SnapshotBundle>> {
		let live = version.current_version().await?;

		{
			let guard = self.current.read().unwrap_or_else(|err| err.into_inner());

			if let Some(bundle) = guard.as_ref()
				&& bundle.snapshot.version >= live
			{
				debug!(version = live, "Snapshot cache hit.");

				return Ok(Arc::clone(bundle));
			}
		}

		let snapshot = catalog.fetch_snapshot().await?;

		info!(
			version = snapshot.version,
			scenes = snapshot.scenes.len(),
			performers = snapshot.performers.len(),
			"Refreshed catalog snapshot."
		);

		let bundle = Arc::new(SnapshotBundle::new(snapshot));
		let mut guard = self.current.write().unwrap_or_else(|err| err.into_inner());

		// Keep whichever bundle is newest; a concurrent refresh may have won.
		let stale = guard
			.as_ref()
			.map(|existing| existing.snapshot.version < bundle.snapshot.version)
			.unwrap_or(true);

		if stale {
			*guard = Some(Arc::clone(&bundle));

			return Ok(bundle);
		}

		match guard.as_ref() {
			Some(existing) => Ok(Arc::clone(existing)),
			None => Ok(bundle),
		}
	}
}
