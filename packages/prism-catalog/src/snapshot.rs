use serde::{Deserialize, Serialize};

use crate::entity::{
	Collection, Gallery, Image, Performer, Scene, SourceInstance, Studio, Tag,
};

/// Read-mostly snapshot of the upstream catalog, refreshed as a whole when
/// the version signal reports a newer version. Entities inside it are
/// immutable from the engine's point of view; only overlay rows change
/// between refreshes.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CatalogSnapshot {
	pub version: u64,
	pub sources: Vec<SourceInstance>,
	pub scenes: Vec<Scene>,
	pub performers: Vec<Performer>,
	pub studios: Vec<Studio>,
	pub tags: Vec<Tag>,
	pub galleries: Vec<Gallery>,
	pub images: Vec<Image>,
	pub collections: Vec<Collection>,
}

impl CatalogSnapshot {
	pub fn default_source(&self) -> Option<&SourceInstance> {
		self.sources.iter().find(|source| source.default)
	}

	pub fn source_label<'a>(&'a self, source_id: &'a str) -> &'a str {
		self.sources
			.iter()
			.find(|source| source.id == source_id)
			.map(|source| source.label.as_str())
			.unwrap_or(source_id)
	}

	pub fn is_default_source(&self, source_id: &str) -> bool {
		self.sources.iter().any(|source| source.default && source.id == source_id)
	}
}
