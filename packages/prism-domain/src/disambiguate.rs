use ahash::AHashMap;

/// One display-name candidate, as hydration produces it.
#[derive(Clone, Debug)]
pub struct NameEntry {
	pub id: String,
	pub name: String,
	pub source_id: String,
	pub source_label: String,
	pub default_source: bool,
}

/// Resolve display names for entities whose IDs collide across upstream
/// sources. Only entries whose name collides with an entry from a
/// *different* source get the source label appended; the entry from the
/// canonical/default source keeps its bare name. Hash grouping keeps this
/// linear in the number of entries.
pub fn disambiguate(entries: &[NameEntry]) -> Vec<String> {
	let mut groups: AHashMap<String, Vec<usize>> = AHashMap::new();

	for (index, entry) in entries.iter().enumerate() {
		groups.entry(entry.name.to_lowercase()).or_default().push(index);
	}

	let mut names: Vec<String> = entries.iter().map(|entry| entry.name.clone()).collect();

	for indices in groups.values() {
		if indices.len() < 2 {
			continue;
		}

		let spans_sources = indices
			.iter()
			.any(|&index| entries[index].source_id != entries[indices[0]].source_id);

		if !spans_sources {
			continue;
		}

		for &index in indices {
			let entry = &entries[index];

			if entry.default_source {
				continue;
			}

			names[index] = format!("{} ({})", entry.name, entry.source_label);
		}
	}

	names
}
