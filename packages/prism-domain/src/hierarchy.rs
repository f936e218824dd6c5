use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

/// Expand all descendants, however deep the graph goes.
pub const DEPTH_ALL: i32 = -1;

/// Parent/child DAG over tag or studio IDs, stored as arena-indexed
/// adjacency so traversal allocates nothing per hop. Corrupted input
/// (self-loops, cycles, multi-parent convergence, edges to unknown IDs) is
/// tolerated, never crashed on.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	ids: Vec<String>,
	index_of: AHashMap<String, u32>,
	children: Vec<Vec<u32>>,
}

impl Graph {
	/// Build from `(id, parent_ids)` pairs, the shape hierarchy entities
	/// carry. Parent IDs that never appear as a node are dropped.
	pub fn from_parent_edges<'a, I>(nodes: I) -> Self
	where
		I: IntoIterator<Item = (&'a str, &'a [String])> + Clone,
	{
		let mut ids = Vec::new();
		let mut index_of = AHashMap::new();

		for (id, _) in nodes.clone() {
			if index_of.contains_key(id) {
				continue;
			}

			index_of.insert(id.to_string(), ids.len() as u32);
			ids.push(id.to_string());
		}

		let mut children = vec![Vec::new(); ids.len()];

		for (id, parent_ids) in nodes {
			let child = index_of[id];

			for parent_id in parent_ids {
				let Some(&parent) = index_of.get(parent_id.as_str()) else {
					continue;
				};

				if parent != child && !children[parent as usize].contains(&child) {
					children[parent as usize].push(child);
				}
			}
		}

		Self { ids, index_of, children }
	}

	/// Self plus descendants up to `depth` edge-hops; `0` returns the roots
	/// unchanged, [`DEPTH_ALL`] runs to the fixed point. A visited set
	/// guards against cycles and multi-parent convergence, so the result is
	/// monotone non-decreasing in `depth` and stabilizes at the graph
	/// diameter.
	pub fn expand<'a, I>(&self, roots: I, depth: i32) -> AHashSet<String>
	where
		I: IntoIterator<Item = &'a str>,
	{
		let mut expanded = AHashSet::new();
		let mut visited = AHashSet::new();
		let mut queue = VecDeque::new();

		for root in roots {
			expanded.insert(root.to_string());

			if let Some(&index) = self.index_of.get(root)
				&& visited.insert(index)
			{
				queue.push_back((index, 0_u32));
			}
		}

		if depth == 0 {
			return expanded;
		}

		while let Some((index, hops)) = queue.pop_front() {
			if depth != DEPTH_ALL && hops >= depth as u32 {
				continue;
			}

			for &child in &self.children[index as usize] {
				if !visited.insert(child) {
					continue;
				}

				expanded.insert(self.ids[child as usize].clone());
				queue.push_back((child, hops + 1));
			}
		}

		expanded
	}

	/// One expansion per root, preserving root order. `IncludesAll` over a
	/// hierarchy field needs each original filter ID expanded independently:
	/// the entity must hit every original ID's expansion, not merely the
	/// union of them all.
	pub fn expand_each(&self, roots: &[String], depth: i32) -> Vec<AHashSet<String>> {
		roots.iter().map(|root| self.expand([root.as_str()], depth)).collect()
	}
}
