use std::sync::{Arc, RwLock};

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use crate::{Result, query::fields::Queryable, snapshot::SnapshotBundle};
use prism_catalog::{
	entity::{Collection, EntityRef, EntityType, Gallery, Image, Scene, Tag},
	overlay::{Restriction, RestrictionMode},
	provider::OverlayStore,
};

/// Per-user exclusion sets for every entity type, valid for exactly one
/// catalog version. Resolution happens in three steps: hidden flags, then
/// per-type restrictions, then bottom-up emptiness cascade for performers,
/// studios and tags.
pub(crate) struct UserVisibility {
	version: u64,
	excluded: AHashMap<EntityType, Arc<AHashSet<EntityRef>>>,
}

impl UserVisibility {
	pub fn excluded(&self, entity_type: EntityType) -> Arc<AHashSet<EntityRef>> {
		self.excluded.get(&entity_type).cloned().unwrap_or_default()
	}
}

/// Visibility is recomputed per user whenever the snapshot version moves,
/// and can be dropped eagerly after restriction writes. Population races
/// are last-writer-wins; recomputation is idempotent.
#[derive(Default)]
pub(crate) struct VisibilityCache {
	entries: RwLock<AHashMap<String, Arc<UserVisibility>>>,
}

impl VisibilityCache {
	pub async fn user(
		&self,
		overlay: &dyn OverlayStore,
		bundle: &SnapshotBundle,
		user_id: &str,
	) -> Result<Arc<UserVisibility>> {
		let version = bundle.snapshot.version;

		{
			let guard = self.entries.read().unwrap_or_else(|err| err.into_inner());

			if let Some(entry) = guard.get(user_id)
				&& entry.version == version
			{
				return Ok(Arc::clone(entry));
			}
		}

		let visibility = Arc::new(compute(overlay, bundle, user_id).await?);

		debug!(user_id, version, "Resolved user visibility.");

		let mut guard = self.entries.write().unwrap_or_else(|err| err.into_inner());

		guard.insert(user_id.to_string(), Arc::clone(&visibility));

		Ok(visibility)
	}

	/// Drop a user's cached visibility, e.g. after a restriction write.
	pub fn invalidate(&self, user_id: &str) {
		let mut guard = self.entries.write().unwrap_or_else(|err| err.into_inner());

		guard.remove(user_id);
	}
}

async fn compute(
	overlay: &dyn OverlayStore,
	bundle: &SnapshotBundle,
	user_id: &str,
) -> Result<UserVisibility> {
	let snapshot = &bundle.snapshot;
	let elevated =
		overlay.profile(user_id).await?.map(|profile| profile.elevated).unwrap_or(false);

	// Elevated users skip restrictions; hidden flags and the emptiness
	// cascade still apply to them.
	let mut restrictions = AHashMap::new();

	if !elevated {
		for entity_type in EntityType::ALL {
			if let Some(restriction) = overlay.restriction(user_id, entity_type).await? {
				restrictions.insert(entity_type, restriction);
			}
		}
	}

	let scenes = base_exclusions(&snapshot.scenes, restrictions.get(&EntityType::Scene));
	let galleries = base_exclusions(&snapshot.galleries, restrictions.get(&EntityType::Gallery));
	let images = base_exclusions(&snapshot.images, restrictions.get(&EntityType::Image));
	let collections =
		base_exclusions(&snapshot.collections, restrictions.get(&EntityType::Collection));

	let mut performers =
		base_exclusions(&snapshot.performers, restrictions.get(&EntityType::Performer));
	let mut studios = base_exclusions(&snapshot.studios, restrictions.get(&EntityType::Studio));
	let mut tags = base_exclusions(&snapshot.tags, restrictions.get(&EntityType::Tag));

	let referenced = referenced_by_content(snapshot, &scenes, &galleries, &images, &collections);

	// A performer with no visible content left is excluded outright.
	for performer in &snapshot.performers {
		let entity_ref = performer.entity_ref();

		if !referenced.performers.contains(&entity_ref) {
			performers.insert(entity_ref);
		}
	}

	// Tags referenced only through still-visible performers stay visible.
	let mut tag_refs = referenced.tags;

	for performer in &snapshot.performers {
		if performers.contains(&performer.entity_ref()) {
			continue;
		}

		for tag_id in &performer.tag_ids {
			tag_refs.insert(EntityRef::new(tag_id, &performer.source_id));
		}
	}

	let non_empty_tags =
		with_ancestors(tag_refs, &snapshot.tags, |tag: &Tag| tag.parent_ids.as_slice());
	let non_empty_studios = with_ancestors(referenced.studios, &snapshot.studios, |studio| {
		studio.parent_ids.as_slice()
	});

	for tag in &snapshot.tags {
		let entity_ref = tag.entity_ref();

		if !non_empty_tags.contains(&entity_ref) {
			tags.insert(entity_ref);
		}
	}
	for studio in &snapshot.studios {
		let entity_ref = studio.entity_ref();

		if !non_empty_studios.contains(&entity_ref) {
			studios.insert(entity_ref);
		}
	}

	let excluded = AHashMap::from_iter([
		(EntityType::Scene, Arc::new(scenes)),
		(EntityType::Gallery, Arc::new(galleries)),
		(EntityType::Image, Arc::new(images)),
		(EntityType::Collection, Arc::new(collections)),
		(EntityType::Performer, Arc::new(performers)),
		(EntityType::Studio, Arc::new(studios)),
		(EntityType::Tag, Arc::new(tags)),
	]);

	Ok(UserVisibility { version: snapshot.version, excluded })
}

/// Hidden flags plus the user's restriction list for one type. Restriction
/// ids match on bare id across every source.
fn base_exclusions<T>(items: &[T], restriction: Option<&Restriction>) -> AHashSet<EntityRef>
where
	T: Queryable,
{
	let listed = restriction
		.map(|restriction| restriction.ids.iter().map(String::as_str).collect::<AHashSet<_>>())
		.unwrap_or_default();
	let mut excluded = AHashSet::new();

	for item in items {
		let restricted = match restriction.map(|restriction| restriction.mode) {
			Some(RestrictionMode::Include) => !listed.contains(item.id()),
			Some(RestrictionMode::Exclude) => listed.contains(item.id()),
			None => false,
		};

		if item.hidden() || restricted {
			excluded.insert(item.entity_ref());
		}
	}

	excluded
}

struct ContentRefs {
	performers: AHashSet<EntityRef>,
	tags: AHashSet<EntityRef>,
	studios: AHashSet<EntityRef>,
}

fn referenced_by_content(
	snapshot: &prism_catalog::snapshot::CatalogSnapshot,
	excluded_scenes: &AHashSet<EntityRef>,
	excluded_galleries: &AHashSet<EntityRef>,
	excluded_images: &AHashSet<EntityRef>,
	excluded_collections: &AHashSet<EntityRef>,
) -> ContentRefs {
	let mut refs = ContentRefs {
		performers: AHashSet::new(),
		tags: AHashSet::new(),
		studios: AHashSet::new(),
	};

	for scene in visible(&snapshot.scenes, excluded_scenes) {
		collect_scene(&mut refs, scene);
	}
	for gallery in visible(&snapshot.galleries, excluded_galleries) {
		collect_gallery(&mut refs, gallery);
	}
	for image in visible(&snapshot.images, excluded_images) {
		collect_image(&mut refs, image);
	}
	for collection in visible(&snapshot.collections, excluded_collections) {
		collect_collection(&mut refs, collection);
	}

	refs
}

fn visible<'a, T>(
	items: &'a [T],
	excluded: &'a AHashSet<EntityRef>,
) -> impl Iterator<Item = &'a T>
where
	T: Queryable,
{
	items.iter().filter(|item| !excluded.contains(&item.entity_ref()))
}

fn collect_scene(refs: &mut ContentRefs, scene: &Scene) {
	collect_ids(&mut refs.performers, &scene.performer_ids, &scene.source_id);
	collect_ids(&mut refs.tags, &scene.tag_ids, &scene.source_id);

	if let Some(studio_id) = &scene.studio_id {
		refs.studios.insert(EntityRef::new(studio_id, &scene.source_id));
	}
}

fn collect_gallery(refs: &mut ContentRefs, gallery: &Gallery) {
	collect_ids(&mut refs.performers, &gallery.performer_ids, &gallery.source_id);
	collect_ids(&mut refs.tags, &gallery.tag_ids, &gallery.source_id);

	if let Some(studio_id) = &gallery.studio_id {
		refs.studios.insert(EntityRef::new(studio_id, &gallery.source_id));
	}
}

fn collect_image(refs: &mut ContentRefs, image: &Image) {
	collect_ids(&mut refs.performers, &image.performer_ids, &image.source_id);
	collect_ids(&mut refs.tags, &image.tag_ids, &image.source_id);

	if let Some(studio_id) = &image.studio_id {
		refs.studios.insert(EntityRef::new(studio_id, &image.source_id));
	}
}

fn collect_collection(refs: &mut ContentRefs, collection: &Collection) {
	collect_ids(&mut refs.tags, &collection.tag_ids, &collection.source_id);

	if let Some(studio_id) = &collection.studio_id {
		refs.studios.insert(EntityRef::new(studio_id, &collection.source_id));
	}
}

fn collect_ids(refs: &mut AHashSet<EntityRef>, ids: &[String], source_id: &str) {
	for id in ids {
		refs.insert(EntityRef::new(id, source_id));
	}
}

/// Close a referenced set upward: an ancestor of a non-empty node is itself
/// non-empty. Parent edges stay within one source.
fn with_ancestors<T>(
	referenced: AHashSet<EntityRef>,
	items: &[T],
	parents: impl Fn(&T) -> &[String],
) -> AHashSet<EntityRef>
where
	T: Queryable,
{
	let by_ref = items
		.iter()
		.map(|item| ((item.source_id(), item.id()), item))
		.collect::<AHashMap<_, _>>();
	let mut non_empty = referenced;
	let mut stack = non_empty.iter().cloned().collect::<Vec<_>>();

	while let Some(entity_ref) = stack.pop() {
		let Some(item) =
			by_ref.get(&(entity_ref.source_id.as_str(), entity_ref.id.as_str())).copied()
		else {
			continue;
		};

		for parent_id in parents(item) {
			let parent_ref = EntityRef::new(parent_id, &entity_ref.source_id);

			if non_empty.insert(parent_ref.clone()) {
				stack.push(parent_ref);
			}
		}
	}

	non_empty
}
