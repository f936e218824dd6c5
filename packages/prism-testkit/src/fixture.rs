use time::OffsetDateTime;

use prism_catalog::{
	entity::{
		Collection, Gallery, Image, Performer, Scene, SourceInstance, Studio, Tag,
	},
	snapshot::CatalogSnapshot,
};

pub fn source(id: &str, label: &str, default: bool) -> SourceInstance {
	SourceInstance { id: id.to_string(), label: label.to_string(), default }
}

pub fn snapshot(version: u64, sources: Vec<SourceInstance>) -> CatalogSnapshot {
	CatalogSnapshot { version, sources, ..CatalogSnapshot::default() }
}

pub fn scene(id: &str, source_id: &str, title: &str) -> Scene {
	Scene {
		id: id.to_string(),
		source_id: source_id.to_string(),
		title: title.to_string(),
		details: String::new(),
		path: format!("/media/{id}.mp4"),
		date: None,
		created_at: OffsetDateTime::UNIX_EPOCH,
		duration_secs: 60.0,
		studio_id: None,
		performer_ids: Vec::new(),
		tag_ids: Vec::new(),
		gallery_ids: Vec::new(),
		collection_ids: Vec::new(),
		hidden: false,
	}
}

pub fn performer(id: &str, source_id: &str, name: &str) -> Performer {
	Performer {
		id: id.to_string(),
		source_id: source_id.to_string(),
		name: name.to_string(),
		details: String::new(),
		gender: None,
		birthdate: None,
		tag_ids: Vec::new(),
		hidden: false,
	}
}

pub fn studio(id: &str, source_id: &str, name: &str) -> Studio {
	Studio {
		id: id.to_string(),
		source_id: source_id.to_string(),
		name: name.to_string(),
		details: String::new(),
		parent_ids: Vec::new(),
		hidden: false,
	}
}

pub fn tag(id: &str, source_id: &str, name: &str) -> Tag {
	Tag {
		id: id.to_string(),
		source_id: source_id.to_string(),
		name: name.to_string(),
		description: String::new(),
		parent_ids: Vec::new(),
		hidden: false,
	}
}

pub fn gallery(id: &str, source_id: &str, title: &str) -> Gallery {
	Gallery {
		id: id.to_string(),
		source_id: source_id.to_string(),
		title: title.to_string(),
		path: format!("/media/{id}"),
		date: None,
		studio_id: None,
		performer_ids: Vec::new(),
		tag_ids: Vec::new(),
		scene_ids: Vec::new(),
		hidden: false,
	}
}

pub fn image(id: &str, source_id: &str, title: &str) -> Image {
	Image {
		id: id.to_string(),
		source_id: source_id.to_string(),
		title: title.to_string(),
		path: format!("/media/{id}.jpg"),
		date: None,
		studio_id: None,
		performer_ids: Vec::new(),
		tag_ids: Vec::new(),
		gallery_ids: Vec::new(),
		hidden: false,
	}
}

pub fn collection(id: &str, source_id: &str, name: &str) -> Collection {
	Collection {
		id: id.to_string(),
		source_id: source_id.to_string(),
		name: name.to_string(),
		description: String::new(),
		studio_id: None,
		tag_ids: Vec::new(),
		scene_ids: Vec::new(),
		hidden: false,
	}
}
