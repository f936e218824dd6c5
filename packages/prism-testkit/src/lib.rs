//! In-memory catalog and overlay fakes plus entity fixtures, shared by the
//! engine and store test suites.

mod fixture;
mod memory;

pub use fixture::{
	collection, gallery, image, performer, scene, snapshot, source, studio, tag,
};
pub use memory::{MemoryCatalog, MemoryOverlay};
