mod error;

pub mod db;
pub mod models;
pub mod overlay;
pub mod schema;

pub use db::Db;
pub use error::{Error, Result};
pub use overlay::PgOverlay;
