mod error;

pub mod entity;
pub mod overlay;
pub mod provider;
pub mod snapshot;

pub use error::{Error, Result};

use std::{future::Future, pin::Pin};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
