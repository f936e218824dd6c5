pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Upstream catalog unavailable: {0}")]
	Upstream(String),
	#[error("Overlay store error: {0}")]
	Storage(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
}
