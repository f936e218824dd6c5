use crate::lookup::LookupMatch;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Ambiguous lookup for id '{id}': {} source-distinct matches.", matches.len())]
	AmbiguousLookup { id: String, matches: Vec<LookupMatch> },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Upstream catalog unavailable: {message}")]
	Upstream { message: String },
	#[error("Overlay store error: {message}")]
	Storage { message: String },
}

impl From<prism_catalog::Error> for Error {
	fn from(err: prism_catalog::Error) -> Self {
		match err {
			prism_catalog::Error::Upstream(message) => Self::Upstream { message },
			prism_catalog::Error::Storage(message) => Self::Storage { message },
			prism_catalog::Error::NotFound(message) => Self::NotFound { message },
			prism_catalog::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}
