use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Storage I/O failed at {path:?}.")]
	Io { path: PathBuf, source: std::io::Error },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("Invalid storage key: {0}")]
	InvalidKey(String),
}

/// Why a stored value was rejected on read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
	#[error("Stored value is not valid JSON for this shape: {0}")]
	Parse(String),
	#[error("Stored value violates its shape: {0}")]
	Invalid(String),
}
