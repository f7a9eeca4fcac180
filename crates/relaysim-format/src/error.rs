//! Error types for relaysim-format.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing or malformed version field: {0:?}")]
    MalformedVersion(String),

    #[error("file version {found} is not supported by engine version {supported}")]
    IncompatibleVersion { found: String, supported: String },

    #[error("document structure: {0}")]
    Structure(#[from] relaysim_core::Error),

    #[error("unknown component type: {0:?}")]
    UnknownComponentType(String),

    #[error("document has no pages")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, Error>;
