//! Error types for relaysim-core.

use thiserror::Error;

use crate::id::Id;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid identifier: {0:?} (expected 8 lowercase hex characters)")]
    InvalidId(String),

    #[error("duplicate identifier: {0}")]
    DuplicateId(Id),

    #[error("unknown page: {0}")]
    UnknownPage(Id),

    #[error("unknown component: {0}")]
    UnknownComponent(Id),

    #[error("unknown tab: {0}")]
    UnknownTab(Id),

    #[error("unknown sub-circuit definition: {0}")]
    UnknownDefinition(Id),

    #[error("sub-circuit template {name:?} has no FOOTPRINT page")]
    MissingFootprint { name: String },

    #[error("FOOTPRINT link {component} in template {name:?} has no link name")]
    UnnamedFootprintLink { name: String, component: Id },

    #[error("document has no pages")]
    EmptyDocument,
}

pub type Result<T> = std::result::Result<T, Error>;
