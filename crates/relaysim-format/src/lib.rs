//! Document (`.rsim`) and sub-circuit template (`.rsub`) codec.
//!
//! Files are UTF-8 JSON. The top level carries a SemVer `version` (gated by
//! [`check_version`]), optional free-text `metadata`, a non-empty `pages`
//! array and an optional `sub_circuits` mapping. Identifiers are 8-char
//! lowercase hex; runtime state (pin/net signals, bridges) is never
//! persisted.
//!
//! Loading validates structure — identifier pattern and uniqueness, known
//! component types, rotation values — and refuses incompatible versions.
//! A malformed file yields an [`Error`], never a panic.

pub mod error;
pub mod io;
pub mod schema;
pub mod version;

mod convert;

pub use error::{Error, Result};
pub use io::{
    document_from_str, document_to_string, load_document, load_template, save_document,
    template_from_str,
};
pub use version::{check_version, FORMAT_VERSION};
