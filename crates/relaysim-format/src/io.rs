//! Loading and saving documents and templates.

use std::fs;
use std::path::Path;

use relaysim_core::document::Document;
use relaysim_core::subcircuit::SubCircuitTemplate;

use crate::convert::{document_from_file, document_to_file, page_from_file};
use crate::error::{Error, Result};
use crate::schema::{DocumentFile, VersionProbe};
use crate::version::check_version;

/// Parse a document from its JSON text.
pub fn document_from_str(json: &str) -> Result<Document> {
    // Read the version first so an incompatible file is rejected for its
    // version, not for whatever shape change came with it.
    let probe: VersionProbe = serde_json::from_str(json)?;
    let version = probe
        .version
        .ok_or_else(|| Error::MalformedVersion("<missing>".to_string()))?;
    check_version(&version)?;

    let file: DocumentFile = serde_json::from_str(json)?;
    document_from_file(file)
}

/// Serialize a document to pretty-printed JSON.
///
/// Entity collections keep insertion order, so serializing the same document
/// twice yields identical bytes.
pub fn document_to_string(document: &Document) -> Result<String> {
    let file = document_to_file(document);
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Load a `.rsim` document from disk.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let json = fs::read_to_string(path)?;
    document_from_str(&json)
}

/// Save a document as `.rsim` JSON.
pub fn save_document(path: impl AsRef<Path>, document: &Document) -> Result<()> {
    let json = document_to_string(document)?;
    fs::write(path, json)?;
    Ok(())
}

/// Parse a `.rsub` template from its JSON text.
///
/// Templates share the document shape but must contain a FOOTPRINT page
/// whose Link components all carry non-empty link names.
pub fn template_from_str(json: &str, source_path: Option<&str>) -> Result<SubCircuitTemplate> {
    let probe: VersionProbe = serde_json::from_str(json)?;
    let version = probe
        .version
        .ok_or_else(|| Error::MalformedVersion("<missing>".to_string()))?;
    check_version(&version)?;

    let file: DocumentFile = serde_json::from_str(json)?;
    if file.pages.is_empty() {
        return Err(Error::NoPages);
    }

    let name = file
        .metadata
        .as_ref()
        .and_then(|m| m.title.clone())
        .or_else(|| {
            source_path
                .and_then(|p| Path::new(p).file_stem())
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "sub-circuit".to_string());

    let mut pages = Vec::with_capacity(file.pages.len());
    for page_file in file.pages {
        pages.push(page_from_file(page_file)?);
    }

    let template = SubCircuitTemplate {
        name,
        source_path: source_path.map(String::from),
        pages,
    };
    template.validate()?;
    Ok(template)
}

/// Load a `.rsub` sub-circuit template from disk.
pub fn load_template(path: impl AsRef<Path>) -> Result<SubCircuitTemplate> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    template_from_str(&json, Some(&path.to_string_lossy()))
}
