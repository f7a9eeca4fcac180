//! Format version gate.
//!
//! The `version` field of a `.rsim`/`.rsub` file is a SemVer triple. A file
//! is loadable when its major version matches the engine's format version
//! and its minor version does not exceed the engine's; the patch level is
//! ignored.

use semver::Version;

use crate::error::{Error, Result};

/// The document format version this engine writes and accepts.
pub const FORMAT_VERSION: &str = "1.0.0";

/// Parse and check a file's version string against [`FORMAT_VERSION`].
pub fn check_version(found: &str) -> Result<Version> {
    let file = Version::parse(found).map_err(|_| Error::MalformedVersion(found.to_string()))?;
    let engine = Version::parse(FORMAT_VERSION).expect("engine format version parses");

    if file.major != engine.major || file.minor > engine.minor {
        return Err(Error::IncompatibleVersion {
            found: found.to_string(),
            supported: FORMAT_VERSION.to_string(),
        });
    }
    Ok(file)
}
