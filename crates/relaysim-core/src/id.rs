//! Document identifiers.
//!
//! Every entity carries an 8-character lowercase hexadecimal token, unique
//! across the whole document regardless of entity kind. Internally an [`Id`]
//! is a `u32`; the hex spelling is its serialized form.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Unique identifier for a document or runtime entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(u32);

impl Id {
    /// Create an identifier from its raw value.
    pub const fn from_raw(raw: u32) -> Self {
        Id(raw)
    }

    /// Get the raw value.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Parse an identifier from exactly 8 lowercase hex characters.
    pub fn parse(s: &str) -> Result<Id> {
        if s.len() != 8 || !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(Error::InvalidId(s.to_string()));
        }
        let raw = u32::from_str_radix(s, 16).map_err(|_| Error::InvalidId(s.to_string()))?;
        Ok(Id(raw))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Id> {
        Id::parse(s)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Id, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an 8-character lowercase hex identifier")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Id, E> {
                Id::parse(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(IdVisitor)
    }
}

/// Build a hierarchical composite identifier (`page.component.pin.tab`).
///
/// Composite identifiers are produced on demand for lookups and diagnostics;
/// they are never stored.
pub fn composite_id(parts: &[Id]) -> String {
    let mut out = String::with_capacity(parts.len() * 9);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&part.to_string());
    }
    out
}

/// Allocator guaranteeing identifier uniqueness within one id space.
///
/// Fresh identifiers are drawn from the process RNG; a collision with an
/// already registered id simply redraws.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    used: HashSet<u32>,
}

impl IdAllocator {
    /// Create an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an externally supplied id. Returns `false` if it was already
    /// present.
    pub fn register(&mut self, id: Id) -> bool {
        self.used.insert(id.as_u32())
    }

    /// Register an id, failing on duplicates.
    pub fn register_unique(&mut self, id: Id) -> Result<()> {
        if self.register(id) {
            Ok(())
        } else {
            Err(Error::DuplicateId(id))
        }
    }

    /// Whether an id has been registered or allocated.
    pub fn contains(&self, id: Id) -> bool {
        self.used.contains(&id.as_u32())
    }

    /// Allocate a fresh, never-before-seen id.
    pub fn allocate(&mut self) -> Id {
        loop {
            let candidate: u32 = rand::random();
            if self.used.insert(candidate) {
                return Id(candidate);
            }
        }
    }

    /// Number of registered ids.
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// Whether no ids have been registered.
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
