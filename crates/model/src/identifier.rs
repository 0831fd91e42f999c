//! Stable identities used to pair entities across two document versions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of a comparable entity (endpoint, parameter, property,
/// enum case, model, exporter).
///
/// Equality and ordering are those of the underlying string. Within one
/// document the identifier is unique among siblings of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeltaIdentifier(String);

impl DeltaIdentifier {
    pub fn new(raw: impl Into<String>) -> Self {
        DeltaIdentifier(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeltaIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeltaIdentifier {
    fn from(raw: &str) -> Self {
        DeltaIdentifier(raw.to_string())
    }
}

impl From<String> for DeltaIdentifier {
    fn from(raw: String) -> Self {
        DeltaIdentifier(raw)
    }
}

impl AsRef<str> for DeltaIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An entity that carries a [`DeltaIdentifier`].
pub trait Identifiable {
    fn delta_identifier(&self) -> DeltaIdentifier;
}
