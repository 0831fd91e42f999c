//! evolve-model: schema model for versioned service API descriptions.
//!
//! A [`Document`] is a structural snapshot of one API version: service
//! metadata, endpoints with their parameters and responses, and a
//! [`ModelTable`] of named enum and object models. Shapes are described by
//! the recursive [`TypeInformation`] enum; recursion between models goes
//! through named references resolved against the table.
//!
//! Documents are built by [`from_json`] / [`load_document`], which reject
//! malformed input before any comparison sees it. After loading, documents
//! are read-only.

pub mod deserialize;
pub mod document;
pub mod identifier;
pub mod table;
pub mod types;

pub use deserialize::{from_json, load_document, validate, DocumentError};
pub use document::*;
pub use identifier::{DeltaIdentifier, Identifiable};
pub use table::ModelTable;
pub use types::*;
