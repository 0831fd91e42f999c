//! Loading documents from JSON.
//!
//! The main entry point is [`from_json`], which takes a
//! `&serde_json::Value` and produces a validated [`Document`]. Comparison
//! code assumes every document it receives came through here.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::document::Document;
use crate::types::{PrimitiveType, TypeInformation};

/// Errors while loading a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A dictionary key is not a primitive type.
    #[error("unsupported dictionary key at {path}: keys must be primitive types")]
    UnsupportedDictionaryKey { path: String },

    /// Two siblings of the same kind share an identifier.
    #[error("duplicate {kind} identifier '{id}' in {scope}")]
    DuplicateIdentifier {
        kind: &'static str,
        id: String,
        scope: String,
    },

    /// A `reference` names a model the document does not declare.
    #[error("unresolved reference to model '{name}' in {scope}")]
    UnresolvedReference { name: String, scope: String },

    /// A top-level model is neither an enum nor an object.
    #[error("top-level model of kind '{kind}' has no name")]
    UnnamedModel { kind: String },
}

/// Read and validate a document file.
pub fn load_document(path: &Path) -> Result<Document, DocumentError> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text)?;
    let document = from_json(&value)?;
    tracing::debug!(
        path = %path.display(),
        id = %document.id,
        version = %document.version(),
        endpoints = document.endpoints.len(),
        models = document.models.len(),
        "loaded document"
    );
    Ok(document)
}

/// Decode and validate a document.
///
/// Dictionary keys are checked on the raw JSON first so that a malformed
/// key is reported as [`DocumentError::UnsupportedDictionaryKey`] instead of
/// a generic decoding error. Only schema positions are inspected; free-form
/// values such as exporter settings may contain any keys.
pub fn from_json(value: &Value) -> Result<Document, DocumentError> {
    check_schema_positions(value)?;
    let document: Document = serde_json::from_value(value.clone())?;
    validate(&document)?;
    Ok(document)
}

// ── Raw checks ──────────────────────────────────────────────────────

fn check_schema_positions(document: &Value) -> Result<(), DocumentError> {
    for (i, model) in array(document.get("models")).iter().enumerate() {
        check_type_node(model, &format!("$.models[{}]", i))?;
    }
    for (i, endpoint) in array(document.get("endpoints")).iter().enumerate() {
        let path = format!("$.endpoints[{}]", i);
        for (j, parameter) in array(endpoint.get("parameters")).iter().enumerate() {
            if let Some(ty) = parameter.get("type") {
                check_type_node(ty, &format!("{}.parameters[{}].type", path, j))?;
            }
        }
        if let Some(response) = endpoint.get("response") {
            check_type_node(response, &format!("{}.response", path))?;
        }
    }
    Ok(())
}

fn array(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Walk one serialized `TypeInformation`. Shapes that fail to decode are
/// left to the typed decoder.
fn check_type_node(node: &Value, path: &str) -> Result<(), DocumentError> {
    let Some(map) = node.as_object() else {
        return Ok(());
    };
    for (tag, inner) in map {
        let path = format!("{}.{}", path, tag);
        match tag.as_str() {
            "repeated" | "optional" => check_type_node(inner, &path)?,
            "dictionary" => {
                let key_ok = inner
                    .get("key")
                    .and_then(Value::as_str)
                    .and_then(PrimitiveType::from_wire)
                    .is_some();
                if !key_ok {
                    return Err(DocumentError::UnsupportedDictionaryKey {
                        path: format!("{}.key", path),
                    });
                }
                if let Some(value) = inner.get("value") {
                    check_type_node(value, &format!("{}.value", path))?;
                }
            }
            "object" => {
                for (k, property) in array(inner.get("properties")).iter().enumerate() {
                    if let Some(ty) = property.get("type") {
                        check_type_node(ty, &format!("{}.properties[{}].type", path, k))?;
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

// ── Validation ──────────────────────────────────────────────────────

/// Check sibling identifier uniqueness and reference resolution.
pub fn validate(document: &Document) -> Result<(), DocumentError> {
    if let Some(model) = document.models.unnamed().next() {
        return Err(DocumentError::UnnamedModel {
            kind: model.kind().to_string(),
        });
    }
    if let Some(name) = document.models.duplicate_names().first() {
        return Err(DocumentError::DuplicateIdentifier {
            kind: "model",
            id: name.to_string(),
            scope: "document".to_string(),
        });
    }

    unique(
        "endpoint",
        "document",
        document.endpoints.iter().map(|e| e.id.as_str()),
    )?;

    for model in &document.models {
        let scope = format!("model '{}'", model.type_name());
        validate_type(document, model, &scope)?;
    }

    for endpoint in &document.endpoints {
        let scope = format!("endpoint '{}'", endpoint.id);
        unique(
            "parameter",
            &scope,
            endpoint.parameters.iter().map(|p| p.name.as_str()),
        )?;
        for parameter in &endpoint.parameters {
            validate_type(document, &parameter.type_information, &scope)?;
        }
        validate_type(document, &endpoint.response, &scope)?;
    }

    Ok(())
}

fn validate_type(document: &Document, ty: &TypeInformation, scope: &str) -> Result<(), DocumentError> {
    match ty {
        TypeInformation::Scalar(_) => Ok(()),
        TypeInformation::Repeated(inner) | TypeInformation::Optional(inner) => {
            validate_type(document, inner, scope)
        }
        TypeInformation::Dictionary { value, .. } => validate_type(document, value, scope),
        TypeInformation::Enum { cases, .. } => {
            unique("enum case", scope, cases.iter().map(|c| c.name.as_str()))?;
            unique("raw value", scope, cases.iter().map(|c| c.raw_value.as_str()))
        }
        TypeInformation::Object { properties, .. } => {
            unique("property", scope, properties.iter().map(|p| p.name.as_str()))?;
            for property in properties {
                validate_type(document, &property.type_information, scope)?;
            }
            Ok(())
        }
        TypeInformation::Reference(name) => {
            if document.models.contains(name) {
                Ok(())
            } else {
                Err(DocumentError::UnresolvedReference {
                    name: name.clone(),
                    scope: scope.to_string(),
                })
            }
        }
    }
}

fn unique<'a>(
    kind: &'static str,
    scope: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), DocumentError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DocumentError::DuplicateIdentifier {
                kind,
                id: id.to_string(),
                scope: scope.to_string(),
            });
        }
    }
    Ok(())
}
