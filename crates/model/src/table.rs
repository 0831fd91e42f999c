//! The document's model arena.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::TypeInformation;

/// Owns a document's named models (enums and objects) in declaration order.
///
/// Cross references inside type trees are plain names resolved through
/// [`ModelTable::get`] / [`ModelTable::resolve`]; nothing in a tree points
/// at another tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TypeInformation>", into = "Vec<TypeInformation>")]
pub struct ModelTable {
    models: Vec<TypeInformation>,
    index: BTreeMap<String, usize>,
}

impl ModelTable {
    pub fn new(models: Vec<TypeInformation>) -> Self {
        let mut index = BTreeMap::new();
        for (i, model) in models.iter().enumerate() {
            if let Some(name) = model.model_name() {
                index.entry(name.name.clone()).or_insert(i);
            }
        }
        ModelTable { models, index }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeInformation> {
        self.models.iter()
    }

    pub fn as_slice(&self) -> &[TypeInformation] {
        &self.models
    }

    pub fn get(&self, name: &str) -> Option<&TypeInformation> {
        self.index.get(name).map(|&i| &self.models[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Follow a top-level `Reference` to the model it names. Any other
    /// shape, or a reference this table cannot resolve, is returned as is.
    pub fn resolve<'a>(&'a self, ty: &'a TypeInformation) -> &'a TypeInformation {
        match ty {
            TypeInformation::Reference(name) => self.get(name).unwrap_or(ty),
            other => other,
        }
    }

    /// Names declared more than once, in order of their second occurrence.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = std::collections::BTreeSet::new();
        let mut duplicates = Vec::new();
        for model in &self.models {
            if let Some(name) = model.model_name() {
                if !seen.insert(name.name.as_str()) {
                    duplicates.push(name.name.as_str());
                }
            }
        }
        duplicates
    }

    /// Models that are neither an enum nor an object.
    pub fn unnamed(&self) -> impl Iterator<Item = &TypeInformation> {
        self.models.iter().filter(|m| m.model_name().is_none())
    }
}

impl From<Vec<TypeInformation>> for ModelTable {
    fn from(models: Vec<TypeInformation>) -> Self {
        ModelTable::new(models)
    }
}

impl From<ModelTable> for Vec<TypeInformation> {
    fn from(table: ModelTable) -> Self {
        table.models
    }
}

impl<'a> IntoIterator for &'a ModelTable {
    type Item = &'a TypeInformation;
    type IntoIter = std::slice::Iter<'a, TypeInformation>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}
