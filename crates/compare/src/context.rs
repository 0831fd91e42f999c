//! Per-run store of conversion scripts and JSON values.
//!
//! Comparators never embed scripts or default values in their changes.
//! They store them here and reference the returned id; equal content
//! always maps to the same id within one run.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::change::{ScriptId, ValueId};

/// Source text of a conversion script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script(pub String);

impl Script {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Script {
    fn from(s: String) -> Self {
        Script(s)
    }
}

impl From<&str> for Script {
    fn from(s: &str) -> Self {
        Script(s.to_string())
    }
}

#[derive(Debug, Default)]
pub struct ComparisonContext {
    scripts: Vec<Script>,
    script_index: BTreeMap<String, ScriptId>,
    values: Vec<Value>,
    value_index: BTreeMap<String, ValueId>,
}

impl ComparisonContext {
    pub fn new() -> Self {
        ComparisonContext::default()
    }

    /// Store `script`, returning the id of an equal script if one exists.
    pub fn store_script(&mut self, script: impl Into<Script>) -> ScriptId {
        let script = script.into();
        if let Some(id) = self.script_index.get(script.as_str()) {
            return *id;
        }
        let id = ScriptId(self.scripts.len());
        self.script_index.insert(script.0.clone(), id);
        self.scripts.push(script);
        id
    }

    /// Store `value`, returning the id of a structurally equal value if one
    /// exists. Object key order does not matter.
    pub fn store_value(&mut self, value: Value) -> ValueId {
        let key = canonical_key(&value);
        if let Some(id) = self.value_index.get(&key) {
            return *id;
        }
        let id = ValueId(self.values.len());
        self.value_index.insert(key, id);
        self.values.push(value);
        id
    }

    pub fn script(&self, id: ScriptId) -> Option<&Script> {
        self.scripts.get(id.0)
    }

    pub fn value(&self, id: ValueId) -> Option<&Value> {
        self.values.get(id.0)
    }

    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Drain the store into id-keyed maps for the guide.
    pub fn into_parts(self) -> (BTreeMap<ScriptId, Script>, BTreeMap<ValueId, Value>) {
        let scripts = self
            .scripts
            .into_iter()
            .enumerate()
            .map(|(i, s)| (ScriptId(i), s))
            .collect();
        let values = self
            .values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (ValueId(i), v))
            .collect();
        (scripts, values)
    }
}

/// Serialized form used as the dedup key. `serde_json::Map` is ordered by
/// key (the `preserve_order` feature is not enabled), so equal values
/// always serialize identically.
fn canonical_key(value: &Value) -> String {
    value.to_string()
}
