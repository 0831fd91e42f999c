//! Guide assembly and persistence.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use evolve_model::{Document, TypeInformation, Version};

use crate::change::{GuideChange, ScriptId, ValueId};
use crate::comparator::{compare_endpoints, compare_models, compare_service, Session};
use crate::config::CompareConfig;
use crate::context::Script;
use crate::defaults::default_value;
use crate::error::CompareError;

/// The complete set of differences between two document versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationGuide {
    pub summary: String,
    /// Identity of the old document.
    pub id: String,
    pub from: Version,
    pub to: Version,
    pub compare_config: CompareConfig,
    pub changes: Vec<GuideChange>,
    #[serde(default)]
    pub scripts: BTreeMap<ScriptId, Script>,
    #[serde(default)]
    pub json_values: BTreeMap<ValueId, Value>,
    /// Full JSON of every model that received a breaking change, keyed by
    /// its name in the new document.
    #[serde(rename = "objectJSONs", default)]
    pub object_jsons: BTreeMap<String, Value>,
}

/// Compare two documents.
pub fn compare(lhs: &Document, rhs: &Document, config: &CompareConfig) -> MigrationGuide {
    let mut session = Session::new(lhs, rhs, config);
    let mut changes = Vec::new();

    if config.include_service_changes {
        changes.extend(compare_service(&session).into_iter().map(GuideChange::Service));
    }
    changes.extend(compare_models(&mut session).into_iter().map(GuideChange::Model));
    changes.extend(compare_endpoints(&mut session).into_iter().map(GuideChange::Endpoint));

    let Session {
        context,
        breaking_models,
        ..
    } = session;

    let object_jsons: BTreeMap<String, Value> = breaking_models
        .into_iter()
        .filter(|name| rhs.models.contains(name))
        .map(|name| {
            let value = default_value(&TypeInformation::reference(name.as_str()), &rhs.models);
            (name, value)
        })
        .collect();
    let (scripts, json_values) = context.into_parts();

    let mut guide = MigrationGuide {
        summary: String::new(),
        id: lhs.id.clone(),
        from: lhs.version(),
        to: rhs.version(),
        compare_config: config.clone(),
        changes,
        scripts,
        json_values,
        object_jsons,
    };
    guide.summary = guide.summarize();

    tracing::info!(
        id = %guide.id,
        from = %guide.from,
        to = %guide.to,
        changes = guide.changes.len(),
        breaking = guide.breaking_count(),
        unsupported = guide.unsupported_count(),
        scripts = guide.scripts.len(),
        values = guide.json_values.len(),
        "comparison finished"
    );
    guide
}

/// Compare two documents after checking that `baseline`, if given, was
/// built from the same old document.
pub fn compare_with_baseline(
    lhs: &Document,
    rhs: &Document,
    config: &CompareConfig,
    baseline: Option<&MigrationGuide>,
) -> Result<MigrationGuide, CompareError> {
    if let Some(baseline) = baseline {
        if baseline.id != lhs.id {
            return Err(CompareError::IncompatibleGuide {
                expected: lhs.id.clone(),
                found: baseline.id.clone(),
            });
        }
    }
    Ok(compare(lhs, rhs, config))
}

impl MigrationGuide {
    pub fn load(path: &Path) -> Result<Self, CompareError> {
        let text = std::fs::read_to_string(path).map_err(|source| CompareError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CompareError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, CompareError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), CompareError> {
        let mut text = self.to_json_pretty()?;
        text.push('\n');
        std::fs::write(path, text).map_err(|source| CompareError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn breaking_count(&self) -> usize {
        self.changes.iter().filter(|c| c.is_breaking()).count()
    }

    pub fn unsupported_count(&self) -> usize {
        self.changes.iter().filter(|c| c.is_unsupported()).count()
    }

    pub fn has_breaking(&self) -> bool {
        self.changes.iter().any(|c| c.is_breaking())
    }

    fn summarize(&self) -> String {
        if self.is_empty() {
            return format!("{} {} -> {}: no changes", self.id, self.from, self.to);
        }
        format!(
            "{} {} -> {}: {} change(s), {} breaking, {} unsupported, {} script(s), {} value(s)",
            self.id,
            self.from,
            self.to,
            self.changes.len(),
            self.breaking_count(),
            self.unsupported_count(),
            self.scripts.len(),
            self.json_values.len()
        )
    }

    /// Human-readable report grouped by severity.
    pub fn to_text(&self) -> String {
        let mut lines = vec![self.summary.clone(), String::new()];

        let line = |c: &GuideChange| {
            format!("  {} {} {}: {}", c.marker(), c.element(), c.id(), c.describe())
        };
        let sections: [(&str, Vec<String>); 3] = [
            (
                "UNSUPPORTED:",
                self.changes.iter().filter(|c| c.is_unsupported()).map(line).collect(),
            ),
            (
                "BREAKING:",
                self.changes
                    .iter()
                    .filter(|c| c.is_breaking() && !c.is_unsupported())
                    .map(line)
                    .collect(),
            ),
            (
                "NON_BREAKING:",
                self.changes.iter().filter(|c| !c.is_breaking()).map(line).collect(),
            ),
        ];

        for (title, entries) in sections {
            if entries.is_empty() {
                continue;
            }
            lines.push(title.to_string());
            lines.extend(entries);
            lines.push(String::new());
        }

        let unsolvable = self.changes.iter().filter(|c| !c.is_solvable()).count();
        if unsolvable > 0 {
            lines.push(format!("{} change(s) need manual migration", unsolvable));
        }

        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }
}
