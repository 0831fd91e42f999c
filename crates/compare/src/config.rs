//! Per-run comparison configuration.
//!
//! The configuration is embedded verbatim in every migration guide so that
//! a guide always records how it was produced. The CLI reads it from TOML
//! (snake_case keys); guides carry it as camelCase JSON. Both spellings are
//! accepted when decoding.

use serde::{Deserialize, Serialize};

/// Relative weight of each similarity component in relaxed matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    /// Textual similarity of the identifiers / names.
    pub name: f64,
    /// Textual similarity of external identifiers (paths, raw values).
    pub identifiers: f64,
    /// Structural compatibility of nested attributes.
    pub structure: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        SimilarityWeights {
            name: 0.5,
            identifiers: 0.3,
            structure: 0.2,
        }
    }
}

/// Threshold and weights for one relaxed matching pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    /// A pair is accepted only when its score is strictly greater.
    pub threshold: f64,
    pub weights: SimilarityWeights,
}

impl MatchPolicy {
    pub fn new(threshold: f64) -> Self {
        MatchPolicy {
            threshold,
            weights: SimilarityWeights::default(),
        }
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;

/// Options controlling one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompareConfig {
    /// Pair unmatched endpoints and parameters by similarity (rename detection).
    #[serde(alias = "relaxed_matching")]
    pub relaxed_matching: bool,
    /// Pair unmatched models, properties and enum cases by similarity.
    #[serde(alias = "relaxed_model_matching")]
    pub relaxed_model_matching: bool,
    #[serde(alias = "similarity_threshold")]
    pub similarity_threshold: f64,
    pub weights: SimilarityWeights,
    /// Whether removing a required parameter is reported as solvable.
    #[serde(alias = "removed_required_parameter_solvable")]
    pub removed_required_parameter_solvable: bool,
    /// Compare service metadata (version, host, exporters).
    #[serde(alias = "include_service_changes")]
    pub include_service_changes: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        CompareConfig {
            relaxed_matching: false,
            relaxed_model_matching: false,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            weights: SimilarityWeights::default(),
            removed_required_parameter_solvable: false,
            include_service_changes: true,
        }
    }
}

impl CompareConfig {
    pub fn relaxed() -> Self {
        CompareConfig {
            relaxed_matching: true,
            ..CompareConfig::default()
        }
    }

    fn policy(&self, enabled: bool) -> Option<MatchPolicy> {
        enabled.then_some(MatchPolicy {
            threshold: self.similarity_threshold,
            weights: self.weights,
        })
    }

    /// Policy for endpoints and parameters, if relaxed matching is enabled.
    pub fn endpoint_policy(&self) -> Option<MatchPolicy> {
        self.policy(self.relaxed_matching)
    }

    /// Policy for models, properties and enum cases, if enabled.
    pub fn model_policy(&self) -> Option<MatchPolicy> {
        self.policy(self.relaxed_model_matching)
    }
}
