//! Per-kind comparators.
//!
//! Every comparator receives an already matched pair (or a matched
//! collection) and returns plain change records. Matched pairs come first
//! in `lhs` order, followed by removals, then additions in `rhs` order.
//! Nothing in this layer fails; discrepancies without a safe conversion
//! become `Unsupported` changes.

mod endpoint;
mod enum_case;
mod identifier;
mod model;
mod parameter;
mod property;
mod rules;
mod service;

use std::collections::BTreeSet;

use evolve_model::Document;

use crate::config::CompareConfig;
use crate::context::ComparisonContext;

pub(crate) use endpoint::compare_endpoints;
pub(crate) use model::compare_models;
pub(crate) use service::compare_service;

/// State of one comparison run.
pub(crate) struct Session<'a> {
    pub lhs: &'a Document,
    pub rhs: &'a Document,
    pub config: &'a CompareConfig,
    pub context: ComparisonContext,
    /// Names (in `rhs`) of models that received a breaking nested change.
    pub breaking_models: BTreeSet<String>,
}

impl<'a> Session<'a> {
    pub fn new(lhs: &'a Document, rhs: &'a Document, config: &'a CompareConfig) -> Self {
        Session {
            lhs,
            rhs,
            config,
            context: ComparisonContext::new(),
            breaking_models: BTreeSet::new(),
        }
    }
}

/// Log the shape of one matched collection.
fn log_matches<T>(kind: &str, scope: &str, matches: &crate::matching::Matches<'_, T>) {
    tracing::debug!(
        kind,
        scope,
        matched = matches.matched.len(),
        renamed = matches.matched.iter().filter(|m| m.is_rename()).count(),
        removed = matches.removed.len(),
        added = matches.added.len(),
        "matched collection"
    );
}
