//! Pairing of same-kind entities across two document versions.
//!
//! Exact matching pairs entities by [`DeltaIdentifier`]. Relaxed matching
//! additionally pairs leftover removals with leftover additions when their
//! similarity exceeds a threshold, turning a delete/add pair into a rename.
//! The pairing is greedy in `lhs` order and never revisited, so the result
//! depends only on the inputs and the policy.

use std::collections::{BTreeMap, BTreeSet};

use evolve_model::{
    DeltaIdentifier, EnumCase, Endpoint, Identifiable, Parameter, TypeInformation, TypeProperty,
};
use similar::TextDiff;

use crate::config::{MatchPolicy, SimilarityWeights};

/// A pair of entities considered the same across versions.
#[derive(Debug)]
pub struct Matched<'a, T> {
    pub lhs: &'a T,
    pub rhs: &'a T,
    /// Present only for pairs produced by relaxed matching.
    pub similarity: Option<f64>,
}

impl<T> Clone for Matched<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Matched<'_, T> {}

impl<T> Matched<'_, T> {
    pub fn is_rename(&self) -> bool {
        self.similarity.is_some()
    }
}

/// Partition of two collections into pairs, removals and additions.
#[derive(Debug)]
pub struct Matches<'a, T> {
    /// Ordered by position in `lhs`.
    pub matched: Vec<Matched<'a, T>>,
    /// Ordered by position in `lhs`.
    pub removed: Vec<&'a T>,
    /// Ordered by position in `rhs`.
    pub added: Vec<&'a T>,
}

/// Exact pairing by position: `(lhs, rhs)` index pairs in `lhs` order,
/// unmatched `lhs` indices, unmatched `rhs` indices.
struct Pairing {
    matched: Vec<(usize, usize)>,
    removed: Vec<usize>,
    added: Vec<usize>,
}

fn pair_by_identifier<T: Identifiable>(lhs: &[T], rhs: &[T]) -> Pairing {
    let rhs_index: BTreeMap<DeltaIdentifier, usize> = rhs
        .iter()
        .enumerate()
        .map(|(i, e)| (e.delta_identifier(), i))
        .collect();

    let mut matched = Vec::new();
    let mut removed = Vec::new();
    let mut consumed = BTreeSet::new();

    for (l, entity) in lhs.iter().enumerate() {
        match rhs_index.get(&entity.delta_identifier()) {
            Some(&r) if consumed.insert(r) => matched.push((l, r)),
            _ => removed.push(l),
        }
    }

    let added = (0..rhs.len()).filter(|r| !consumed.contains(r)).collect();
    Pairing {
        matched,
        removed,
        added,
    }
}

/// Pair entities with equal identifiers.
pub fn match_exact<'a, T: Identifiable>(lhs: &'a [T], rhs: &'a [T]) -> Matches<'a, T> {
    let pairing = pair_by_identifier(lhs, rhs);
    Matches {
        matched: pairing
            .matched
            .into_iter()
            .map(|(l, r)| Matched {
                lhs: &lhs[l],
                rhs: &rhs[r],
                similarity: None,
            })
            .collect(),
        removed: pairing.removed.into_iter().map(|l| &lhs[l]).collect(),
        added: pairing.added.into_iter().map(|r| &rhs[r]).collect(),
    }
}

/// Exact matching followed by greedy similarity pairing of the leftovers.
pub fn match_relaxed<'a, T: Similar>(
    lhs: &'a [T],
    rhs: &'a [T],
    policy: &MatchPolicy,
) -> Matches<'a, T> {
    let pairing = pair_by_identifier(lhs, rhs);

    let mut paired: Vec<(usize, Matched<'a, T>)> = pairing
        .matched
        .iter()
        .map(|&(l, r)| {
            (
                l,
                Matched {
                    lhs: &lhs[l],
                    rhs: &rhs[r],
                    similarity: None,
                },
            )
        })
        .collect();
    let mut removed = Vec::new();
    let mut consumed = vec![false; pairing.added.len()];

    for &l in &pairing.removed {
        let candidate = &lhs[l];
        let mut best: Option<(usize, f64)> = None;
        for (i, &r) in pairing.added.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            let score = candidate.similarity(&rhs[r]).combine(&policy.weights);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        match best {
            Some((i, score)) if score > policy.threshold => {
                consumed[i] = true;
                let addition = &rhs[pairing.added[i]];
                tracing::debug!(
                    from = %candidate.delta_identifier(),
                    to = %addition.delta_identifier(),
                    score,
                    "relaxed match"
                );
                paired.push((
                    l,
                    Matched {
                        lhs: candidate,
                        rhs: addition,
                        similarity: Some(score),
                    },
                ));
            }
            _ => removed.push(candidate),
        }
    }

    paired.sort_by_key(|(l, _)| *l);
    let added = pairing
        .added
        .iter()
        .zip(consumed)
        .filter(|(_, used)| !used)
        .map(|(&r, _)| &rhs[r])
        .collect();

    Matches {
        matched: paired.into_iter().map(|(_, m)| m).collect(),
        removed,
        added,
    }
}

/// Relaxed matching when a policy is given, exact matching otherwise.
pub fn match_entities<'a, T: Similar>(
    lhs: &'a [T],
    rhs: &'a [T],
    policy: Option<&MatchPolicy>,
) -> Matches<'a, T> {
    match policy {
        Some(policy) => match_relaxed(lhs, rhs, policy),
        None => match_exact(lhs, rhs),
    }
}

// ── Similarity ──────────────────────────────────────────────────────

/// Components of a similarity score, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScore {
    pub name: f64,
    pub identifiers: Option<f64>,
    pub structure: Option<f64>,
}

impl SimilarityScore {
    /// Weighted mean over the components that are present.
    pub fn combine(&self, weights: &SimilarityWeights) -> f64 {
        let mut total = weights.name * self.name;
        let mut weight = weights.name;
        if let Some(identifiers) = self.identifiers {
            total += weights.identifiers * identifiers;
            weight += weights.identifiers;
        }
        if let Some(structure) = self.structure {
            total += weights.structure * structure;
            weight += weights.structure;
        }
        if weight <= 0.0 {
            0.0
        } else {
            total / weight
        }
    }
}

/// An entity that can be scored against a candidate of the same kind.
pub trait Similar: Identifiable {
    fn similarity(&self, other: &Self) -> SimilarityScore;
}

/// Normalized textual similarity in `[0, 1]`, case-insensitive.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return 1.0;
    }
    TextDiff::from_chars(a.as_str(), b.as_str()).ratio() as f64
}

/// Jaccard index of two name sets; two empty sets are identical.
fn jaccard<'a>(a: impl Iterator<Item = &'a str>, b: impl Iterator<Item = &'a str>) -> f64 {
    let a: BTreeSet<&str> = a.collect();
    let b: BTreeSet<&str> = b.collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

fn agreement(flags: &[bool]) -> f64 {
    if flags.is_empty() {
        return 1.0;
    }
    flags.iter().filter(|f| **f).count() as f64 / flags.len() as f64
}

fn same_shape(a: &TypeInformation, b: &TypeInformation) -> bool {
    a.unwrapped().type_name() == b.unwrapped().type_name()
}

impl Similar for Endpoint {
    fn similarity(&self, other: &Self) -> SimilarityScore {
        let keys: BTreeSet<&String> = self
            .identifiers
            .keys()
            .chain(other.identifiers.keys())
            .collect();
        let identifiers = if keys.is_empty() {
            None
        } else {
            let sum: f64 = keys
                .iter()
                .map(|k| match (self.identifiers.get(*k), other.identifiers.get(*k)) {
                    (Some(a), Some(b)) => text_similarity(a, b),
                    _ => 0.0,
                })
                .sum();
            Some(sum / keys.len() as f64)
        };

        let parameters = jaccard(
            self.parameters.iter().map(|p| p.name.as_str()),
            other.parameters.iter().map(|p| p.name.as_str()),
        );
        let flags = agreement(&[
            self.communication_pattern == other.communication_pattern,
            same_shape(&self.response, &other.response),
        ]);

        SimilarityScore {
            name: text_similarity(self.id.as_str(), other.id.as_str()),
            identifiers,
            structure: Some((parameters + flags * 2.0) / 3.0),
        }
    }
}

impl Similar for Parameter {
    fn similarity(&self, other: &Self) -> SimilarityScore {
        SimilarityScore {
            name: text_similarity(&self.name, &other.name),
            identifiers: None,
            structure: Some(agreement(&[
                self.kind == other.kind,
                self.necessity == other.necessity,
                same_shape(&self.type_information, &other.type_information),
            ])),
        }
    }
}

impl Similar for TypeProperty {
    fn similarity(&self, other: &Self) -> SimilarityScore {
        SimilarityScore {
            name: text_similarity(&self.name, &other.name),
            identifiers: None,
            structure: Some(agreement(&[
                self.necessity == other.necessity,
                same_shape(&self.type_information, &other.type_information),
            ])),
        }
    }
}

impl Similar for EnumCase {
    fn similarity(&self, other: &Self) -> SimilarityScore {
        SimilarityScore {
            name: text_similarity(&self.name, &other.name),
            identifiers: Some(text_similarity(&self.raw_value, &other.raw_value)),
            structure: None,
        }
    }
}

impl Similar for TypeInformation {
    fn similarity(&self, other: &Self) -> SimilarityScore {
        let members = match (self, other) {
            (TypeInformation::Object { .. }, TypeInformation::Object { .. }) => jaccard(
                self.properties().iter().map(|p| p.name.as_str()),
                other.properties().iter().map(|p| p.name.as_str()),
            ),
            (TypeInformation::Enum { .. }, TypeInformation::Enum { .. }) => jaccard(
                self.cases().iter().map(|c| c.name.as_str()),
                other.cases().iter().map(|c| c.name.as_str()),
            ),
            _ => 0.0,
        };
        SimilarityScore {
            name: text_similarity(&self.type_name(), &other.type_name()),
            identifiers: None,
            structure: Some(members),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evolve_model::{Necessity, ParameterKind, PrimitiveType};

    fn user_response() -> TypeInformation {
        TypeInformation::reference("User")
    }

    fn id_parameter() -> Parameter {
        Parameter::new(
            "id",
            TypeInformation::scalar(PrimitiveType::Uuid),
            ParameterKind::Path,
            Necessity::Required,
        )
    }

    fn endpoint(id: &str, path: &str) -> Endpoint {
        Endpoint::new(id, path, user_response()).with_parameter(id_parameter())
    }

    fn ids<T: Identifiable>(items: &[&T]) -> Vec<String> {
        items.iter().map(|e| e.delta_identifier().to_string()).collect()
    }

    #[test]
    fn exact_matching_partitions_by_identifier() {
        let lhs = vec![
            endpoint("getUser", "/user/{id}"),
            endpoint("deleteUser", "/user/{id}"),
        ];
        let rhs = vec![
            endpoint("createUser", "/user"),
            endpoint("getUser", "/user/{id}"),
        ];
        let m = match_exact(&lhs, &rhs);
        assert_eq!(m.matched.len(), 1);
        assert_eq!(m.matched[0].lhs.id.as_str(), "getUser");
        assert!(!m.matched[0].is_rename());
        assert_eq!(ids(&m.removed), vec!["deleteUser"]);
        assert_eq!(ids(&m.added), vec!["createUser"]);
    }

    #[test]
    fn relaxed_matching_pairs_renamed_endpoint() {
        let lhs = vec![endpoint("getUser", "/user/{id}")];
        let rhs = vec![endpoint("fetchUser", "/user/{id}")];
        let m = match_relaxed(&lhs, &rhs, &MatchPolicy::default());
        assert_eq!(m.matched.len(), 1);
        assert!(m.matched[0].is_rename());
        assert!(m.removed.is_empty());
        assert!(m.added.is_empty());
    }

    #[test]
    fn relaxed_matching_respects_threshold() {
        let lhs = vec![endpoint("getUser", "/user/{id}")];
        let rhs = vec![endpoint("fetchUser", "/user/{id}")];
        let m = match_relaxed(&lhs, &rhs, &MatchPolicy::new(0.99));
        assert!(m.matched.is_empty());
        assert_eq!(m.removed.len(), 1);
        assert_eq!(m.added.len(), 1);
    }

    #[test]
    fn relaxed_matching_prefers_the_best_candidate() {
        let lhs = vec![endpoint("getUser", "/user/{id}")];
        let rhs = vec![
            endpoint("listOrders", "/orders"),
            endpoint("getUsers", "/user/{id}"),
        ];
        let m = match_relaxed(&lhs, &rhs, &MatchPolicy::default());
        assert_eq!(m.matched.len(), 1);
        assert_eq!(m.matched[0].rhs.id.as_str(), "getUsers");
        assert_eq!(ids(&m.added), vec!["listOrders"]);
    }

    #[test]
    fn consumed_candidates_are_not_reused() {
        let lhs = vec![
            endpoint("getUser", "/user/{id}"),
            endpoint("getUserV1", "/user/{id}"),
        ];
        let rhs = vec![endpoint("getUserV2", "/user/{id}")];
        let m = match_relaxed(&lhs, &rhs, &MatchPolicy::default());
        assert_eq!(m.matched.len(), 1);
        assert_eq!(m.removed.len(), 1);
        assert!(m.added.is_empty());
    }

    #[test]
    fn matched_pairs_keep_lhs_order() {
        let lhs = vec![
            endpoint("getUser", "/user/{id}"),
            endpoint("listOrders", "/orders"),
        ];
        let rhs = vec![
            endpoint("listOrders", "/orders"),
            endpoint("fetchUser", "/user/{id}"),
        ];
        let m = match_relaxed(&lhs, &rhs, &MatchPolicy::default());
        let order: Vec<&str> = m.matched.iter().map(|p| p.lhs.id.as_str()).collect();
        assert_eq!(order, vec!["getUser", "listOrders"]);
    }

    #[test]
    fn relaxed_pairs_interleave_with_exact_pairs_in_lhs_order() {
        let lhs = vec![
            endpoint("listOrders", "/orders"),
            endpoint("getUser", "/user/{id}"),
            endpoint("createInvoice", "/invoices"),
        ];
        let rhs = vec![
            endpoint("createInvoice", "/invoices"),
            endpoint("fetchUser", "/user/{id}"),
            endpoint("listOrders", "/orders"),
        ];
        let m = match_relaxed(&lhs, &rhs, &MatchPolicy::default());
        let order: Vec<(&str, &str, bool)> = m
            .matched
            .iter()
            .map(|p| (p.lhs.id.as_str(), p.rhs.id.as_str(), p.is_rename()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("listOrders", "listOrders", false),
                ("getUser", "fetchUser", true),
                ("createInvoice", "createInvoice", false),
            ]
        );
        assert!(m.removed.is_empty());
        assert!(m.added.is_empty());
    }

    #[test]
    fn score_renormalizes_over_present_components() {
        let score = SimilarityScore {
            name: 1.0,
            identifiers: None,
            structure: None,
        };
        assert_eq!(score.combine(&SimilarityWeights::default()), 1.0);

        let zero = SimilarityWeights {
            name: 0.0,
            identifiers: 0.0,
            structure: 0.0,
        };
        assert_eq!(score.combine(&zero), 0.0);
    }

    #[test]
    fn text_similarity_is_case_insensitive() {
        assert_eq!(text_similarity("UserId", "userid"), 1.0);
        assert!(text_similarity("getUser", "fetchUser") > 0.5);
        assert!(text_similarity("getUser", "zzz") < 0.2);
    }
}
