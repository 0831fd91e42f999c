use evolve_model::{EnumCase, Identifiable};

use super::{log_matches, Session};
use crate::change::{EnumCaseChange, EnumCaseUpdate};
use crate::matching::match_entities;

/// Changes between the cases of two versions of one enum model.
///
/// Raw value changes only affect the wire representation but are still
/// breaking for clients decoding the old value.
pub(super) fn compare_cases(
    session: &Session<'_>,
    scope: &str,
    lhs: &[EnumCase],
    rhs: &[EnumCase],
) -> Vec<EnumCaseChange> {
    let policy = session.config.model_policy();
    let matches = match_entities(lhs, rhs, policy.as_ref());
    log_matches("case", scope, &matches);

    let mut changes = Vec::new();
    for pair in &matches.matched {
        let id = pair.lhs.delta_identifier();
        if let Some(similarity) = pair.similarity {
            changes.push(EnumCaseChange::update(
                id.clone(),
                EnumCaseUpdate::Rename {
                    from: id.clone(),
                    to: pair.rhs.delta_identifier(),
                    similarity,
                },
                false,
                true,
            ));
        }
        if pair.lhs.raw_value != pair.rhs.raw_value {
            changes.push(EnumCaseChange::update(
                id,
                EnumCaseUpdate::RawValue {
                    from: pair.lhs.raw_value.clone(),
                    to: pair.rhs.raw_value.clone(),
                },
                true,
                true,
            ));
        }
    }
    for removed in matches.removed {
        changes.push(EnumCaseChange::removal(removed.delta_identifier(), None, true, true));
    }
    for added in matches.added {
        changes.push(EnumCaseChange::addition(added.clone(), None, false));
    }
    changes
}
