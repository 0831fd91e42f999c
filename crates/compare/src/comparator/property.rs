use evolve_model::{Identifiable, Necessity, TypeProperty};

use super::rules::effective_necessity;
use super::{log_matches, Session};
use crate::change::{PropertyChange, PropertyUpdate};
use crate::matching::{match_entities, Matched};

/// Changes between the properties of two versions of one object model.
pub(super) fn compare_properties<'a>(
    session: &mut Session<'_>,
    scope: &str,
    lhs: &'a [TypeProperty],
    rhs: &'a [TypeProperty],
) -> Vec<PropertyChange> {
    let policy = session.config.model_policy();
    let matches = match_entities(lhs, rhs, policy.as_ref());
    log_matches("property", scope, &matches);

    let mut changes = Vec::new();
    for pair in &matches.matched {
        changes.extend(compare_property(session, pair));
    }
    for removed in matches.removed {
        let fallback = session.store_fallback(&removed.type_information);
        changes.push(PropertyChange::removal(
            removed.delta_identifier(),
            Some(fallback),
            true,
            true,
        ));
    }
    for added in matches.added {
        let change = match effective_necessity(added.necessity, &added.type_information) {
            Necessity::Required => {
                let default = session.store_default(&added.type_information);
                PropertyChange::addition(added.clone(), Some(default), true)
            }
            Necessity::Optional => PropertyChange::addition(added.clone(), None, false),
        };
        changes.push(change);
    }
    changes
}

fn compare_property(session: &mut Session<'_>, pair: &Matched<'_, TypeProperty>) -> Vec<PropertyChange> {
    let id = pair.lhs.delta_identifier();
    let mut changes = Vec::new();

    if let Some(similarity) = pair.similarity {
        changes.push(PropertyChange::update(
            id.clone(),
            PropertyUpdate::Rename {
                from: id.clone(),
                to: pair.rhs.delta_identifier(),
                similarity,
            },
            false,
            true,
        ));
    }

    if let Some(necessity) = session.necessity_change(
        (pair.lhs.necessity, &pair.lhs.type_information),
        (pair.rhs.necessity, &pair.rhs.type_information),
    ) {
        let breaking = necessity.to == Necessity::Required;
        changes.push(PropertyChange::update(
            id.clone(),
            PropertyUpdate::Necessity(necessity),
            breaking,
            true,
        ));
    }

    if let Some(type_change) =
        session.type_change(&pair.lhs.type_information, &pair.rhs.type_information)
    {
        changes.push(PropertyChange::update(
            id,
            PropertyUpdate::Type(type_change),
            true,
            true,
        ));
    }

    changes
}
