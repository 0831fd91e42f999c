use std::collections::BTreeMap;

use evolve_model::DeltaIdentifier;

use crate::change::{ElementIdentifier, IdentifierChange, IdentifierUpdate};

/// Changes between the external identifiers of a matched endpoint pair.
///
/// Identifiers are keyed, so matching is always exact. Every difference
/// breaks clients addressing the endpoint through the old value.
pub(super) fn compare_identifiers(
    lhs: &BTreeMap<String, String>,
    rhs: &BTreeMap<String, String>,
) -> Vec<IdentifierChange> {
    let mut changes = Vec::new();
    for (key, from) in lhs {
        match rhs.get(key) {
            Some(to) if to != from => changes.push(IdentifierChange::update(
                DeltaIdentifier::new(key.as_str()),
                IdentifierUpdate::Value {
                    from: from.clone(),
                    to: to.clone(),
                },
                true,
                true,
            )),
            Some(_) => {}
            None => changes.push(IdentifierChange::removal(
                DeltaIdentifier::new(key.as_str()),
                None,
                true,
                true,
            )),
        }
    }
    for (key, value) in rhs {
        if !lhs.contains_key(key) {
            let added = ElementIdentifier {
                key: key.clone(),
                value: value.clone(),
            };
            changes.push(IdentifierChange::addition(added, None, true));
        }
    }
    changes
}
