use evolve_model::{Identifiable, TypeInformation};

use super::enum_case::compare_cases;
use super::property::compare_properties;
use super::{log_matches, Session};
use crate::change::{ModelChange, ModelUpdate};
use crate::matching::{match_entities, Matched};

/// Changes between the model tables of both documents.
pub(crate) fn compare_models(session: &mut Session<'_>) -> Vec<ModelChange> {
    let lhs = session.lhs;
    let rhs = session.rhs;
    let policy = session.config.model_policy();
    let matches = match_entities(lhs.models.as_slice(), rhs.models.as_slice(), policy.as_ref());
    log_matches("model", "document", &matches);

    let mut changes = Vec::new();
    for pair in &matches.matched {
        changes.extend(compare_model(session, pair));
    }
    for removed in matches.removed {
        changes.push(ModelChange::removal(removed.delta_identifier(), None, true, true));
    }
    for added in matches.added {
        changes.push(ModelChange::addition(added.clone(), None, false));
    }
    changes
}

fn compare_model(session: &mut Session<'_>, pair: &Matched<'_, TypeInformation>) -> Vec<ModelChange> {
    let id = pair.lhs.delta_identifier();

    if pair.lhs.kind() != pair.rhs.kind() {
        return vec![ModelChange::unsupported(
            id,
            format!(
                "'{}' changed from {} to {}",
                pair.lhs.type_name(),
                pair.lhs.kind(),
                pair.rhs.kind()
            ),
        )];
    }

    let mut changes = Vec::new();
    if let Some(similarity) = pair.similarity {
        changes.push(ModelChange::update(
            id.clone(),
            ModelUpdate::Rename {
                from: id.clone(),
                to: pair.rhs.delta_identifier(),
                similarity,
            },
            false,
            true,
        ));
    }

    let mut nested = Vec::new();
    match (pair.lhs, pair.rhs) {
        (
            TypeInformation::Object { properties: lhs, .. },
            TypeInformation::Object { properties: rhs, .. },
        ) => {
            for property in compare_properties(session, id.as_str(), lhs, rhs) {
                let (breaking, solvable) = (property.is_breaking(), property.is_solvable());
                nested.push(ModelChange::update(
                    id.clone(),
                    ModelUpdate::Property { property },
                    breaking,
                    solvable,
                ));
            }
        }
        (
            TypeInformation::Enum {
                raw_value_type: lhs_raw,
                cases: lhs,
                ..
            },
            TypeInformation::Enum {
                raw_value_type: rhs_raw,
                cases: rhs,
                ..
            },
        ) => {
            if lhs_raw != rhs_raw {
                return vec![ModelChange::unsupported(
                    id,
                    format!(
                        "raw value type of '{}' changed from {} to {}",
                        pair.lhs.type_name(),
                        lhs_raw,
                        rhs_raw
                    ),
                )];
            }
            for case in compare_cases(session, id.as_str(), lhs, rhs) {
                let (breaking, solvable) = (case.is_breaking(), case.is_solvable());
                nested.push(ModelChange::update(
                    id.clone(),
                    ModelUpdate::Case { case },
                    breaking,
                    solvable,
                ));
            }
        }
        _ => {}
    }

    if nested.iter().any(|c| c.is_breaking()) {
        let name = pair.rhs.type_name();
        session.breaking_models.insert(name);
    }
    changes.extend(nested);
    changes
}
