use evolve_model::{Identifiable, Necessity, Parameter};

use super::rules::effective_necessity;
use super::{log_matches, Session};
use crate::change::{ParameterChange, ParameterUpdate};
use crate::matching::{match_entities, Matched};

/// Changes between the parameter lists of two versions of one endpoint.
pub(super) fn compare_parameters<'a>(
    session: &mut Session<'_>,
    scope: &str,
    lhs: &'a [Parameter],
    rhs: &'a [Parameter],
) -> Vec<ParameterChange> {
    let policy = session.config.endpoint_policy();
    let matches = match_entities(lhs, rhs, policy.as_ref());
    log_matches("parameter", scope, &matches);

    let mut changes = Vec::new();
    for pair in &matches.matched {
        changes.extend(compare_parameter(session, pair));
    }
    for removed in matches.removed {
        // Callers still sending an optional parameter are unaffected.
        let (breaking, solvable) =
            match effective_necessity(removed.necessity, &removed.type_information) {
                Necessity::Optional => (false, true),
                Necessity::Required => (true, session.config.removed_required_parameter_solvable),
            };
        changes.push(ParameterChange::removal(
            removed.delta_identifier(),
            None,
            breaking,
            solvable,
        ));
    }
    for added in matches.added {
        let change = match effective_necessity(added.necessity, &added.type_information) {
            Necessity::Required => {
                let default = session.store_default(&added.type_information);
                ParameterChange::addition(added.clone(), Some(default), true)
            }
            Necessity::Optional => ParameterChange::addition(added.clone(), None, false),
        };
        changes.push(change);
    }
    changes
}

fn compare_parameter(session: &mut Session<'_>, pair: &Matched<'_, Parameter>) -> Vec<ParameterChange> {
    let id = pair.lhs.delta_identifier();
    let mut changes = Vec::new();

    if let Some(similarity) = pair.similarity {
        changes.push(ParameterChange::update(
            id.clone(),
            ParameterUpdate::Rename {
                from: id.clone(),
                to: pair.rhs.delta_identifier(),
                similarity,
            },
            false,
            true,
        ));
    }

    if pair.lhs.kind != pair.rhs.kind {
        changes.push(ParameterChange::update(
            id.clone(),
            ParameterUpdate::Kind {
                from: pair.lhs.kind,
                to: pair.rhs.kind,
            },
            true,
            true,
        ));
    }

    if let Some(necessity) = session.necessity_change(
        (pair.lhs.necessity, &pair.lhs.type_information),
        (pair.rhs.necessity, &pair.rhs.type_information),
    ) {
        let breaking = necessity.to == Necessity::Required;
        changes.push(ParameterChange::update(
            id.clone(),
            ParameterUpdate::Necessity(necessity),
            breaking,
            true,
        ));
    }

    if let Some(type_change) =
        session.type_change(&pair.lhs.type_information, &pair.rhs.type_information)
    {
        changes.push(ParameterChange::update(
            id,
            ParameterUpdate::Type(type_change),
            true,
            true,
        ));
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{Change, ParameterUpdate};
    use crate::config::CompareConfig;
    use evolve_model::{Document, ParameterKind, PrimitiveType, TypeInformation, Version};
    use serde_json::json;

    fn parameter(name: &str, kind: ParameterKind, necessity: Necessity) -> Parameter {
        Parameter::new(
            name,
            TypeInformation::scalar(PrimitiveType::Int32),
            kind,
            necessity,
        )
    }

    fn run(config: &CompareConfig, lhs: &[Parameter], rhs: &[Parameter]) -> Vec<ParameterChange> {
        let doc = Document::new("api", Version::default());
        let mut session = Session::new(&doc, &doc, config);
        compare_parameters(&mut session, "listUsers", lhs, rhs)
    }

    #[test]
    fn kind_change_is_breaking_and_solvable() {
        let changes = run(
            &CompareConfig::default(),
            &[parameter("limit", ParameterKind::Query, Necessity::Required)],
            &[parameter("limit", ParameterKind::Header, Necessity::Required)],
        );
        assert_eq!(changes.len(), 1);
        assert!(changes[0].is_breaking());
        assert!(changes[0].is_solvable());
        assert_eq!(
            changes[0].updated(),
            Some(&ParameterUpdate::Kind {
                from: ParameterKind::Query,
                to: ParameterKind::Header,
            })
        );
    }

    #[test]
    fn required_addition_carries_a_default_value() {
        let doc = Document::new("api", Version::default());
        let config = CompareConfig::default();
        let mut session = Session::new(&doc, &doc, &config);
        let changes = compare_parameters(
            &mut session,
            "listUsers",
            &[],
            &[
                parameter("limit", ParameterKind::Query, Necessity::Required),
                parameter("offset", ParameterKind::Query, Necessity::Optional),
            ],
        );

        assert_eq!(changes.len(), 2);
        match &changes[0] {
            Change::Addition {
                default_value: Some(id),
                breaking: true,
                solvable: true,
                ..
            } => assert_eq!(session.context.value(*id), Some(&json!(0))),
            other => panic!("expected a required addition with default, got {:?}", other),
        }
        match &changes[1] {
            Change::Addition {
                default_value: None,
                breaking: false,
                ..
            } => {}
            other => panic!("expected an optional addition, got {:?}", other),
        }
    }

    #[test]
    fn removal_follows_the_configured_policy() {
        let lhs = [
            parameter("surname", ParameterKind::Query, Necessity::Optional),
            parameter("name", ParameterKind::Query, Necessity::Required),
        ];

        let changes = run(&CompareConfig::default(), &lhs, &[]);
        assert_eq!(changes.len(), 2);
        assert!(!changes[0].is_breaking() && changes[0].is_solvable());
        assert!(changes[1].is_breaking() && !changes[1].is_solvable());

        let lenient = CompareConfig {
            removed_required_parameter_solvable: true,
            ..CompareConfig::default()
        };
        let changes = run(&lenient, &lhs, &[]);
        assert!(changes[1].is_breaking() && changes[1].is_solvable());
    }
}
