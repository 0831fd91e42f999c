use evolve_model::{Endpoint, ErrorCode, Identifiable, Necessity};

use super::identifier::compare_identifiers;
use super::parameter::compare_parameters;
use super::{log_matches, Session};
use crate::change::{EndpointChange, EndpointUpdate};
use crate::matching::{match_entities, Matched};

/// Changes between the endpoint lists of both documents.
pub(crate) fn compare_endpoints(session: &mut Session<'_>) -> Vec<EndpointChange> {
    let lhs = session.lhs;
    let rhs = session.rhs;
    let policy = session.config.endpoint_policy();
    let matches = match_entities(&lhs.endpoints, &rhs.endpoints, policy.as_ref());
    log_matches("endpoint", "document", &matches);

    let mut changes = Vec::new();
    for pair in &matches.matched {
        changes.extend(compare_endpoint(session, pair));
    }
    for removed in matches.removed {
        changes.push(EndpointChange::removal(removed.delta_identifier(), None, true, true));
    }
    for added in matches.added {
        changes.push(EndpointChange::addition(added.clone(), None, false));
    }
    changes
}

fn compare_endpoint(session: &mut Session<'_>, pair: &Matched<'_, Endpoint>) -> Vec<EndpointChange> {
    let (lhs, rhs) = (pair.lhs, pair.rhs);
    let id = lhs.delta_identifier();
    let mut changes = Vec::new();

    if let Some(similarity) = pair.similarity {
        changes.push(EndpointChange::update(
            id.clone(),
            EndpointUpdate::Rename {
                from: id.clone(),
                to: rhs.delta_identifier(),
                similarity,
            },
            false,
            true,
        ));
    }

    for identifier in compare_identifiers(&lhs.identifiers, &rhs.identifiers) {
        let (breaking, solvable) = (identifier.is_breaking(), identifier.is_solvable());
        changes.push(EndpointChange::update(
            id.clone(),
            EndpointUpdate::Identifier { identifier },
            breaking,
            solvable,
        ));
    }

    if lhs.communication_pattern != rhs.communication_pattern {
        changes.push(EndpointChange::update(
            id.clone(),
            EndpointUpdate::CommunicationPattern {
                from: lhs.communication_pattern,
                to: rhs.communication_pattern,
            },
            true,
            false,
        ));
    }

    for parameter in compare_parameters(session, id.as_str(), &lhs.parameters, &rhs.parameters) {
        let (breaking, solvable) = (parameter.is_breaking(), parameter.is_solvable());
        changes.push(EndpointChange::update(
            id.clone(),
            EndpointUpdate::Parameter { parameter },
            breaking,
            solvable,
        ));
    }

    // A response is always present; an `Optional` wrapper makes it nullable.
    if let Some(necessity) = session.necessity_change(
        (Necessity::Required, &lhs.response),
        (Necessity::Required, &rhs.response),
    ) {
        let (breaking, solvable) = match necessity.to {
            Necessity::Optional => (true, false),
            Necessity::Required => (false, true),
        };
        changes.push(EndpointChange::update(
            id.clone(),
            EndpointUpdate::ResponseNecessity(necessity),
            breaking,
            solvable,
        ));
    }

    if let Some(type_change) = session.type_change(&lhs.response, &rhs.response) {
        changes.push(EndpointChange::update(
            id.clone(),
            EndpointUpdate::Response(type_change),
            true,
            true,
        ));
    }

    let (from, to) = (sorted_errors(&lhs.errors), sorted_errors(&rhs.errors));
    if from != to {
        changes.push(EndpointChange::update(
            id,
            EndpointUpdate::Errors { from, to },
            false,
            true,
        ));
    }

    changes
}

/// Declared errors form a set; declaration order is not a change.
fn sorted_errors(errors: &[ErrorCode]) -> Vec<ErrorCode> {
    let mut sorted = errors.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompareConfig;
    use evolve_model::{Document, PrimitiveType, TypeInformation, TypeProperty, Version};
    use serde_json::json;

    fn document(response: TypeInformation) -> Document {
        Document::new("users-api", Version::default())
            .with_model(TypeInformation::object(
                "User",
                vec![TypeProperty::required(
                    "name",
                    TypeInformation::scalar(PrimitiveType::String),
                )],
            ))
            .with_endpoint(Endpoint::new("getUser", "/user/{id}", response))
    }

    fn nullable_user() -> TypeInformation {
        TypeInformation::optional(TypeInformation::reference("User"))
    }

    #[test]
    fn response_becoming_nullable_is_breaking() {
        let lhs = document(TypeInformation::reference("User"));
        let rhs = document(nullable_user());
        let config = CompareConfig::default();
        let mut session = Session::new(&lhs, &rhs, &config);
        let changes = compare_endpoints(&mut session);

        assert_eq!(changes.len(), 1);
        assert!(changes[0].is_breaking());
        assert!(!changes[0].is_solvable());
        match changes[0].updated() {
            Some(EndpointUpdate::ResponseNecessity(necessity)) => {
                assert_eq!(necessity.from, Necessity::Required);
                assert_eq!(necessity.to, Necessity::Optional);
                assert_eq!(necessity.necessity_migration, None);
            }
            other => panic!("expected a response necessity change, got {:?}", other),
        }
    }

    #[test]
    fn response_no_longer_nullable_stores_a_default() {
        let lhs = document(nullable_user());
        let rhs = document(TypeInformation::reference("User"));
        let config = CompareConfig::default();
        let mut session = Session::new(&lhs, &rhs, &config);
        let changes = compare_endpoints(&mut session);

        assert_eq!(changes.len(), 1);
        assert!(!changes[0].is_breaking());
        assert!(changes[0].is_solvable());
        match changes[0].updated() {
            Some(EndpointUpdate::ResponseNecessity(necessity)) => {
                let id = necessity.necessity_migration.unwrap();
                assert_eq!(session.context.value(id), Some(&json!({"name": ""})));
            }
            other => panic!("expected a response necessity change, got {:?}", other),
        }
    }

    #[test]
    fn unchanged_nullable_response_produces_nothing() {
        let lhs = document(nullable_user());
        let rhs = document(nullable_user());
        let config = CompareConfig::default();
        let mut session = Session::new(&lhs, &rhs, &config);
        assert!(compare_endpoints(&mut session).is_empty());
        assert_eq!(session.context.value_count(), 0);
    }

    #[test]
    fn error_declaration_order_is_not_a_change() {
        let lhs = Document::new("api", Version::default()).with_endpoint(
            Endpoint::new("getUser", "/user/{id}", TypeInformation::reference("User"))
                .with_error(ErrorCode::new(404, "missing"))
                .with_error(ErrorCode::new(500, "failure")),
        );
        let rhs = Document::new("api", Version::default()).with_endpoint(
            Endpoint::new("getUser", "/user/{id}", TypeInformation::reference("User"))
                .with_error(ErrorCode::new(500, "failure"))
                .with_error(ErrorCode::new(404, "missing")),
        );
        let config = CompareConfig::default();
        let mut session = Session::new(&lhs, &rhs, &config);
        assert!(compare_endpoints(&mut session).is_empty());
    }
}
