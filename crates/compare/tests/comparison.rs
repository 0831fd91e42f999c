//! End-to-end comparison scenarios over whole documents.

use evolve_compare::{
    compare, compare_with_baseline, Change, CompareConfig, CompareError, EndpointUpdate,
    GuideChange, MigrationGuide, ModelUpdate, NecessityChange, ParameterUpdate, PropertyUpdate,
    UpdatePayload,
};
use evolve_model::{
    from_json, CommunicationPattern, Document, Endpoint, ErrorCode, Necessity, Parameter,
    ParameterKind, PrimitiveType, TypeInformation, TypeProperty,
};
use serde_json::json;

fn string() -> TypeInformation {
    TypeInformation::scalar(PrimitiveType::String)
}

fn int() -> TypeInformation {
    TypeInformation::scalar(PrimitiveType::Int32)
}

fn user(properties: Vec<TypeProperty>) -> TypeInformation {
    TypeInformation::object("User", properties)
}

fn id_parameter() -> Parameter {
    Parameter::new(
        "id",
        TypeInformation::scalar(PrimitiveType::Uuid),
        ParameterKind::Path,
        Necessity::Required,
    )
}

fn get_user(id: &str) -> Endpoint {
    Endpoint::new(id, "/user/{id}", TypeInformation::reference("User"))
        .with_parameter(id_parameter())
        .with_error(ErrorCode::new(404, "not found"))
}

fn base_document() -> Document {
    Document::new("users-api", "1.0.0".parse().unwrap())
        .with_model(user(vec![
            TypeProperty::required("name", string()),
            TypeProperty::optional("age", int()),
        ]))
        .with_model(TypeInformation::enumeration("Color", &["red", "green"]))
        .with_endpoint(get_user("getUser"))
}

fn endpoint_update(change: &GuideChange) -> Option<&EndpointUpdate> {
    match change {
        GuideChange::Endpoint(c) => c.updated(),
        _ => None,
    }
}

fn model_update(change: &GuideChange) -> Option<&ModelUpdate> {
    match change {
        GuideChange::Model(c) => c.updated(),
        _ => None,
    }
}

/// Every necessity change anywhere in the guide.
fn necessity_changes(guide: &MigrationGuide) -> Vec<NecessityChange> {
    let mut out = Vec::new();
    for change in &guide.changes {
        match (endpoint_update(change), model_update(change)) {
            (Some(EndpointUpdate::Parameter { parameter }), _) => {
                if let Some(ParameterUpdate::Necessity(n)) = parameter.updated() {
                    out.push(*n);
                }
            }
            (_, Some(ModelUpdate::Property { property })) => {
                if let Some(PropertyUpdate::Necessity(n)) = property.updated() {
                    out.push(*n);
                }
            }
            _ => {}
        }
    }
    out
}

#[test]
fn comparing_a_document_with_itself_is_empty() {
    let doc = base_document();
    for config in [CompareConfig::default(), CompareConfig::relaxed()] {
        let guide = compare(&doc, &doc, &config);
        assert!(guide.changes.is_empty());
        assert!(guide.scripts.is_empty());
        assert!(guide.json_values.is_empty());
        assert!(guide.object_jsons.is_empty());
    }
}

#[test]
fn relaxed_matching_turns_delete_and_add_into_a_rename() {
    let lhs = base_document();
    let mut rhs = base_document();
    rhs.endpoints = vec![get_user("fetchUser")];

    let guide = compare(&lhs, &rhs, &CompareConfig::relaxed());
    assert_eq!(guide.changes.len(), 1);
    match endpoint_update(&guide.changes[0]) {
        Some(EndpointUpdate::Rename { from, to, similarity }) => {
            assert_eq!(from.as_str(), "getUser");
            assert_eq!(to.as_str(), "fetchUser");
            assert!(*similarity > 0.5);
        }
        other => panic!("expected rename, got {:?}", other),
    }
    assert!(!guide.changes[0].is_breaking());

    let exact = compare(&lhs, &rhs, &CompareConfig::default());
    assert_eq!(exact.changes.len(), 2);
    let GuideChange::Endpoint(removal) = &exact.changes[0] else {
        panic!("expected endpoint change");
    };
    assert!(removal.is_removal());
    assert_eq!(removal.id().as_str(), "getUser");
    let GuideChange::Endpoint(addition) = &exact.changes[1] else {
        panic!("expected endpoint change");
    };
    assert!(addition.is_addition());
    assert_eq!(addition.id().as_str(), "fetchUser");
}

#[test]
fn enum_becoming_an_object_is_unsupported() {
    let lhs = base_document();
    let mut rhs = Document::new("users-api", "1.0.0".parse().unwrap())
        .with_model(user(vec![
            TypeProperty::required("name", string()),
            TypeProperty::optional("age", int()),
        ]))
        .with_model(TypeInformation::object(
            "Color",
            vec![TypeProperty::required("hex", string())],
        ));
    rhs.endpoints = lhs.endpoints.clone();

    let guide = compare(&lhs, &rhs, &CompareConfig::relaxed());
    let color: Vec<&GuideChange> = guide
        .changes
        .iter()
        .filter(|c| c.id().as_str() == "Color")
        .collect();
    assert_eq!(color.len(), 1);
    assert!(color[0].is_unsupported());
    assert!(color[0].is_breaking());
    assert!(!color[0].is_solvable());
    assert_eq!(guide.unsupported_count(), 1);
}

#[test]
fn optional_property_becoming_required_stores_one_default() {
    let lhs = base_document();
    let mut rhs = base_document();
    rhs.models = vec![
        user(vec![
            TypeProperty::required("name", string()),
            TypeProperty::required("age", int()),
        ]),
        TypeInformation::enumeration("Color", &["red", "green"]),
    ]
    .into();

    let guide = compare(&lhs, &rhs, &CompareConfig::default());
    assert_eq!(guide.changes.len(), 1);
    let Some(ModelUpdate::Property { property }) = model_update(&guide.changes[0]) else {
        panic!("expected property update");
    };
    assert_eq!(property.id().as_str(), "age");
    let Some(PropertyUpdate::Necessity(necessity)) = property.updated() else {
        panic!("expected necessity update");
    };
    assert_eq!(necessity.from, Necessity::Optional);
    assert_eq!(necessity.to, Necessity::Required);
    let value = necessity.necessity_migration.expect("default value");

    assert_eq!(guide.json_values.len(), 1);
    assert_eq!(guide.json_values[&value], json!(0));
    assert!(guide.changes[0].is_breaking());
    assert_eq!(guide.object_jsons["User"], json!({"name": "", "age": 0}));
}

#[test]
fn necessity_flips_carry_defaults_only_when_becoming_required() {
    let lhs = base_document().with_endpoint(
        Endpoint::new("search", "/search", TypeInformation::repeated(TypeInformation::reference("User")))
            .with_parameter(Parameter::new("q", string(), ParameterKind::Query, Necessity::Optional))
            .with_parameter(Parameter::new("limit", int(), ParameterKind::Query, Necessity::Required)),
    );
    let mut rhs = base_document().with_endpoint(
        Endpoint::new("search", "/search", TypeInformation::repeated(TypeInformation::reference("User")))
            .with_parameter(Parameter::new("q", string(), ParameterKind::Query, Necessity::Required))
            .with_parameter(Parameter::new(
                "limit",
                TypeInformation::optional(int()),
                ParameterKind::Query,
                Necessity::Required,
            )),
    );
    rhs.models = vec![
        user(vec![
            TypeProperty::optional("name", string()),
            TypeProperty::required("age", int()),
        ]),
        TypeInformation::enumeration("Color", &["red", "green"]),
    ]
    .into();

    let guide = compare(&lhs, &rhs, &CompareConfig::default());
    let flips = necessity_changes(&guide);
    assert_eq!(flips.len(), 4);
    for flip in flips {
        match flip.to {
            Necessity::Required => assert!(flip.necessity_migration.is_some()),
            Necessity::Optional => assert!(flip.necessity_migration.is_none()),
        }
    }
}

#[test]
fn removed_parameter_solvability_follows_necessity_and_policy() {
    let with_surname = |necessity| {
        let mut doc = base_document();
        doc.endpoints = vec![get_user("getUser").with_parameter(Parameter::new(
            "surname",
            string(),
            ParameterKind::Query,
            necessity,
        ))];
        doc
    };
    let rhs = base_document();

    let removal = |lhs: &Document, config: &CompareConfig| {
        let guide = compare(lhs, &rhs, config);
        assert_eq!(guide.changes.len(), 1);
        let Some(EndpointUpdate::Parameter { parameter }) = endpoint_update(&guide.changes[0])
        else {
            panic!("expected parameter change");
        };
        assert!(parameter.is_removal());
        assert_eq!(parameter.id().as_str(), "surname");
        (parameter.is_breaking(), parameter.is_solvable())
    };

    let optional = with_surname(Necessity::Optional);
    let required = with_surname(Necessity::Required);
    assert_eq!(removal(&optional, &CompareConfig::default()), (false, true));
    assert_eq!(removal(&required, &CompareConfig::default()), (true, false));

    let lenient = CompareConfig {
        removed_required_parameter_solvable: true,
        ..CompareConfig::default()
    };
    assert_eq!(removal(&required, &lenient), (true, true));
}

#[test]
fn updates_never_carry_equal_values() {
    let lhs = base_document();
    let mut rhs = base_document();
    let mut endpoint = get_user("getUser").with_error(ErrorCode::new(410, "gone"));
    endpoint.communication_pattern = CommunicationPattern::ServiceSideStream;
    endpoint.parameters[0].type_information = string();
    endpoint.identifiers.insert("path".into(), "/users/{id}".into());
    rhs.endpoints = vec![endpoint];
    rhs.models = vec![
        user(vec![
            TypeProperty::required("name", int()),
            TypeProperty::optional("age", int()),
            TypeProperty::optional("email", string()),
        ]),
        TypeInformation::enumeration("Color", &["red", "blue"]),
    ]
    .into();

    let guide = compare(&lhs, &rhs, &CompareConfig::relaxed());
    assert!(!guide.changes.is_empty());
    for change in &guide.changes {
        let noop = match change {
            GuideChange::Service(c) => c.updated().map(|u| u.is_noop()),
            GuideChange::Model(c) => c.updated().map(|u| u.is_noop()),
            GuideChange::Endpoint(c) => c.updated().map(|u| u.is_noop()),
        };
        assert_ne!(noop, Some(true), "no-op update: {:?}", change);
    }

    let pattern = guide
        .changes
        .iter()
        .find(|c| matches!(endpoint_update(c), Some(EndpointUpdate::CommunicationPattern { .. })))
        .expect("communication pattern change");
    assert!(pattern.is_breaking());
    assert!(!pattern.is_solvable());
}

#[test]
fn equal_type_changes_share_scripts() {
    let lhs = base_document().with_endpoint(
        Endpoint::new("deleteUser", "/user/{id}/delete", TypeInformation::scalar(PrimitiveType::Bool))
            .with_parameter(id_parameter()),
    );
    let mut rhs = lhs.clone();
    for endpoint in &mut rhs.endpoints {
        endpoint.parameters[0].type_information = string();
    }

    let guide = compare(&lhs, &rhs, &CompareConfig::default());
    let migrations: Vec<_> = guide
        .changes
        .iter()
        .filter_map(|c| match endpoint_update(c) {
            Some(EndpointUpdate::Parameter { parameter }) => match parameter.updated() {
                Some(ParameterUpdate::Type(t)) => Some((t.forward_migration, t.backward_migration)),
                _ => None,
            },
            _ => None,
        })
        .collect();
    assert_eq!(migrations.len(), 2);
    assert_eq!(migrations[0], migrations[1]);
    assert_eq!(guide.scripts.len(), 2);
}

#[test]
fn relaxed_model_matching_detects_property_renames() {
    let lhs = base_document();
    let mut rhs = base_document();
    rhs.models = vec![
        user(vec![
            TypeProperty::required("fullName", string()),
            TypeProperty::optional("age", int()),
        ]),
        TypeInformation::enumeration("Color", &["red", "green"]),
    ]
    .into();

    let config = CompareConfig {
        relaxed_model_matching: true,
        similarity_threshold: 0.4,
        ..CompareConfig::default()
    };
    let guide = compare(&lhs, &rhs, &config);
    assert_eq!(guide.changes.len(), 1);
    let Some(ModelUpdate::Property { property }) = model_update(&guide.changes[0]) else {
        panic!("expected property change");
    };
    assert!(matches!(property.updated(), Some(PropertyUpdate::Rename { .. })));

    let exact = compare(&lhs, &rhs, &CompareConfig::default());
    assert_eq!(exact.changes.len(), 2);
    // fallback of the removed property and default of the added one are both ""
    assert_eq!(exact.json_values.len(), 1);
}

#[test]
fn output_is_reproducible() {
    let lhs = base_document();
    let mut rhs = base_document().with_model(TypeInformation::enumeration("Size", &["s", "m"]));
    rhs.endpoints[0].response = TypeInformation::repeated(TypeInformation::reference("User"));

    let first = serde_json::to_string(&compare(&lhs, &rhs, &CompareConfig::relaxed())).unwrap();
    let second = serde_json::to_string(&compare(&lhs, &rhs, &CompareConfig::relaxed())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn incompatible_baseline_is_rejected_before_comparing() {
    let lhs = base_document();
    let rhs = base_document();
    let mut other = base_document();
    other.id = "orders-api".into();
    let baseline = compare(&other, &rhs, &CompareConfig::default());

    let err = compare_with_baseline(&lhs, &rhs, &CompareConfig::default(), Some(&baseline))
        .unwrap_err();
    assert!(matches!(err, CompareError::IncompatibleGuide { .. }));
    assert!(err.to_string().contains("orders-api"));
}

#[test]
fn documents_loaded_from_json_compare_like_built_ones() {
    let raw = |age_necessity: &str| {
        json!({
            "id": "users-api",
            "service": {"version": "1.0.0"},
            "endpoints": [],
            "models": [{"object": {
                "name": {"name": "User"},
                "properties": [
                    {"name": "name", "type": {"scalar": "string"}},
                    {"name": "age", "type": {"scalar": "int32"}, "necessity": age_necessity}
                ]
            }}]
        })
    };
    let lhs = from_json(&raw("optional")).unwrap();
    let rhs = from_json(&raw("required")).unwrap();
    let guide = compare(&lhs, &rhs, &CompareConfig::default());

    assert_eq!(guide.breaking_count(), 1);
    let json = serde_json::to_value(&guide).unwrap();
    let update = &json["changes"][0]["change"];
    assert_eq!(update["type"], json!("update"));
    assert_eq!(update["updated"]["type"], json!("property"));
    assert_eq!(update["updated"]["property"]["updated"]["type"], json!("necessity"));
    assert_eq!(
        update["updated"]["property"]["updated"]["necessityMigration"],
        json!(0)
    );
    assert_eq!(json["jsonValues"], json!({"0": 0}));
}

#[test]
fn change_accessors_agree_with_variants() {
    let doc = base_document();
    let mut rhs = base_document();
    rhs.endpoints.clear();
    let guide = compare(&doc, &rhs, &CompareConfig::default());
    let GuideChange::Endpoint(change) = &guide.changes[0] else {
        panic!("expected endpoint change");
    };
    assert!(matches!(change, Change::Removal { .. }));
    assert_eq!(change.describe(), "removed");
}
