//! The change data model of a migration guide.
//!
//! Every change is one of four shapes ([`Change`]) parameterized by the
//! element kind it concerns and by that kind's closed set of update payloads.
//! Nested entities (parameters, properties, enum cases, endpoint
//! identifiers, exporters) appear as updates of their parent.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use evolve_model::{
    CommunicationPattern, DeltaIdentifier, EnumCase, Endpoint, ErrorCode, ExporterConfiguration,
    HttpInformation, Identifiable, Necessity, Parameter, ParameterKind, ServiceInformation,
    TypeInformation, TypeProperty, Version,
};

/// Id of a conversion script stored in the comparison context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptId(pub usize);

/// Id of a JSON default or fallback value stored in the comparison context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueId(pub usize);

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script#{}", self.0)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value#{}", self.0)
    }
}

/// Behaviour shared by every update payload.
pub trait UpdatePayload {
    /// True when the payload's "from" and "to" are equal. Such an update is
    /// never emitted.
    fn is_noop(&self) -> bool;

    /// One-line human description.
    fn describe(&self) -> String;
}

// ── Change ──────────────────────────────────────────────────────────

/// A single difference concerning one element of kind `E`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Change<E, U> {
    Addition {
        id: DeltaIdentifier,
        added: E,
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<ValueId>,
        breaking: bool,
        solvable: bool,
    },
    Removal {
        id: DeltaIdentifier,
        #[serde(rename = "fallbackValue", default, skip_serializing_if = "Option::is_none")]
        fallback_value: Option<ValueId>,
        breaking: bool,
        solvable: bool,
    },
    Update {
        id: DeltaIdentifier,
        updated: U,
        breaking: bool,
        solvable: bool,
    },
    /// No safe automatic representation exists; always breaking, never solvable.
    Unsupported {
        id: DeltaIdentifier,
        description: String,
        breaking: bool,
        solvable: bool,
    },
}

impl<E: Identifiable, U> Change<E, U> {
    pub fn addition(added: E, default_value: Option<ValueId>, breaking: bool) -> Self {
        Change::Addition {
            id: added.delta_identifier(),
            added,
            default_value,
            breaking,
            solvable: true,
        }
    }
}

impl<E, U: UpdatePayload> Change<E, U> {
    pub fn removal(
        id: DeltaIdentifier,
        fallback_value: Option<ValueId>,
        breaking: bool,
        solvable: bool,
    ) -> Self {
        Change::Removal {
            id,
            fallback_value,
            breaking,
            solvable,
        }
    }

    pub fn update(id: DeltaIdentifier, updated: U, breaking: bool, solvable: bool) -> Self {
        debug_assert!(!updated.is_noop(), "no-op update emitted for '{}'", id);
        Change::Update {
            id,
            updated,
            breaking,
            solvable,
        }
    }

    pub fn unsupported(id: DeltaIdentifier, description: impl Into<String>) -> Self {
        Change::Unsupported {
            id,
            description: description.into(),
            breaking: true,
            solvable: false,
        }
    }

    pub fn id(&self) -> &DeltaIdentifier {
        match self {
            Change::Addition { id, .. }
            | Change::Removal { id, .. }
            | Change::Update { id, .. }
            | Change::Unsupported { id, .. } => id,
        }
    }

    pub fn is_breaking(&self) -> bool {
        match self {
            Change::Addition { breaking, .. }
            | Change::Removal { breaking, .. }
            | Change::Update { breaking, .. }
            | Change::Unsupported { breaking, .. } => *breaking,
        }
    }

    pub fn is_solvable(&self) -> bool {
        match self {
            Change::Addition { solvable, .. }
            | Change::Removal { solvable, .. }
            | Change::Update { solvable, .. }
            | Change::Unsupported { solvable, .. } => *solvable,
        }
    }

    pub fn is_addition(&self) -> bool {
        matches!(self, Change::Addition { .. })
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, Change::Removal { .. })
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Change::Update { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Change::Unsupported { .. })
    }

    pub fn updated(&self) -> Option<&U> {
        match self {
            Change::Update { updated, .. } => Some(updated),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Change::Addition { default_value, .. } => match default_value {
                Some(v) => format!("added (default {})", v),
                None => "added".to_string(),
            },
            Change::Removal { fallback_value, .. } => match fallback_value {
                Some(v) => format!("removed (fallback {})", v),
                None => "removed".to_string(),
            },
            Change::Update { updated, .. } => updated.describe(),
            Change::Unsupported { description, .. } => format!("unsupported: {}", description),
        }
    }
}

// ── Shared payload pieces ───────────────────────────────────────────

/// A type change with conversion scripts in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeChange {
    pub from: TypeInformation,
    pub to: TypeInformation,
    /// Converts old-shape JSON into new-shape JSON.
    pub forward_migration: ScriptId,
    /// Converts new-shape JSON into old-shape JSON.
    pub backward_migration: ScriptId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl TypeChange {
    fn is_noop(&self) -> bool {
        self.from.unwrapped().type_name() == self.to.unwrapped().type_name()
    }

    fn describe(&self, what: &str) -> String {
        let mut s = format!("{} type {} -> {}", what, self.from, self.to);
        if let Some(w) = &self.warning {
            s.push_str(&format!(" (warning: {})", w));
        }
        s
    }
}

/// A flip between required and optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NecessityChange {
    pub from: Necessity,
    pub to: Necessity,
    /// Default for values that were previously absent; present exactly when
    /// the element became required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub necessity_migration: Option<ValueId>,
}

impl NecessityChange {
    fn describe(&self) -> String {
        match self.necessity_migration {
            Some(v) => format!("necessity {} -> {} (default {})", self.from, self.to, v),
            None => format!("necessity {} -> {}", self.from, self.to),
        }
    }
}

fn describe_rename(from: &DeltaIdentifier, to: &DeltaIdentifier, similarity: f64) -> String {
    format!("renamed {} -> {} (similarity {:.2})", from, to, similarity)
}

// ── Endpoint identifiers ────────────────────────────────────────────

/// One external identifier of an endpoint (path, operation, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementIdentifier {
    pub key: String,
    pub value: String,
}

impl Identifiable for ElementIdentifier {
    fn delta_identifier(&self) -> DeltaIdentifier {
        DeltaIdentifier::new(self.key.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IdentifierUpdate {
    Value { from: String, to: String },
}

impl UpdatePayload for IdentifierUpdate {
    fn is_noop(&self) -> bool {
        match self {
            IdentifierUpdate::Value { from, to } => from == to,
        }
    }

    fn describe(&self) -> String {
        match self {
            IdentifierUpdate::Value { from, to } => format!("'{}' -> '{}'", from, to),
        }
    }
}

pub type IdentifierChange = Change<ElementIdentifier, IdentifierUpdate>;

// ── Parameters ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ParameterUpdate {
    Rename {
        from: DeltaIdentifier,
        to: DeltaIdentifier,
        similarity: f64,
    },
    Kind {
        from: ParameterKind,
        to: ParameterKind,
    },
    Necessity(NecessityChange),
    Type(TypeChange),
}

impl UpdatePayload for ParameterUpdate {
    fn is_noop(&self) -> bool {
        match self {
            ParameterUpdate::Rename { from, to, .. } => from == to,
            ParameterUpdate::Kind { from, to } => from == to,
            ParameterUpdate::Necessity(n) => n.from == n.to,
            ParameterUpdate::Type(t) => t.is_noop(),
        }
    }

    fn describe(&self) -> String {
        match self {
            ParameterUpdate::Rename {
                from,
                to,
                similarity,
            } => describe_rename(from, to, *similarity),
            ParameterUpdate::Kind { from, to } => format!("kind {} -> {}", from, to),
            ParameterUpdate::Necessity(n) => n.describe(),
            ParameterUpdate::Type(t) => t.describe("parameter"),
        }
    }
}

pub type ParameterChange = Change<Parameter, ParameterUpdate>;

// ── Endpoints ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EndpointUpdate {
    Rename {
        from: DeltaIdentifier,
        to: DeltaIdentifier,
        similarity: f64,
    },
    Identifier {
        identifier: IdentifierChange,
    },
    CommunicationPattern {
        from: CommunicationPattern,
        to: CommunicationPattern,
    },
    Response(TypeChange),
    /// The response became nullable, or stopped being nullable.
    ResponseNecessity(NecessityChange),
    Parameter {
        parameter: ParameterChange,
    },
    Errors {
        from: Vec<ErrorCode>,
        to: Vec<ErrorCode>,
    },
}

impl UpdatePayload for EndpointUpdate {
    fn is_noop(&self) -> bool {
        match self {
            EndpointUpdate::Rename { from, to, .. } => from == to,
            EndpointUpdate::Identifier { identifier } => {
                identifier.updated().is_some_and(|u| u.is_noop())
            }
            EndpointUpdate::CommunicationPattern { from, to } => from == to,
            EndpointUpdate::Response(t) => t.is_noop(),
            EndpointUpdate::ResponseNecessity(n) => n.from == n.to,
            EndpointUpdate::Parameter { parameter } => {
                parameter.updated().is_some_and(|u| u.is_noop())
            }
            EndpointUpdate::Errors { from, to } => from == to,
        }
    }

    fn describe(&self) -> String {
        match self {
            EndpointUpdate::Rename {
                from,
                to,
                similarity,
            } => describe_rename(from, to, *similarity),
            EndpointUpdate::Identifier { identifier } => {
                format!("identifier '{}' {}", identifier.id(), identifier.describe())
            }
            EndpointUpdate::CommunicationPattern { from, to } => {
                format!("communication pattern {} -> {}", from, to)
            }
            EndpointUpdate::Response(t) => t.describe("response"),
            EndpointUpdate::ResponseNecessity(n) => format!("response {}", n.describe()),
            EndpointUpdate::Parameter { parameter } => {
                format!("parameter '{}' {}", parameter.id(), parameter.describe())
            }
            EndpointUpdate::Errors { from, to } => {
                let codes = |errors: &[ErrorCode]| {
                    errors
                        .iter()
                        .map(|e| e.code.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                format!("errors [{}] -> [{}]", codes(from), codes(to))
            }
        }
    }
}

pub type EndpointChange = Change<Endpoint, EndpointUpdate>;

// ── Models ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PropertyUpdate {
    Rename {
        from: DeltaIdentifier,
        to: DeltaIdentifier,
        similarity: f64,
    },
    Necessity(NecessityChange),
    Type(TypeChange),
}

impl UpdatePayload for PropertyUpdate {
    fn is_noop(&self) -> bool {
        match self {
            PropertyUpdate::Rename { from, to, .. } => from == to,
            PropertyUpdate::Necessity(n) => n.from == n.to,
            PropertyUpdate::Type(t) => t.is_noop(),
        }
    }

    fn describe(&self) -> String {
        match self {
            PropertyUpdate::Rename {
                from,
                to,
                similarity,
            } => describe_rename(from, to, *similarity),
            PropertyUpdate::Necessity(n) => n.describe(),
            PropertyUpdate::Type(t) => t.describe("property"),
        }
    }
}

pub type PropertyChange = Change<TypeProperty, PropertyUpdate>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EnumCaseUpdate {
    Rename {
        from: DeltaIdentifier,
        to: DeltaIdentifier,
        similarity: f64,
    },
    /// Only affects the wire representation of the case.
    RawValue { from: String, to: String },
}

impl UpdatePayload for EnumCaseUpdate {
    fn is_noop(&self) -> bool {
        match self {
            EnumCaseUpdate::Rename { from, to, .. } => from == to,
            EnumCaseUpdate::RawValue { from, to } => from == to,
        }
    }

    fn describe(&self) -> String {
        match self {
            EnumCaseUpdate::Rename {
                from,
                to,
                similarity,
            } => describe_rename(from, to, *similarity),
            EnumCaseUpdate::RawValue { from, to } => {
                format!("raw value '{}' -> '{}'", from, to)
            }
        }
    }
}

pub type EnumCaseChange = Change<EnumCase, EnumCaseUpdate>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModelUpdate {
    Rename {
        from: DeltaIdentifier,
        to: DeltaIdentifier,
        similarity: f64,
    },
    Property {
        property: PropertyChange,
    },
    Case {
        case: EnumCaseChange,
    },
}

impl UpdatePayload for ModelUpdate {
    fn is_noop(&self) -> bool {
        match self {
            ModelUpdate::Rename { from, to, .. } => from == to,
            ModelUpdate::Property { property } => property.updated().is_some_and(|u| u.is_noop()),
            ModelUpdate::Case { case } => case.updated().is_some_and(|u| u.is_noop()),
        }
    }

    fn describe(&self) -> String {
        match self {
            ModelUpdate::Rename {
                from,
                to,
                similarity,
            } => describe_rename(from, to, *similarity),
            ModelUpdate::Property { property } => {
                format!("property '{}' {}", property.id(), property.describe())
            }
            ModelUpdate::Case { case } => format!("case '{}' {}", case.id(), case.describe()),
        }
    }
}

pub type ModelChange = Change<TypeInformation, ModelUpdate>;

// ── Service ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExporterUpdate {
    Settings { from: Value, to: Value },
}

impl UpdatePayload for ExporterUpdate {
    fn is_noop(&self) -> bool {
        match self {
            ExporterUpdate::Settings { from, to } => from == to,
        }
    }

    fn describe(&self) -> String {
        match self {
            ExporterUpdate::Settings { from, to } => format!("settings {} -> {}", from, to),
        }
    }
}

pub type ExporterChange = Change<ExporterConfiguration, ExporterUpdate>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServiceUpdate {
    Version { from: Version, to: Version },
    Http { from: HttpInformation, to: HttpInformation },
    Exporter { exporter: ExporterChange },
}

impl UpdatePayload for ServiceUpdate {
    fn is_noop(&self) -> bool {
        match self {
            ServiceUpdate::Version { from, to } => from == to,
            ServiceUpdate::Http { from, to } => from == to,
            ServiceUpdate::Exporter { exporter } => exporter.updated().is_some_and(|u| u.is_noop()),
        }
    }

    fn describe(&self) -> String {
        match self {
            ServiceUpdate::Version { from, to } => format!("version {} -> {}", from, to),
            ServiceUpdate::Http { from, to } => format!("http {} -> {}", from, to),
            ServiceUpdate::Exporter { exporter } => {
                format!("exporter '{}' {}", exporter.id(), exporter.describe())
            }
        }
    }
}

pub type ServiceChange = Change<ServiceInformation, ServiceUpdate>;

/// Identifier used for service level changes.
pub const SERVICE_IDENTIFIER: &str = "service";

// ── Guide level ─────────────────────────────────────────────────────

/// A top-level entry of a migration guide's change list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "element", content = "change", rename_all = "camelCase")]
pub enum GuideChange {
    Service(ServiceChange),
    Model(ModelChange),
    Endpoint(EndpointChange),
}

impl GuideChange {
    pub fn element(&self) -> &'static str {
        match self {
            GuideChange::Service(_) => "service",
            GuideChange::Model(_) => "model",
            GuideChange::Endpoint(_) => "endpoint",
        }
    }

    pub fn id(&self) -> &DeltaIdentifier {
        match self {
            GuideChange::Service(c) => c.id(),
            GuideChange::Model(c) => c.id(),
            GuideChange::Endpoint(c) => c.id(),
        }
    }

    pub fn is_breaking(&self) -> bool {
        match self {
            GuideChange::Service(c) => c.is_breaking(),
            GuideChange::Model(c) => c.is_breaking(),
            GuideChange::Endpoint(c) => c.is_breaking(),
        }
    }

    pub fn is_solvable(&self) -> bool {
        match self {
            GuideChange::Service(c) => c.is_solvable(),
            GuideChange::Model(c) => c.is_solvable(),
            GuideChange::Endpoint(c) => c.is_solvable(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        match self {
            GuideChange::Service(c) => c.is_unsupported(),
            GuideChange::Model(c) => c.is_unsupported(),
            GuideChange::Endpoint(c) => c.is_unsupported(),
        }
    }

    /// `+` addition, `-` removal, `~` update, `!` unsupported.
    pub fn marker(&self) -> char {
        fn marker<E, U: UpdatePayload>(change: &Change<E, U>) -> char {
            match change {
                Change::Addition { .. } => '+',
                Change::Removal { .. } => '-',
                Change::Update { .. } => '~',
                Change::Unsupported { .. } => '!',
            }
        }
        match self {
            GuideChange::Service(c) => marker(c),
            GuideChange::Model(c) => marker(c),
            GuideChange::Endpoint(c) => marker(c),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            GuideChange::Service(c) => c.describe(),
            GuideChange::Model(c) => c.describe(),
            GuideChange::Endpoint(c) => c.describe(),
        }
    }
}
