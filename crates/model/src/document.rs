//! Endpoints, service metadata and the document that bundles them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::identifier::{DeltaIdentifier, Identifiable};
use crate::table::ModelTable;
use crate::types::{Necessity, TypeInformation};

// ── Version ─────────────────────────────────────────────────────────

/// Semantic version of a document, serialized as `"MAJOR.MINOR.PATCH"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::new(1, 0, 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A version string that is not `MAJOR.MINOR.PATCH`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version '{0}': expected MAJOR.MINOR.PATCH")]
pub struct VersionParseError(pub String);

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(VersionParseError(s.to_string()));
        }
        let parse = |p: &str| p.parse::<u64>().map_err(|_| VersionParseError(s.to_string()));
        Ok(Version {
            major: parse(parts[0])?,
            minor: parse(parts[1])?,
            patch: parse(parts[2])?,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

// ── Parameters ──────────────────────────────────────────────────────

/// Where a parameter travels in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Path,
    Query,
    Header,
    Content,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterKind::Path => "path",
            ParameterKind::Query => "query",
            ParameterKind::Header => "header",
            ParameterKind::Content => "content",
        };
        f.write_str(s)
    }
}

/// An endpoint parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_information: TypeInformation,
    pub kind: ParameterKind,
    #[serde(default)]
    pub necessity: Necessity,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        type_information: TypeInformation,
        kind: ParameterKind,
        necessity: Necessity,
    ) -> Self {
        Parameter {
            name: name.into(),
            type_information,
            kind,
            necessity,
        }
    }
}

impl Identifiable for Parameter {
    fn delta_identifier(&self) -> DeltaIdentifier {
        DeltaIdentifier::new(self.name.as_str())
    }
}

// ── Endpoints ───────────────────────────────────────────────────────

/// Request/response shape of an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommunicationPattern {
    #[default]
    RequestResponse,
    ClientSideStream,
    ServiceSideStream,
    BidirectionalStream,
}

impl fmt::Display for CommunicationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommunicationPattern::RequestResponse => "requestResponse",
            CommunicationPattern::ClientSideStream => "clientSideStream",
            CommunicationPattern::ServiceSideStream => "serviceSideStream",
            CommunicationPattern::BidirectionalStream => "bidirectionalStream",
        };
        f.write_str(s)
    }
}

/// An error an endpoint declares it may answer with.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

impl ErrorCode {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        ErrorCode {
            code,
            message: message.into(),
        }
    }
}

/// Key of the path entry in [`Endpoint::identifiers`].
pub const PATH_IDENTIFIER: &str = "path";

/// An exposed operation of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: DeltaIdentifier,
    /// External identifiers: the path plus transport specific metadata
    /// (operation, handler name, ...).
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
    #[serde(default)]
    pub communication_pattern: CommunicationPattern,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub response: TypeInformation,
    #[serde(default)]
    pub errors: Vec<ErrorCode>,
}

impl Endpoint {
    pub fn new(id: impl Into<DeltaIdentifier>, path: &str, response: TypeInformation) -> Self {
        let mut identifiers = BTreeMap::new();
        identifiers.insert(PATH_IDENTIFIER.to_string(), path.to_string());
        Endpoint {
            id: id.into(),
            identifiers,
            communication_pattern: CommunicationPattern::RequestResponse,
            parameters: Vec::new(),
            response,
            errors: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_identifier(mut self, key: &str, value: &str) -> Self {
        self.identifiers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_error(mut self, error: ErrorCode) -> Self {
        self.errors.push(error);
        self
    }

    pub fn path(&self) -> Option<&str> {
        self.identifiers.get(PATH_IDENTIFIER).map(|s| s.as_str())
    }
}

impl Identifiable for Endpoint {
    fn delta_identifier(&self) -> DeltaIdentifier {
        self.id.clone()
    }
}

// ── Service metadata ────────────────────────────────────────────────

/// Where the service is reachable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HttpInformation {
    pub hostname: String,
    pub port: u16,
}

impl HttpInformation {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        HttpInformation {
            hostname: hostname.into(),
            port,
        }
    }
}

impl Default for HttpInformation {
    fn default() -> Self {
        HttpInformation::new("0.0.0.0", 80)
    }
}

impl fmt::Display for HttpInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

/// Configuration of one transport exporter (REST, gRPC, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfiguration {
    pub kind: String,
    #[serde(default)]
    pub settings: BTreeMap<String, Value>,
}

impl ExporterConfiguration {
    pub fn new(kind: impl Into<String>) -> Self {
        ExporterConfiguration {
            kind: kind.into(),
            settings: BTreeMap::new(),
        }
    }

    pub fn with_setting(mut self, key: &str, value: Value) -> Self {
        self.settings.insert(key.to_string(), value);
        self
    }
}

impl Identifiable for ExporterConfiguration {
    fn delta_identifier(&self) -> DeltaIdentifier {
        DeltaIdentifier::new(self.kind.as_str())
    }
}

/// Service level metadata of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInformation {
    pub version: Version,
    #[serde(default)]
    pub http: HttpInformation,
    #[serde(default)]
    pub exporters: Vec<ExporterConfiguration>,
}

// ── Document ────────────────────────────────────────────────────────

/// A structural snapshot of one version of a service API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document identity, recorded in migration guides for compatibility checks.
    pub id: String,
    pub service: ServiceInformation,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub models: ModelTable,
}

impl Document {
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        Document {
            id: id.into(),
            service: ServiceInformation {
                version,
                ..ServiceInformation::default()
            },
            endpoints: Vec::new(),
            models: ModelTable::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn with_model(mut self, model: TypeInformation) -> Self {
        let mut models: Vec<TypeInformation> = self.models.into();
        models.push(model);
        self.models = ModelTable::new(models);
        self
    }

    pub fn version(&self) -> Version {
        self.service.version
    }

    pub fn endpoint(&self, id: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.id.as_str() == id)
    }
}
