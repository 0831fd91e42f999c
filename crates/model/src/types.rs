//! Recursive schema shapes.
//!
//! A [`TypeInformation`] tree is finite: recursion between models is only
//! expressible through [`TypeInformation::Reference`], which names a model
//! held in the document's [`ModelTable`](crate::ModelTable).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identifier::{DeltaIdentifier, Identifiable};

// ── Primitives ──────────────────────────────────────────────────────

/// Primitive kinds a scalar (or a dictionary key) can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Uuid,
    Url,
    Date,
    Data,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 16] = [
        PrimitiveType::Bool,
        PrimitiveType::Int8,
        PrimitiveType::Int16,
        PrimitiveType::Int32,
        PrimitiveType::Int64,
        PrimitiveType::Uint8,
        PrimitiveType::Uint16,
        PrimitiveType::Uint32,
        PrimitiveType::Uint64,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::String,
        PrimitiveType::Uuid,
        PrimitiveType::Url,
        PrimitiveType::Date,
        PrimitiveType::Data,
    ];

    /// Display name, used as the shape identity of a scalar.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "Bool",
            PrimitiveType::Int8 => "Int8",
            PrimitiveType::Int16 => "Int16",
            PrimitiveType::Int32 => "Int32",
            PrimitiveType::Int64 => "Int64",
            PrimitiveType::Uint8 => "UInt8",
            PrimitiveType::Uint16 => "UInt16",
            PrimitiveType::Uint32 => "UInt32",
            PrimitiveType::Uint64 => "UInt64",
            PrimitiveType::Float => "Float",
            PrimitiveType::Double => "Double",
            PrimitiveType::String => "String",
            PrimitiveType::Uuid => "UUID",
            PrimitiveType::Url => "URL",
            PrimitiveType::Date => "Date",
            PrimitiveType::Data => "Data",
        }
    }

    /// Parse the serialized (lowercase) form.
    pub fn from_wire(raw: &str) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|p| p.wire_name() == raw)
    }

    /// The serialized (lowercase) form.
    pub fn wire_name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int8 => "int8",
            PrimitiveType::Int16 => "int16",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::Uint8 => "uint8",
            PrimitiveType::Uint16 => "uint16",
            PrimitiveType::Uint32 => "uint32",
            PrimitiveType::Uint64 => "uint64",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::String => "string",
            PrimitiveType::Uuid => "uuid",
            PrimitiveType::Url => "url",
            PrimitiveType::Date => "date",
            PrimitiveType::Data => "data",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveType::Int8
                | PrimitiveType::Int16
                | PrimitiveType::Int32
                | PrimitiveType::Int64
                | PrimitiveType::Uint8
                | PrimitiveType::Uint16
                | PrimitiveType::Uint32
                | PrimitiveType::Uint64
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, PrimitiveType::Float | PrimitiveType::Double)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_floating()
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveType::Int8
                | PrimitiveType::Int16
                | PrimitiveType::Int32
                | PrimitiveType::Int64
                | PrimitiveType::Float
                | PrimitiveType::Double
        )
    }

    /// Primitives carried as JSON strings on the wire.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            PrimitiveType::String
                | PrimitiveType::Uuid
                | PrimitiveType::Url
                | PrimitiveType::Date
                | PrimitiveType::Data
        )
    }

    /// Width in bits for numeric primitives.
    pub fn bit_width(self) -> Option<u8> {
        match self {
            PrimitiveType::Int8 | PrimitiveType::Uint8 => Some(8),
            PrimitiveType::Int16 | PrimitiveType::Uint16 => Some(16),
            PrimitiveType::Int32 | PrimitiveType::Uint32 | PrimitiveType::Float => Some(32),
            PrimitiveType::Int64 | PrimitiveType::Uint64 | PrimitiveType::Double => Some(64),
            _ => None,
        }
    }

    /// JSON value used whenever a value of this primitive must be invented.
    pub fn default_json(self) -> serde_json::Value {
        match self {
            PrimitiveType::Bool => serde_json::Value::Bool(false),
            p if p.is_integer() => serde_json::json!(0),
            PrimitiveType::Float | PrimitiveType::Double => serde_json::json!(0.0),
            PrimitiveType::Uuid => serde_json::json!("00000000-0000-0000-0000-000000000000"),
            PrimitiveType::Url => serde_json::json!("https://example.com"),
            PrimitiveType::Date => serde_json::json!("1970-01-01T00:00:00Z"),
            _ => serde_json::json!(""),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Names ───────────────────────────────────────────────────────────

/// Name of an enum or object model.
///
/// `name` is the shape identity. `defined_in` records the logical grouping
/// the model was declared in; moving a model between groupings does not
/// change its identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeName {
    pub name: String,
    #[serde(rename = "definedIn", default, skip_serializing_if = "Option::is_none")]
    pub defined_in: Option<String>,
}

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        TypeName {
            name: name.into(),
            defined_in: None,
        }
    }

    pub fn defined_in(mut self, grouping: impl Into<String>) -> Self {
        self.defined_in = Some(grouping.into());
        self
    }

    pub fn same_identity(&self, other: &TypeName) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ── Members ─────────────────────────────────────────────────────────

/// Whether a property or parameter must be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Necessity {
    #[default]
    Required,
    Optional,
}

impl fmt::Display for Necessity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Necessity::Required => write!(f, "required"),
            Necessity::Optional => write!(f, "optional"),
        }
    }
}

/// A named case of an enumerated type. The raw value is what travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumCase {
    pub name: String,
    #[serde(rename = "rawValue")]
    pub raw_value: String,
}

impl EnumCase {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        EnumCase {
            raw_value: name.clone(),
            name,
        }
    }

    pub fn with_raw_value(name: impl Into<String>, raw_value: impl Into<String>) -> Self {
        EnumCase {
            name: name.into(),
            raw_value: raw_value.into(),
        }
    }
}

impl Identifiable for EnumCase {
    fn delta_identifier(&self) -> DeltaIdentifier {
        DeltaIdentifier::new(self.name.as_str())
    }
}

/// A property of an object model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub type_information: TypeInformation,
    #[serde(default)]
    pub necessity: Necessity,
}

impl TypeProperty {
    pub fn required(name: impl Into<String>, type_information: TypeInformation) -> Self {
        TypeProperty {
            name: name.into(),
            type_information,
            necessity: Necessity::Required,
        }
    }

    pub fn optional(name: impl Into<String>, type_information: TypeInformation) -> Self {
        TypeProperty {
            name: name.into(),
            type_information,
            necessity: Necessity::Optional,
        }
    }
}

impl Identifiable for TypeProperty {
    fn delta_identifier(&self) -> DeltaIdentifier {
        DeltaIdentifier::new(self.name.as_str())
    }
}

// ── TypeInformation ─────────────────────────────────────────────────

/// The top-level category of a [`TypeInformation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Scalar,
    Repeated,
    Dictionary,
    Optional,
    Enum,
    Object,
    Reference,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Repeated => "repeated",
            TypeKind::Dictionary => "dictionary",
            TypeKind::Optional => "optional",
            TypeKind::Enum => "enum",
            TypeKind::Object => "object",
            TypeKind::Reference => "reference",
        };
        f.write_str(s)
    }
}

/// A schema shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeInformation {
    Scalar(PrimitiveType),
    Repeated(Box<TypeInformation>),
    Dictionary {
        key: PrimitiveType,
        value: Box<TypeInformation>,
    },
    Optional(Box<TypeInformation>),
    Enum {
        name: TypeName,
        #[serde(rename = "rawValueType", default = "default_raw_value_type")]
        raw_value_type: PrimitiveType,
        cases: Vec<EnumCase>,
    },
    Object {
        name: TypeName,
        properties: Vec<TypeProperty>,
    },
    Reference(String),
}

fn default_raw_value_type() -> PrimitiveType {
    PrimitiveType::String
}

impl TypeInformation {
    pub fn scalar(primitive: PrimitiveType) -> Self {
        TypeInformation::Scalar(primitive)
    }

    pub fn repeated(element: TypeInformation) -> Self {
        TypeInformation::Repeated(Box::new(element))
    }

    pub fn dictionary(key: PrimitiveType, value: TypeInformation) -> Self {
        TypeInformation::Dictionary {
            key,
            value: Box::new(value),
        }
    }

    pub fn optional(wrapped: TypeInformation) -> Self {
        TypeInformation::Optional(Box::new(wrapped))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        TypeInformation::Reference(name.into())
    }

    /// A string-backed enum whose raw values equal the case names.
    pub fn enumeration(name: impl Into<String>, cases: &[&str]) -> Self {
        TypeInformation::Enum {
            name: TypeName::new(name),
            raw_value_type: PrimitiveType::String,
            cases: cases.iter().map(|c| EnumCase::new(*c)).collect(),
        }
    }

    pub fn object(name: impl Into<String>, properties: Vec<TypeProperty>) -> Self {
        TypeInformation::Object {
            name: TypeName::new(name),
            properties,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            TypeInformation::Scalar(_) => TypeKind::Scalar,
            TypeInformation::Repeated(_) => TypeKind::Repeated,
            TypeInformation::Dictionary { .. } => TypeKind::Dictionary,
            TypeInformation::Optional(_) => TypeKind::Optional,
            TypeInformation::Enum { .. } => TypeKind::Enum,
            TypeInformation::Object { .. } => TypeKind::Object,
            TypeInformation::Reference(_) => TypeKind::Reference,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeInformation::Scalar(_))
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self, TypeInformation::Repeated(_))
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self, TypeInformation::Dictionary { .. })
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeInformation::Optional(_))
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, TypeInformation::Enum { .. })
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeInformation::Object { .. })
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, TypeInformation::Reference(_))
    }

    /// Strip any number of outer `Optional` wrappers.
    pub fn unwrapped(&self) -> &TypeInformation {
        match self {
            TypeInformation::Optional(inner) => inner.unwrapped(),
            other => other,
        }
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            TypeInformation::Scalar(p) => Some(*p),
            _ => None,
        }
    }

    /// Name of the enum or object this shape defines, if any.
    pub fn model_name(&self) -> Option<&TypeName> {
        match self {
            TypeInformation::Enum { name, .. } | TypeInformation::Object { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Shape identity used to detect type changes.
    ///
    /// A reference and the model it names share one identity, so inlining
    /// or extracting a model is not a change.
    pub fn type_name(&self) -> String {
        match self {
            TypeInformation::Scalar(p) => p.name().to_string(),
            TypeInformation::Repeated(element) => format!("[{}]", element.type_name()),
            TypeInformation::Dictionary { key, value } => {
                format!("[{}: {}]", key.name(), value.type_name())
            }
            TypeInformation::Optional(wrapped) => format!("{}?", wrapped.type_name()),
            TypeInformation::Enum { name, .. } | TypeInformation::Object { name, .. } => {
                name.name.clone()
            }
            TypeInformation::Reference(name) => name.clone(),
        }
    }

    /// Names of all models referenced anywhere inside this shape, in
    /// first-occurrence order.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeInformation::Scalar(_) | TypeInformation::Enum { .. } => {}
            TypeInformation::Repeated(inner) | TypeInformation::Optional(inner) => {
                inner.collect_references(out)
            }
            TypeInformation::Dictionary { value, .. } => value.collect_references(out),
            TypeInformation::Object { properties, .. } => {
                for p in properties {
                    p.type_information.collect_references(out);
                }
            }
            TypeInformation::Reference(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name.as_str());
                }
            }
        }
    }

    pub fn properties(&self) -> &[TypeProperty] {
        match self {
            TypeInformation::Object { properties, .. } => properties,
            _ => &[],
        }
    }

    pub fn cases(&self) -> &[EnumCase] {
        match self {
            TypeInformation::Enum { cases, .. } => cases,
            _ => &[],
        }
    }
}

impl fmt::Display for TypeInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

impl Identifiable for TypeInformation {
    fn delta_identifier(&self) -> DeltaIdentifier {
        match self.model_name() {
            Some(name) => DeltaIdentifier::new(name.name.as_str()),
            None => DeltaIdentifier::new(self.type_name()),
        }
    }
}
