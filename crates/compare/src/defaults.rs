//! Synthesized JSON values for shapes.
//!
//! Used for default values of newly required elements, fallback values of
//! removed properties and the object JSONs of breaking models.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use evolve_model::{ModelTable, Necessity, PrimitiveType, TypeInformation};

/// A JSON value that satisfies `ty`.
///
/// References are resolved against `models`. A reference that is already
/// being expanded yields `null` at the point of recursion.
pub fn default_value(ty: &TypeInformation, models: &ModelTable) -> Value {
    let mut visiting = BTreeSet::new();
    synthesize(ty, models, &mut visiting)
}

fn synthesize<'a>(
    ty: &'a TypeInformation,
    models: &'a ModelTable,
    visiting: &mut BTreeSet<&'a str>,
) -> Value {
    match ty {
        TypeInformation::Scalar(p) => p.default_json(),
        TypeInformation::Repeated(_) => Value::Array(Vec::new()),
        TypeInformation::Dictionary { .. } => Value::Object(Map::new()),
        TypeInformation::Optional(_) => Value::Null,
        TypeInformation::Enum {
            raw_value_type,
            cases,
            ..
        } => match cases.first() {
            Some(case) => raw_json(&case.raw_value, *raw_value_type),
            None => Value::Null,
        },
        TypeInformation::Object { properties, .. } => {
            let mut out = Map::new();
            for property in properties {
                let value = match property.necessity {
                    Necessity::Optional => Value::Null,
                    Necessity::Required => synthesize(&property.type_information, models, visiting),
                };
                out.insert(property.name.clone(), value);
            }
            Value::Object(out)
        }
        TypeInformation::Reference(name) => {
            let Some(model) = models.get(name) else {
                return Value::Null;
            };
            if !visiting.insert(name.as_str()) {
                return Value::Null;
            }
            let value = synthesize(model, models, visiting);
            visiting.remove(name.as_str());
            value
        }
    }
}

/// JSON form of an enum raw value, numeric when the raw type is numeric.
pub(crate) fn raw_json(raw: &str, raw_type: PrimitiveType) -> Value {
    if raw_type.is_integer() {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::from(n);
        }
    } else if raw_type.is_floating() {
        if let Ok(n) = raw.parse::<f64>() {
            if let Some(number) = serde_json::Number::from_f64(n) {
                return Value::Number(number);
            }
        }
    }
    Value::String(raw.to_string())
}
