//! Conversion script generation.
//!
//! A type change references two scripts: one converting a JSON encoded
//! value of the old shape into the new shape and one converting back. The
//! scripts are plain JavaScript `convert(input)` functions taking and
//! returning JSON strings. They are generated deterministically and never
//! executed here.

use serde_json::Value;
use std::collections::BTreeMap;

use evolve_model::{ModelTable, Necessity, PrimitiveType, TypeInformation, TypeProperty};

use crate::defaults::{default_value, raw_json};

/// Nesting depth after which the conversion falls back to a default value.
const MAX_DEPTH: usize = 8;

const INPUT: &str = "parsedInput";

/// A generated script and the lossy steps it performs, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub script: String,
    pub warning: Option<String>,
}

/// Generates conversions from shapes of one document to shapes of another.
pub struct ScriptBuilder<'a> {
    from_models: &'a ModelTable,
    to_models: &'a ModelTable,
}

/// Output collected while generating one script.
///
/// Every pair of object models gets one `convertModelN` helper, emitted
/// once and called from every position the pair occurs in, so recursive
/// models are converted by recursive helpers instead of being expanded.
#[derive(Default)]
struct Emission {
    warnings: Vec<String>,
    helpers: Vec<String>,
    helper_index: BTreeMap<(String, String), usize>,
}

impl Emission {
    fn warn(&mut self, warning: String) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    fn warning(&self) -> Option<String> {
        (!self.warnings.is_empty()).then(|| self.warnings.join("; "))
    }
}

impl<'a> ScriptBuilder<'a> {
    pub fn new(from_models: &'a ModelTable, to_models: &'a ModelTable) -> Self {
        ScriptBuilder {
            from_models,
            to_models,
        }
    }

    /// Script converting `from` encoded JSON into `to` encoded JSON.
    pub fn conversion(&self, from: &TypeInformation, to: &TypeInformation) -> Conversion {
        let mut out = Emission::default();
        let expression = self.expression(from, to, INPUT, 0, &mut out);
        let fallback = default_value(to, self.to_models);
        let mut script = out.helpers.concat();
        script.push_str(&format!(
            "function convert(input) {{\n  let {input};\n  try {{\n    {input} = JSON.parse(input);\n  }} catch (e) {{\n    return JSON.stringify({fallback});\n  }}\n  return JSON.stringify({expression});\n}}\n",
            input = INPUT,
        ));
        Conversion {
            script,
            warning: out.warning(),
        }
    }

    fn fallback(&self, to: &TypeInformation) -> String {
        default_value(to, self.to_models).to_string()
    }

    fn expression(
        &self,
        from: &TypeInformation,
        to: &TypeInformation,
        var: &str,
        depth: usize,
        out: &mut Emission,
    ) -> String {
        if from.type_name() == to.type_name() {
            return var.to_string();
        }
        if depth > MAX_DEPTH {
            out.warn(format!(
                "conversion from {} to {} is nested too deeply; a default value is used",
                from, to
            ));
            return self.fallback(to);
        }

        let from = self.from_models.resolve(from);
        let to = self.to_models.resolve(to);

        match (from, to) {
            (TypeInformation::Optional(a), TypeInformation::Optional(b)) => {
                let inner = self.expression(a, b, var, depth, out);
                format!("({var} == null ? null : {inner})")
            }
            (TypeInformation::Optional(a), b) => {
                out.warn(format!("absent {} values are replaced by a default", a));
                let inner = self.expression(a, b, var, depth, out);
                format!("({var} == null ? {} : {inner})", self.fallback(b))
            }
            (a, TypeInformation::Optional(b)) => self.expression(a, b, var, depth, out),
            (TypeInformation::Scalar(p), TypeInformation::Scalar(q)) => {
                scalar_expression(*p, *q, var, out)
            }
            (TypeInformation::Repeated(a), TypeInformation::Repeated(b)) => {
                let element = format!("element{}", depth);
                let inner = self.expression(a, b, &element, depth + 1, out);
                format!("{var}.map(({element}) => {inner})")
            }
            (TypeInformation::Repeated(a), b) => {
                out.warn(format!(
                    "only the first element of {} is kept when converting to {}",
                    from, to
                ));
                let inner = self.expression(a, b, &format!("{var}[0]"), depth + 1, out);
                format!("({var}.length > 0 ? {inner} : {})", self.fallback(b))
            }
            (a, TypeInformation::Repeated(b)) => {
                let inner = self.expression(a, b, var, depth + 1, out);
                format!("[{inner}]")
            }
            (
                TypeInformation::Dictionary { key: k1, value: v1 },
                TypeInformation::Dictionary { key: k2, value: v2 },
            ) => {
                if k1 != k2 {
                    out.warn(format!(
                        "dictionary keys change from {} to {} and are kept as is",
                        k1, k2
                    ));
                }
                let key = format!("key{}", depth);
                let value = format!("value{}", depth);
                let inner = self.expression(v1, v2, &value, depth + 1, out);
                format!(
                    "Object.fromEntries(Object.entries({var}).map(([{key}, {value}]) => [{key}, {inner}]))"
                )
            }
            (
                TypeInformation::Object {
                    name: lhs_name,
                    properties: lhs,
                },
                TypeInformation::Object {
                    name: rhs_name,
                    properties: rhs,
                },
            ) => {
                let key = (lhs_name.name.clone(), rhs_name.name.clone());
                let helper = match out.helper_index.get(&key) {
                    Some(&index) => index,
                    None => {
                        let index = out.helpers.len();
                        out.helper_index.insert(key, index);
                        out.helpers.push(String::new());
                        let body = self.object_expression(lhs, rhs, "value", 0, out);
                        out.helpers[index] = format!(
                            "function convertModel{index}(value) {{\n  return {body};\n}}\n"
                        );
                        index
                    }
                };
                format!("convertModel{helper}({var})")
            }
            (
                TypeInformation::Enum { cases: lhs, .. },
                TypeInformation::Enum {
                    raw_value_type: rhs_raw,
                    cases: rhs,
                    ..
                },
            ) => {
                let mut mapping = Vec::new();
                for case in lhs {
                    match rhs.iter().find(|c| c.name == case.name) {
                        Some(target) => mapping.push(format!(
                            "{}: {}",
                            Value::String(case.raw_value.clone()),
                            raw_json(&target.raw_value, *rhs_raw)
                        )),
                        None => out.warn(format!(
                            "case '{}' has no counterpart in {}; a default value is used",
                            case.name, to
                        )),
                    }
                }
                format!(
                    "({{{}}}[String({var})] ?? {})",
                    mapping.join(", "),
                    self.fallback(to)
                )
            }
            (TypeInformation::Enum { .. }, TypeInformation::Scalar(q)) if q.is_string_like() => {
                format!("String({var})")
            }
            _ => {
                out.warn(format!(
                    "no conversion from {} to {}; a default value is used",
                    from, to
                ));
                self.fallback(to)
            }
        }
    }

    fn object_expression(
        &self,
        lhs: &[TypeProperty],
        rhs: &[TypeProperty],
        var: &str,
        depth: usize,
        out: &mut Emission,
    ) -> String {
        let source: BTreeMap<&str, &TypeProperty> =
            lhs.iter().map(|p| (p.name.as_str(), p)).collect();
        let mut fields = Vec::new();
        for target in rhs {
            let key = Value::String(target.name.clone()).to_string();
            let target_type = effective_type(target);
            let value = match source.get(target.name.as_str()) {
                Some(origin) => {
                    let origin_type = effective_type(origin);
                    let access = format!("{var}[{key}]");
                    self.expression(&origin_type, &target_type, &access, depth + 1, out)
                }
                None => {
                    if target.necessity == Necessity::Required {
                        out.warn(format!(
                            "property '{}' is filled with a default value",
                            target.name
                        ));
                    }
                    self.fallback(&target_type)
                }
            };
            fields.push(format!("{key}: {value}"));
        }
        format!("{{{}}}", fields.join(", "))
    }
}

/// The property type, wrapped in `Optional` when the property is optional.
fn effective_type(property: &TypeProperty) -> TypeInformation {
    match property.necessity {
        Necessity::Optional if !property.type_information.is_optional() => {
            TypeInformation::optional(property.type_information.clone())
        }
        _ => property.type_information.clone(),
    }
}

fn scalar_expression(
    from: PrimitiveType,
    to: PrimitiveType,
    var: &str,
    out: &mut Emission,
) -> String {
    if from == to {
        return var.to_string();
    }
    if from.is_numeric() && to.is_numeric() {
        return numeric_expression(from, to, var, out);
    }
    if to.is_string_like() {
        if from.is_string_like() {
            if to != PrimitiveType::String {
                out.warn(format!("not every {} is a valid {}", from, to));
            }
            return var.to_string();
        }
        return format!("String({var})");
    }
    match (from, to) {
        (f, t) if f.is_string_like() && t.is_integer() => {
            out.warn(format!("{} values that are not integers become NaN", f));
            format!("parseInt({var}, 10)")
        }
        (f, t) if f.is_string_like() && t.is_floating() => {
            out.warn(format!("{} values that are not numbers become NaN", f));
            format!("parseFloat({var})")
        }
        (f, PrimitiveType::Bool) if f.is_string_like() => {
            out.warn(format!("{} values other than \"true\" become false", f));
            format!("({var} === \"true\")")
        }
        (PrimitiveType::Bool, t) if t.is_numeric() => format!("({var} ? 1 : 0)"),
        (f, PrimitiveType::Bool) if f.is_numeric() => {
            out.warn(format!("{} values other than 0 become true", f));
            format!("({var} !== 0)")
        }
        _ => var.to_string(),
    }
}

fn numeric_expression(
    from: PrimitiveType,
    to: PrimitiveType,
    var: &str,
    out: &mut Emission,
) -> String {
    let narrower = to.bit_width() < from.bit_width();
    if from.is_floating() && to.is_integer() {
        out.warn(format!("fractional part is truncated converting {} to {}", from, to));
        return format!("Math.trunc({var})");
    }
    if from.is_integer() && to.is_integer() {
        let sign_loss = from.is_signed() && !to.is_signed();
        let sign_gain = !from.is_signed() && to.is_signed() && to.bit_width() <= from.bit_width();
        if narrower || sign_loss || sign_gain {
            out.warn(format!("{} values may not fit into {}", from, to));
        }
        return var.to_string();
    }
    if narrower || (from == PrimitiveType::Int64 || from == PrimitiveType::Uint64) {
        out.warn(format!("precision may be lost converting {} to {}", from, to));
    }
    var.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use evolve_model::TypeProperty;

    fn scalar(p: PrimitiveType) -> TypeInformation {
        TypeInformation::scalar(p)
    }

    fn convert(from: &TypeInformation, to: &TypeInformation) -> Conversion {
        let models = ModelTable::default();
        ScriptBuilder::new(&models, &models).conversion(from, to)
    }

    #[test]
    fn script_is_a_convert_function_with_fallback() {
        let conversion = convert(&scalar(PrimitiveType::Int32), &scalar(PrimitiveType::String));
        assert!(conversion.script.starts_with("function convert(input) {"));
        assert!(conversion.script.contains("return JSON.stringify(\"\");"));
        assert!(conversion.script.contains("return JSON.stringify(String(parsedInput));"));
        assert_eq!(conversion.warning, None);
    }

    #[test]
    fn widening_is_silent_and_narrowing_warns() {
        assert_eq!(
            convert(&scalar(PrimitiveType::Int32), &scalar(PrimitiveType::Int64)).warning,
            None
        );
        let narrowing = convert(&scalar(PrimitiveType::Int64), &scalar(PrimitiveType::Int32));
        assert_eq!(
            narrowing.warning.as_deref(),
            Some("Int64 values may not fit into Int32")
        );
        let truncating = convert(&scalar(PrimitiveType::Double), &scalar(PrimitiveType::Int32));
        assert!(truncating.script.contains("Math.trunc(parsedInput)"));
        assert!(truncating.warning.is_some());
    }

    #[test]
    fn string_to_number_is_lossy() {
        let conversion = convert(&scalar(PrimitiveType::String), &scalar(PrimitiveType::Int32));
        assert!(conversion.script.contains("parseInt(parsedInput, 10)"));
        assert!(conversion.warning.is_some());
    }

    #[test]
    fn collections_convert_element_wise() {
        let conversion = convert(
            &TypeInformation::repeated(scalar(PrimitiveType::Int32)),
            &TypeInformation::repeated(scalar(PrimitiveType::String)),
        );
        assert!(conversion
            .script
            .contains("parsedInput.map((element0) => String(element0))"));
    }

    #[test]
    fn scalar_is_wrapped_into_an_array() {
        let conversion = convert(
            &scalar(PrimitiveType::String),
            &TypeInformation::repeated(scalar(PrimitiveType::String)),
        );
        assert!(conversion.script.contains("JSON.stringify([parsedInput])"));
        assert_eq!(conversion.warning, None);
    }

    #[test]
    fn objects_convert_property_wise() {
        let from_models = ModelTable::new(vec![TypeInformation::object(
            "User",
            vec![TypeProperty::required("age", scalar(PrimitiveType::Int32))],
        )]);
        let to_models = ModelTable::new(vec![TypeInformation::object(
            "Person",
            vec![
                TypeProperty::required("age", scalar(PrimitiveType::String)),
                TypeProperty::required("email", scalar(PrimitiveType::String)),
            ],
        )]);
        let conversion = ScriptBuilder::new(&from_models, &to_models).conversion(
            &TypeInformation::reference("User"),
            &TypeInformation::reference("Person"),
        );
        assert!(conversion.script.starts_with(
            "function convertModel0(value) {\n  return {\"age\": String(value[\"age\"]), \"email\": \"\"};\n}\n"
        ));
        assert!(conversion
            .script
            .contains("return JSON.stringify(convertModel0(parsedInput));"));
        assert_eq!(
            conversion.warning.as_deref(),
            Some("property 'email' is filled with a default value")
        );
    }

    #[test]
    fn enums_map_cases_by_name() {
        let from = TypeInformation::enumeration("Color", &["red", "green"]);
        let to = TypeInformation::enumeration("Colour", &["red", "blue"]);
        let conversion = convert(&from, &to);
        assert!(conversion
            .script
            .contains("({\"red\": \"red\"}[String(parsedInput)] ?? \"red\")"));
        assert!(conversion.warning.unwrap().contains("case 'green'"));
    }

    #[test]
    fn unrelated_shapes_fall_back_to_defaults() {
        let conversion = convert(
            &TypeInformation::dictionary(PrimitiveType::String, scalar(PrimitiveType::Int32)),
            &scalar(PrimitiveType::Bool),
        );
        assert!(conversion.script.contains("return JSON.stringify(false);"));
        assert!(conversion.warning.unwrap().starts_with("no conversion from"));
    }

    #[test]
    fn generation_is_deterministic() {
        let from = TypeInformation::optional(scalar(PrimitiveType::Float));
        let to = scalar(PrimitiveType::Uint8);
        assert_eq!(convert(&from, &to), convert(&from, &to));
    }

    fn self_referencing(name: &str, property: &str, references: usize) -> TypeInformation {
        let mut properties = vec![TypeProperty::required(property, scalar(PrimitiveType::String))];
        for i in 0..references {
            properties.push(TypeProperty::optional(
                format!("link{}", i),
                TypeInformation::reference(name),
            ));
        }
        TypeInformation::object(name, properties)
    }

    #[test]
    fn recursive_models_convert_through_one_helper() {
        let from_models = ModelTable::new(vec![self_referencing("Person", "name", 6)]);
        let to_models = ModelTable::new(vec![self_referencing("Human", "name", 6)]);
        let conversion = ScriptBuilder::new(&from_models, &to_models).conversion(
            &TypeInformation::reference("Person"),
            &TypeInformation::reference("Human"),
        );

        assert_eq!(conversion.script.matches("function convertModel").count(), 1);
        assert!(conversion.script.contains(
            "\"link5\": (value[\"link5\"] == null ? null : convertModel0(value[\"link5\"]))"
        ));
        assert!(conversion.script.len() < 1024, "{}", conversion.script);
        assert_eq!(conversion.warning, None);
    }

    #[test]
    fn mutually_recursive_models_get_one_helper_per_pair() {
        let node = |name: &str, other: &str| {
            TypeInformation::object(
                name,
                vec![
                    TypeProperty::required("id", scalar(PrimitiveType::Int32)),
                    TypeProperty::optional("next", TypeInformation::reference(other)),
                ],
            )
        };
        let from_models = ModelTable::new(vec![node("A", "B"), node("B", "A")]);
        let to_models = ModelTable::new(vec![node("C", "D"), node("D", "C")]);
        let conversion = ScriptBuilder::new(&from_models, &to_models).conversion(
            &TypeInformation::reference("A"),
            &TypeInformation::reference("C"),
        );
        assert_eq!(conversion.script.matches("function convertModel").count(), 2);
        assert!(conversion.script.contains("convertModel1(value[\"next\"])"));
        assert!(conversion.script.contains("convertModel0(value[\"next\"])"));
    }
}
