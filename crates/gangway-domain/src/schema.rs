//! Schema definitions and instance validation
//!
//! A schema is a JSON-Schema-like document naming the fields an extraction
//! must populate. The same document serves two purposes: it is embedded
//! verbatim into the generation prompt, and it is used afterwards to check
//! that the model's output actually conforms.
//!
//! Validation is intentionally a hand-rolled walk over the constrained shape
//! used here (`type`, `properties`, `required`, `items`) rather than a full
//! JSON Schema engine. Two house rules apply on top of the declared types:
//! every top-level property key must be present and no undeclared top-level
//! key may appear (missing facts are `null`, never omitted), and `null` is
//! accepted for any field regardless of its declared type.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised when constructing a [`SchemaDefinition`]
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema document is not a JSON object
    #[error("schema '{0}' is not a JSON object")]
    NotAnObject(String),

    /// The schema document has no usable `properties` object
    #[error("schema '{0}' has no properties")]
    MissingProperties(String),

    /// `required` is present but not an array of strings
    #[error("schema '{0}' has a malformed required list")]
    MalformedRequired(String),

    /// `required` names a field that `properties` does not declare
    #[error("schema '{schema}' requires undeclared field '{field}'")]
    UnknownRequiredField {
        /// Schema name
        schema: String,
        /// Offending required entry
        field: String,
    },
}

/// A single point of non-conformance between an instance and a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (path: '{path}')")]
pub struct SchemaViolation {
    /// Slash-separated JSON path to the offending value ("root" at top level)
    pub path: String,
    /// What went wrong at that path
    pub message: String,
}

impl SchemaViolation {
    fn new(path: &str, message: impl Into<String>) -> Self {
        let path = if path.is_empty() { "root" } else { path };
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// A named, immutable extraction schema
///
/// Constructed once at startup (see [`crate::SchemaRegistry`]); the
/// constructor enforces the structural invariants so the rest of the
/// pipeline can lean on them.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    name: String,
    document: Value,
}

impl SchemaDefinition {
    /// Build a schema definition, checking structural invariants
    ///
    /// The document must be a JSON object with a non-empty `properties`
    /// object, and every entry of `required` (if present) must name a
    /// declared property.
    pub fn new(name: impl Into<String>, document: Value) -> Result<Self, SchemaError> {
        let name = name.into();

        let Some(root) = document.as_object() else {
            return Err(SchemaError::NotAnObject(name));
        };

        let Some(properties) = root.get("properties").and_then(Value::as_object) else {
            return Err(SchemaError::MissingProperties(name));
        };
        if properties.is_empty() {
            return Err(SchemaError::MissingProperties(name));
        }

        if let Some(required) = root.get("required") {
            let Some(entries) = required.as_array() else {
                return Err(SchemaError::MalformedRequired(name));
            };
            for entry in entries {
                let Some(field) = entry.as_str() else {
                    return Err(SchemaError::MalformedRequired(name));
                };
                if !properties.contains_key(field) {
                    return Err(SchemaError::UnknownRequiredField {
                        schema: name,
                        field: field.to_string(),
                    });
                }
            }
        }

        Ok(Self { name, document })
    }

    /// Schema name as registered
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full schema document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Declared properties (guaranteed non-empty by construction)
    pub fn properties(&self) -> &Map<String, Value> {
        self.document["properties"]
            .as_object()
            .expect("checked at construction")
    }

    /// Names of the declared properties, in declaration order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties().keys().map(String::as_str)
    }

    /// Names listed as required (guaranteed declared by construction)
    pub fn required(&self) -> Vec<&str> {
        self.document
            .get("required")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Pretty-printed schema document for embedding into a prompt
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.document)
            .expect("schema document is valid JSON by construction")
    }

    /// Validate an extracted instance against this schema
    ///
    /// Top level: every declared property must be present, no undeclared
    /// keys, `null` accepted anywhere. Non-null values are checked against
    /// the declared `type` (a string or a list of strings), recursing into
    /// `items` for arrays and `properties`/`required` for nested objects.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaViolation> {
        let Some(object) = instance.as_object() else {
            return Err(SchemaViolation::new("", "expected a JSON object"));
        };

        let properties = self.properties();

        for name in properties.keys() {
            if !object.contains_key(name) {
                return Err(SchemaViolation::new(
                    name,
                    "property is missing (use null for unknown values)",
                ));
            }
        }

        for key in object.keys() {
            if !properties.contains_key(key) {
                return Err(SchemaViolation::new(
                    key,
                    format!("'{key}' is not declared by schema '{}'", self.name),
                ));
            }
        }

        for (name, spec) in properties {
            check_value(spec, &object[name], name)?;
        }

        Ok(())
    }
}

/// Check one value against its property spec, recursing into containers
fn check_value(spec: &Value, value: &Value, path: &str) -> Result<(), SchemaViolation> {
    // Uniform rule: null stands for "not found" and is accepted everywhere.
    if value.is_null() {
        return Ok(());
    }

    if let Some(declared) = declared_types(spec) {
        if !declared.iter().any(|t| matches_type(value, t)) {
            return Err(SchemaViolation::new(
                path,
                format!(
                    "expected {}, got {}",
                    declared.join(" | "),
                    json_type_name(value)
                ),
            ));
        }
    }

    if let Some(items) = value.as_array() {
        if let Some(item_spec) = spec.get("items") {
            for (index, item) in items.iter().enumerate() {
                check_value(item_spec, item, &format!("{path}/{index}"))?;
            }
        }
    }

    if let Some(object) = value.as_object() {
        if let Some(nested) = spec.get("properties").and_then(Value::as_object) {
            if let Some(required) = spec.get("required").and_then(Value::as_array) {
                for entry in required.iter().filter_map(Value::as_str) {
                    if !object.contains_key(entry) {
                        return Err(SchemaViolation::new(
                            &format!("{path}/{entry}"),
                            "required property is missing",
                        ));
                    }
                }
            }
            for (key, nested_spec) in nested {
                if let Some(nested_value) = object.get(key) {
                    check_value(nested_spec, nested_value, &format!("{path}/{key}"))?;
                }
            }
        }
    }

    Ok(())
}

/// Declared type names for a property spec, if any
fn declared_types(spec: &Value) -> Option<Vec<&str>> {
    match spec.get("type")? {
        Value::String(single) => Some(vec![single.as_str()]),
        Value::Array(many) => Some(many.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

fn matches_type(value: &Value, type_name: &str) -> bool {
    match type_name {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => false,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn facility_schema() -> SchemaDefinition {
        SchemaDefinition::new(
            "facility",
            json!({
                "type": "object",
                "properties": {
                    "maturity_date": {
                        "description": "Maturity date (YYYY-MM-DD when derivable).",
                        "type": ["string", "null"]
                    },
                    "total_amount": {
                        "description": "Total facility amount.",
                        "type": ["string", "number", "null"]
                    },
                    "prepayment_penalty": {
                        "description": "Whether prepayment carries a penalty.",
                        "type": ["boolean", "null"]
                    },
                    "lead_days": {
                        "description": "Billing lead days.",
                        "type": ["integer", "null"]
                    },
                    "fees": {
                        "description": "Associated fees.",
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "fee_type": {"type": ["string", "null"]},
                                "fee_amount": {"type": ["string", "number", "null"]}
                            },
                            "required": ["fee_type"]
                        }
                    }
                },
                "required": ["maturity_date", "total_amount"]
            }),
        )
        .unwrap()
    }

    fn conforming_instance() -> Value {
        json!({
            "maturity_date": "2027-06-30",
            "total_amount": 25000000,
            "prepayment_penalty": true,
            "lead_days": 5,
            "fees": [{"fee_type": "commitment", "fee_amount": "0.25%"}]
        })
    }

    #[test]
    fn test_required_must_be_declared() {
        let result = SchemaDefinition::new(
            "bad",
            json!({
                "type": "object",
                "properties": {"a": {"type": "string"}},
                "required": ["a", "phantom"]
            }),
        );
        assert!(matches!(
            result,
            Err(SchemaError::UnknownRequiredField { ref field, .. }) if field == "phantom"
        ));
    }

    #[test]
    fn test_rejects_empty_properties() {
        let result = SchemaDefinition::new("bad", json!({"type": "object", "properties": {}}));
        assert!(matches!(result, Err(SchemaError::MissingProperties(_))));
    }

    #[test]
    fn test_conforming_instance_passes() {
        assert!(facility_schema().validate(&conforming_instance()).is_ok());
    }

    #[test]
    fn test_null_accepted_for_any_field() {
        let instance = json!({
            "maturity_date": null,
            "total_amount": null,
            "prepayment_penalty": null,
            "lead_days": null,
            "fees": null
        });
        assert!(facility_schema().validate(&instance).is_ok());
    }

    #[test]
    fn test_missing_property_rejected() {
        let mut instance = conforming_instance();
        instance.as_object_mut().unwrap().remove("maturity_date");

        let violation = facility_schema().validate(&instance).unwrap_err();
        assert_eq!(violation.path, "maturity_date");
    }

    #[test]
    fn test_undeclared_property_rejected() {
        let mut instance = conforming_instance();
        instance
            .as_object_mut()
            .unwrap()
            .insert("surprise".into(), json!("value"));

        let violation = facility_schema().validate(&instance).unwrap_err();
        assert_eq!(violation.path, "surprise");
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut instance = conforming_instance();
        instance["prepayment_penalty"] = json!("yes");

        let violation = facility_schema().validate(&instance).unwrap_err();
        assert_eq!(violation.path, "prepayment_penalty");
        assert!(violation.message.contains("boolean"));
    }

    #[test]
    fn test_integer_rejects_fraction() {
        let mut instance = conforming_instance();
        instance["lead_days"] = json!(2.5);

        let violation = facility_schema().validate(&instance).unwrap_err();
        assert_eq!(violation.path, "lead_days");
    }

    #[test]
    fn test_array_items_checked() {
        let mut instance = conforming_instance();
        instance["fees"] = json!([{"fee_type": "commitment"}, {"fee_amount": 100}]);

        let violation = facility_schema().validate(&instance).unwrap_err();
        assert_eq!(violation.path, "fees/1/fee_type");
    }

    #[test]
    fn test_non_object_instance_rejected() {
        let violation = facility_schema().validate(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(violation.path, "root");
    }

    #[test]
    fn test_pretty_json_embeds_descriptions() {
        let rendered = facility_schema().to_pretty_json();
        assert!(rendered.contains("Maturity date"));
        assert!(rendered.contains("\"required\""));
    }
}
