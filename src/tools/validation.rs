//! Check tool-call arguments against the tool's JSON Schema before running it.

use serde_json::Value;

/// First schema violation found in a set of arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation(pub String);

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate `args` against a top-level object `schema`.
///
/// Covers the object type itself, required fields, property types and
/// string enums. Nested schemas are not descended into.
pub fn validate_arguments(args: &Value, schema: &Value) -> Result<(), SchemaViolation> {
    let expects_object = schema.get("type").and_then(Value::as_str) == Some("object");
    let Some(obj) = args.as_object() else {
        if expects_object {
            return Err(SchemaViolation(format!(
                "expected object arguments, got {}",
                json_type_name(args)
            )));
        }
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        if let Some(missing) = required
            .iter()
            .filter_map(Value::as_str)
            .find(|name| !obj.contains_key(*name))
        {
            return Err(SchemaViolation(format!("missing required field '{missing}'")));
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (key, value) in obj {
        let Some(prop) = properties.get(key) else {
            continue;
        };
        if let Some(expected) = prop.get("type").and_then(Value::as_str) {
            if !value_matches_type(value, expected) {
                return Err(SchemaViolation(format!(
                    "field '{key}' expected type '{expected}', got {}",
                    json_type_name(value)
                )));
            }
        }
        if let Some(allowed) = prop.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                return Err(SchemaViolation(format!(
                    "field '{key}' must be one of {}",
                    Value::Array(allowed.clone())
                )));
            }
        }
    }

    Ok(())
}

fn value_matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
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

    fn weather_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": { "type": "string" },
                "lang": { "type": "string", "enum": ["zh", "en"] },
            },
            "required": ["location"],
        })
    }

    #[test]
    fn accepts_required_fields() {
        assert!(validate_arguments(&json!({"location": "Guangzhou"}), &weather_schema()).is_ok());
    }

    #[test]
    fn rejects_bare_string_for_object_schema() {
        let err = validate_arguments(&json!("Guangzhou"), &weather_schema()).unwrap_err();
        assert!(err.0.contains("expected object"));
    }

    #[test]
    fn rejects_missing_required_field() {
        let err = validate_arguments(&json!({"lang": "zh"}), &weather_schema()).unwrap_err();
        assert_eq!(err.0, "missing required field 'location'");
    }

    #[test]
    fn rejects_wrong_property_type() {
        let err = validate_arguments(&json!({"location": 42}), &weather_schema()).unwrap_err();
        assert!(err.0.contains("expected type 'string'"));
    }

    #[test]
    fn rejects_value_outside_enum() {
        let err = validate_arguments(&json!({"location": "Paris", "lang": "fr"}), &weather_schema())
            .unwrap_err();
        assert!(err.0.contains("must be one of"));
    }

    #[test]
    fn ignores_unknown_properties_and_untyped_schemas() {
        assert!(validate_arguments(&json!({"location": "Paris", "extra": 1}), &weather_schema()).is_ok());
        assert!(validate_arguments(&Value::Null, &json!({})).is_ok());
    }
}
