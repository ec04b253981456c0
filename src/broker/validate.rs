//! Argument validation against a tool's declared input schema
//!
//! Covers the subset of JSON Schema providers actually declare: `required`,
//! per-property `type`, and `enum`. Anything else in the schema is accepted.

use serde_json::{Map, Value};

use crate::error::{BrokerError, Result};

/// Tool call arguments: a string-keyed JSON object
pub type ToolArguments = Map<String, Value>;

/// Convert a model-supplied input value into an argument map
///
/// `null` becomes an empty map; any other non-object is rejected.
pub fn arguments_from_value(tool: &str, input: Value) -> Result<ToolArguments> {
    match input {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(BrokerError::InvalidArguments {
            tool: tool.to_string(),
            reason: format!("expected an object, got {}", type_name(&other)),
        }),
    }
}

/// Validate arguments against an input schema
pub fn validate_arguments(tool: &str, schema: &Value, arguments: &ToolArguments) -> Result<()> {
    let invalid = |reason: String| BrokerError::InvalidArguments {
        tool: tool.to_string(),
        reason,
    };

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for field in required.iter().filter_map(|r| r.as_str()) {
            if !arguments.contains_key(field) {
                return Err(invalid(format!("missing required field '{}'", field)));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return Ok(());
    };

    for (field, value) in arguments {
        let Some(property) = properties.get(field) else {
            continue;
        };

        if let Some(expected) = property.get("type") {
            if !matches_type(expected, value) {
                return Err(invalid(format!(
                    "field '{}' should be {}, got {}",
                    field,
                    describe_type(expected),
                    type_name(value)
                )));
            }
        }

        if let Some(allowed) = property.get("enum").and_then(|e| e.as_array())
            && !allowed.contains(value)
        {
            return Err(invalid(format!("field '{}' must be one of {}", field, Value::Array(allowed.clone()))));
        }
    }

    Ok(())
}

fn matches_type(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(name) => matches_type_name(name, value),
        // `"type": ["string", "null"]`
        Value::Array(names) => names
            .iter()
            .filter_map(|n| n.as_str())
            .any(|name| matches_type_name(name, value)),
        _ => true,
    }
}

fn matches_type_name(name: &str, value: &Value) -> bool {
    match name {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
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

    fn args(value: Value) -> ToolArguments {
        value.as_object().cloned().unwrap()
    }

    fn query_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "limit": {"type": "integer"},
                "format": {"type": "string", "enum": ["table", "json"]}
            },
            "required": ["query"]
        })
    }

    #[test]
    fn test_valid_arguments() {
        let result = validate_arguments(
            "execute_query",
            &query_schema(),
            &args(json!({"query": "SELECT 1", "limit": 10, "format": "table"})),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let err = validate_arguments("execute_query", &query_schema(), &args(json!({"limit": 10}))).unwrap_err();
        assert!(matches!(err, BrokerError::InvalidArguments { .. }));
        assert!(err.to_string().contains("missing required field 'query'"));
    }

    #[test]
    fn test_wrong_type() {
        let err =
            validate_arguments("execute_query", &query_schema(), &args(json!({"query": "x", "limit": "ten"})))
                .unwrap_err();
        assert!(err.to_string().contains("field 'limit' should be integer, got string"));
    }

    #[test]
    fn test_float_is_not_integer() {
        let result = validate_arguments("execute_query", &query_schema(), &args(json!({"query": "x", "limit": 1.5})));
        assert!(result.is_err());
    }

    #[test]
    fn test_enum_violation() {
        let err =
            validate_arguments("execute_query", &query_schema(), &args(json!({"query": "x", "format": "csv"})))
                .unwrap_err();
        assert!(err.to_string().contains("must be one of"));
    }

    #[test]
    fn test_nullable_union_type() {
        let schema = json!({"properties": {"note": {"type": ["string", "null"]}}});
        assert!(validate_arguments("t", &schema, &args(json!({"note": null}))).is_ok());
        assert!(validate_arguments("t", &schema, &args(json!({"note": 3}))).is_err());
    }

    #[test]
    fn test_extra_fields_and_empty_schema_accepted() {
        assert!(validate_arguments("t", &json!({}), &args(json!({"anything": 1}))).is_ok());
        assert!(validate_arguments("t", &query_schema(), &args(json!({"query": "x", "extra": true}))).is_ok());
    }

    #[test]
    fn test_arguments_from_value() {
        assert!(arguments_from_value("t", json!(null)).unwrap().is_empty());
        assert_eq!(arguments_from_value("t", json!({"a": 1})).unwrap()["a"], 1);
        let err = arguments_from_value("t", json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("expected an object, got array"));
    }
}
