//! Checks for the JSON Schema subset used by function declarations and
//! structured output: `type`, `properties`, `required`, `enum`,
//! `additionalProperties: false`, `items` and `default`.

use serde_json::{Map, Value};

/// Validates `value` against `schema`, reporting the first violation with
/// its JSON path.
pub fn validate(value: &Value, schema: &Value) -> Result<(), String> {
    validate_at(value, schema, "$")
}

fn validate_at(value: &Value, schema: &Value, path: &str) -> Result<(), String> {
    if let Some(expected) = schema.get("type") {
        let matches = match expected {
            Value::String(t) => type_matches(value, t),
            Value::Array(ts) => ts
                .iter()
                .filter_map(|t| t.as_str())
                .any(|t| type_matches(value, t)),
            _ => true,
        };
        if !matches {
            return Err(format!(
                "{}: expected {}, got {}",
                path,
                expected,
                type_name(value)
            ));
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(|e| e.as_array()) {
        if !allowed.contains(value) {
            return Err(format!("{}: {} is not one of {}", path, value, Value::Array(allowed.clone())));
        }
    }

    if let Value::Object(obj) = value {
        let properties = schema.get("properties").and_then(|p| p.as_object());

        for key in required_fields(schema) {
            if !obj.contains_key(key) {
                return Err(format!("{}: missing required field '{}'", path, key));
            }
        }

        for (key, field) in obj {
            match properties.and_then(|p| p.get(key)) {
                Some(field_schema) => {
                    validate_at(field, field_schema, &format!("{}.{}", path, key))?;
                }
                None => {
                    if schema.get("additionalProperties") == Some(&Value::Bool(false)) {
                        return Err(format!("{}: unexpected field '{}'", path, key));
                    }
                }
            }
        }
    }

    if let (Value::Array(items), Some(item_schema)) = (value, schema.get("items")) {
        for (i, item) in items.iter().enumerate() {
            validate_at(item, item_schema, &format!("{}[{}]", path, i))?;
        }
    }

    Ok(())
}

/// Fills absent optional properties from their declared `default`.
pub fn apply_defaults(args: &mut Map<String, Value>, schema: &Value) {
    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return;
    };
    for (key, field_schema) in properties {
        if args.contains_key(key) {
            continue;
        }
        if let Some(default) = field_schema.get("default") {
            args.insert(key.clone(), default.clone());
        }
    }
}

fn required_fields(schema: &Value) -> impl Iterator<Item = &str> {
    schema
        .get("required")
        .and_then(|r| r.as_array())
        .into_iter()
        .flatten()
        .filter_map(|k| k.as_str())
}

fn type_matches(value: &Value, expected: &str) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
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
