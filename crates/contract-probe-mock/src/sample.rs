// crates/contract-probe-mock/src/sample.rs
// ============================================================================
// Module: Schema Samples
// Description: Minimal deterministic payloads derived from response schemas.
// Purpose: Give the mock a body when a response declares no example.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`sample_from_schema`] walks an OpenAPI schema and produces the smallest
//! value that satisfies its common constraints: `const`/`enum`/`example`/
//! `default` win, objects carry their required properties, arrays carry
//! `minItems` elements, and numbers honor `minimum`. `$ref` pointers into
//! `#/components/schemas/` are followed up to a fixed depth so recursive
//! schemas terminate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix of schema references resolvable against the components object.
const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Maximum nesting before the generator yields `null`.
const MAX_DEPTH: usize = 16;

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Builds a sample value for `schema`, resolving references in `components`.
#[must_use]
pub fn sample_from_schema(schema: &Value, components: &Value) -> Value {
    sample(schema, components, 0)
}

/// Recursive worker carrying the current depth.
fn sample(schema: &Value, components: &Value, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }
    let Value::Object(map) = schema else {
        return Value::Null;
    };
    if let Some(Value::String(reference)) = map.get("$ref") {
        return reference
            .strip_prefix(SCHEMA_REF_PREFIX)
            .and_then(|name| components.get("schemas").and_then(|schemas| schemas.get(name)))
            .map_or(Value::Null, |target| sample(target, components, depth + 1));
    }
    for key in ["const", "example", "default"] {
        if let Some(value) = map.get(key) {
            return value.clone();
        }
    }
    if let Some(first) = map.get("enum").and_then(Value::as_array).and_then(|values| values.first()) {
        return first.clone();
    }
    if let Some(Value::Array(parts)) = map.get("allOf") {
        return merge_all(parts, components, depth);
    }
    for key in ["oneOf", "anyOf"] {
        if let Some(first) = map.get(key).and_then(Value::as_array).and_then(|parts| parts.first()) {
            return sample(first, components, depth + 1);
        }
    }
    match primary_type(map).as_deref() {
        Some("object") => sample_object(map, components, depth),
        Some("array") => sample_array(map, components, depth),
        Some("string") => sample_string(map),
        Some("integer") => map.get("minimum").and_then(Value::as_i64).unwrap_or(0).into(),
        Some("number") => map.get("minimum").and_then(Value::as_f64).unwrap_or(0.0).into(),
        Some("boolean") => Value::Bool(false),
        None if map.contains_key("properties") => sample_object(map, components, depth),
        _ => Value::Null,
    }
}

/// Returns the first non-null declared type.
fn primary_type(map: &Map<String, Value>) -> Option<String> {
    match map.get("type")? {
        Value::String(kind) => Some(kind.clone()),
        Value::Array(kinds) => kinds
            .iter()
            .filter_map(Value::as_str)
            .find(|kind| *kind != "null")
            .map(str::to_string),
        _ => None,
    }
}

/// Samples an object with its required properties.
fn sample_object(map: &Map<String, Value>, components: &Value, depth: usize) -> Value {
    let mut object = Map::new();
    let properties = map.get("properties").and_then(Value::as_object);
    let required = map.get("required").and_then(Value::as_array);
    for name in required.into_iter().flatten().filter_map(Value::as_str) {
        let value = properties
            .and_then(|properties| properties.get(name))
            .map_or(Value::Null, |property| sample(property, components, depth + 1));
        object.insert(name.to_string(), value);
    }
    Value::Object(object)
}

/// Samples an array with `minItems` elements.
fn sample_array(map: &Map<String, Value>, components: &Value, depth: usize) -> Value {
    let count = map.get("minItems").and_then(Value::as_u64).unwrap_or(0);
    let Some(items) = map.get("items") else {
        return Value::Array(Vec::new());
    };
    let item = sample(items, components, depth + 1);
    let count = usize::try_from(count).unwrap_or(0).min(MAX_DEPTH);
    Value::Array(vec![item; count])
}

/// Samples a string honoring well-known formats and length bounds.
fn sample_string(map: &Map<String, Value>) -> Value {
    let formatted = match map.get("format").and_then(Value::as_str) {
        Some("date-time") => Some("1970-01-01T00:00:00Z"),
        Some("date") => Some("1970-01-01"),
        Some("uuid") => Some("00000000-0000-0000-0000-000000000000"),
        Some("email") => Some("user@example.com"),
        Some("uri") => Some("http://localhost/"),
        _ => None,
    };
    if let Some(value) = formatted {
        return Value::from(value);
    }
    let bound = |key: &str| {
        map.get(key).and_then(Value::as_u64).and_then(|value| usize::try_from(value).ok())
    };
    let mut length = bound("minLength").unwrap_or(0).max(6);
    if let Some(max_length) = bound("maxLength") {
        length = length.min(max_length);
    }
    Value::from("string".chars().cycle().take(length).collect::<String>())
}

/// Merges the object samples of every `allOf` part.
fn merge_all(parts: &[Value], components: &Value, depth: usize) -> Value {
    let mut merged = Map::new();
    for part in parts {
        match sample(part, components, depth + 1) {
            Value::Object(fields) => merged.extend(fields),
            other if parts.len() == 1 => return other,
            _ => {}
        }
    }
    Value::Object(merged)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
