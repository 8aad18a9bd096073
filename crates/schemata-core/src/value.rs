//! JSON value helpers shared by the validation engine.

use serde_json::{Number, Value};

/// Short JSON type name, used in messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse a JSON-encoded object or array carried in a string.
///
/// Only strings whose first non-blank character is `open` are attempted;
/// the parse must yield the same container kind.
pub(crate) fn parse_structured(text: &str, open: char) -> Option<Value> {
    if !text.trim_start().starts_with(open) {
        return None;
    }
    let parsed: Value = serde_json::from_str(text).ok()?;
    match (&parsed, open) {
        (Value::Object(_), '{') | (Value::Array(_), '[') => Some(parsed),
        _ => None,
    }
}

/// Convert a float back into a JSON number, preferring an integer
/// representation for integral values.
pub(crate) fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        return Some(Value::Number(Number::from(n as i64)));
    }
    Number::from_f64(n).map(Value::Number)
}

/// Escape one JSON Pointer reference token (RFC 6901).
pub(crate) fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Render a list of literals the way messages quote them.
pub(crate) fn render_literals(values: &[Value]) -> String {
    let parts: Vec<String> = values
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    format!("[{}]", parts.join(", "))
}
