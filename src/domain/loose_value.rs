//! Form fields arrive untyped from a browser front-end. These helpers turn
//! arbitrary JSON scalars into text the way the front-end's own runtime
//! would print them.

use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// `30.0` prints as `30`, integers print unchanged.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

/// Text of a value as string interpolation renders it.
pub fn interpolate(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => interpolate(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// `None` for `null`, `false`, `0` and `""`, the interpolated text otherwise.
pub fn truthy_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(interpolate(&other)),
    }
}

/// Accepts a string, number or boolean and stores it as text. Arrays and
/// objects are rejected.
pub fn deserialize_option_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(interpolate(&scalar))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "cannot store `{}` as text",
            other
        ))),
    }
}
