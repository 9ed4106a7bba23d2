//! Schema casts applied to client values before a user is stored.
//!
//! Values that cannot be cast fail the write with `AppError::DatabaseError`,
//! the same outcome as any other persistence failure.

use serde_json::{Number, Value};
use service_core::error::AppError;

/// Casts to a string path: strings as-is, numbers and booleans stringified.
pub fn to_string_field(path: &str, value: Option<&Value>) -> Result<Option<String>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(format_number(n))),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(cast_error("String", path, other)),
    }
}

/// Casts to a number path: numbers as-is, numeric strings parsed, booleans
/// as 1/0 and blank strings as absent.
pub fn to_number_field(path: &str, value: Option<&Value>) -> Result<Option<f64>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| cast_error("Number", path, &Value::Number(n.clone()))),
        Some(Value::Bool(b)) => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v @ Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(cast_error("Number", path, v)),
        },
        Some(other) => Err(cast_error("Number", path, other)),
    }
}

/// Renders a number without a trailing `.0` when it is integral.
pub fn format_number(n: &Number) -> String {
    if n.is_f64() {
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    } else {
        n.to_string()
    }
}

fn cast_error(kind: &str, path: &str, value: &Value) -> AppError {
    AppError::DatabaseError(anyhow::anyhow!(
        "Cast to {} failed for value {} at path \"{}\"",
        kind,
        value,
        path
    ))
}
