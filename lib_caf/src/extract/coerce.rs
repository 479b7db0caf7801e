use super::ExtractError;
use crate::model::{PropertyValue, ValueType};
use serde_json::{Map, Value};

/// Parses a boolean literal.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and their false counterparts
/// `0`, `f`, `F`, `FALSE`, `false`, `False`. Anything else, including
/// surrounding whitespace, is rejected.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Coerces rendered template text into a [`PropertyValue`] of `value_type`.
pub fn coerce(rendered: &str, value_type: ValueType) -> Result<PropertyValue, ExtractError> {
    match value_type {
        ValueType::Text => Ok(PropertyValue::Text(rendered.to_string())),
        ValueType::Numeric => {
            let value = rendered.parse::<f64>().map_err(|source| ExtractError::Float {
                text: rendered.to_string(),
                source,
            })?;
            // JSON has no NaN or infinity; serde_json would write `null`.
            if !value.is_finite() {
                return Err(ExtractError::NonFinite(rendered.to_string()));
            }
            Ok(PropertyValue::Numeric(value))
        }
        ValueType::Boolean => parse_bool(rendered)
            .map(PropertyValue::Boolean)
            .ok_or_else(|| ExtractError::Bool(rendered.to_string())),
        ValueType::Structured => serde_json::from_str::<Map<String, Value>>(rendered)
            .map(PropertyValue::Structured)
            .map_err(|source| ExtractError::Json {
                text: rendered.to_string(),
                source,
            }),
    }
}
