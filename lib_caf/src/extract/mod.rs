//! # Property Extraction
//!
//! Turns a response body into a [`Property`]:
//!
//! 1. the body is parsed as a generic JSON document (the only supported format),
//! 2. the template is rendered with that document bound as its input,
//! 3. the rendered text is coerced into the template's [`ValueType`](crate::ValueType).
//!
//! Any failure abandons the property for this tick. None of them are fatal.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use crate::model::{Property, PropertyTemplate, RequestDescriptor};
use thiserror::Error;

/// Typed-value coercion of rendered text.
pub mod coerce;
/// Template rendering over parsed documents.
pub mod template;

pub use coerce::{coerce, parse_bool};
pub use template::render;

/// Reasons an extraction produced no property.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The request's content type is not a JSON flavour.
    #[error("processing of {0:?} is not supported")]
    UnsupportedContentType(String),

    /// The response body is not valid JSON.
    #[error("failed to unmarshal the JSON response: {0}")]
    Body(#[source] serde_json::Error),

    /// The template failed to compile or to render.
    #[error("failed to render the template: {0}")]
    Template(#[from] minijinja::Error),

    /// The rendered text is not a float.
    #[error("failed to parse float from {text:?}: {source}")]
    Float {
        /// Rendered text.
        text: String,
        /// Parse error.
        #[source]
        source: std::num::ParseFloatError,
    },

    /// The rendered text parsed to NaN or an infinity, which the envelope
    /// cannot carry.
    #[error("refusing non-finite float {0:?}")]
    NonFinite(String),

    /// The rendered text is not a boolean literal.
    #[error("failed to parse bool from {0:?}")]
    Bool(String),

    /// The rendered text is not a JSON object.
    #[error("failed to parse JSON object from {text:?}: {source}")]
    Json {
        /// Rendered text.
        text: String,
        /// Parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Extracts the templated property from `body`.
///
/// `timestamp` is the Unix second at which the tick started; it is stamped on
/// the envelope as-is.
pub fn extract_property(
    request: &RequestDescriptor,
    template: &PropertyTemplate,
    body: &[u8],
    timestamp: i64,
) -> Result<Property, ExtractError> {
    if !request.is_json() {
        return Err(ExtractError::UnsupportedContentType(request.content_type.clone()));
    }

    let data: serde_json::Value = serde_json::from_slice(body).map_err(ExtractError::Body)?;
    let rendered = render(&template.template, &data)?;
    let value = coerce(&rendered, template.value_type)?;

    Ok(Property::from_template(template, timestamp, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PropertyValue, ValueType};

    fn request(content_type: &str) -> RequestDescriptor {
        RequestDescriptor {
            url: "http://localhost".into(),
            content_type: content_type.into(),
            ..Default::default()
        }
    }

    fn template(value_type: ValueType, source: &str) -> PropertyTemplate {
        PropertyTemplate {
            id: "id".into(),
            name: "name".into(),
            value_type,
            group: "group".into(),
            template: source.into(),
        }
    }

    #[test]
    fn extracts_numeric_value() {
        let property = extract_property(
            &request("application/json"),
            &template(ValueType::Numeric, "{{.value}}"),
            br#"{"value": 42.5}"#,
            1234,
        )
        .unwrap();
        assert_eq!(property.value, PropertyValue::Numeric(42.5));
        assert_eq!(property.timestamp, 1234);
        assert_eq!(property.id, "id");
    }

    #[test]
    fn structured_value_matches_independent_parse() {
        let body = br#"{"sensor": {"t": 21.5, "tags": ["a", "b"], "ok": true}}"#;
        let property = extract_property(
            &request("application/json"),
            &template(ValueType::Structured, "{{ .sensor | tojson }}"),
            body,
            0,
        )
        .unwrap();

        let document: serde_json::Value = serde_json::from_slice(body).unwrap();
        let expected = document["sensor"].as_object().unwrap().clone();
        assert_eq!(property.value, PropertyValue::Structured(expected));
    }

    #[test]
    fn non_json_content_type_is_unsupported() {
        let err = extract_property(
            &request("text/plain"),
            &template(ValueType::Text, "{{.}}"),
            b"hello",
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedContentType(ct) if ct == "text/plain"));
    }

    #[test]
    fn invalid_body_is_reported() {
        let err = extract_property(
            &request("application/json"),
            &template(ValueType::Text, "{{.}}"),
            b"<html>",
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::Body(_)));
    }

    #[test]
    fn missing_field_fails_numeric_coercion() {
        let err = extract_property(
            &request("application/json"),
            &template(ValueType::Numeric, "{{.missing}}"),
            br#"{"value": 1}"#,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::Float { ref text, .. } if text.is_empty()));
    }
}
