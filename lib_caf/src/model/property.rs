//! # Properties
//!
//! A [`Property`] is a single timestamped, typed observation (a temperature, a
//! flag, a label, a small JSON document) produced by a component from a
//! [`PropertyTemplate`]. Exactly one value variant is ever populated, which the
//! type system enforces through [`PropertyValue`]. On the wire the envelope
//! keeps the flat shape existing consumers expect: one of `v`, `bv`, `sv` or `jv`
//! is present and the other three are absent.

use super::null_as_default;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// # Value Type
///
/// The coercion target named by a template's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// A 64-bit float (`"float"`).
    #[serde(rename = "float")]
    Numeric,
    /// A boolean literal (`"bool"`).
    #[serde(rename = "bool")]
    Boolean,
    /// Verbatim text (`"string"`).
    #[serde(rename = "string")]
    Text,
    /// A JSON object (`"json"`).
    #[serde(rename = "json")]
    Structured,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Numeric => "float",
            ValueType::Boolean => "bool",
            ValueType::Text => "string",
            ValueType::Structured => "json",
        };
        f.write_str(name)
    }
}

/// # Property Template
///
/// Configures a `*-property` component: which property to produce and how to
/// pull its value out of a parsed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTemplate {
    /// Property identifier copied into every envelope.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Human readable property name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// The coercion target for the rendered text.
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Property group copied into every envelope.
    #[serde(default, deserialize_with = "null_as_default")]
    pub group: String,
    /// Template source evaluated against the parsed document.
    #[serde(default, deserialize_with = "null_as_default")]
    pub template: String,
}

/// A coerced property value. One variant per [`ValueType`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Wire key `v`.
    Numeric(f64),
    /// Wire key `bv`.
    Boolean(bool),
    /// Wire key `sv`.
    Text(String),
    /// Wire key `jv`.
    Structured(Map<String, Value>),
}

impl PropertyValue {
    /// The [`ValueType`] this value satisfies.
    pub fn value_type(&self) -> ValueType {
        match self {
            PropertyValue::Numeric(_) => ValueType::Numeric,
            PropertyValue::Boolean(_) => ValueType::Boolean,
            PropertyValue::Text(_) => ValueType::Text,
            PropertyValue::Structured(_) => ValueType::Structured,
        }
    }
}

/// # Property Envelope
///
/// Built once per successful tick and handed to the property port. It is never
/// mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "PropertyWire", try_from = "PropertyWire")]
pub struct Property {
    /// Copied from the template.
    pub id: String,
    /// Copied from the template.
    pub name: String,
    /// Copied from the template.
    pub group: String,
    /// Unix seconds at which the tick started.
    pub timestamp: i64,
    /// The coerced value.
    pub value: PropertyValue,
}

impl Property {
    /// Wraps `value` in an envelope labelled by `template`.
    pub fn from_template(template: &PropertyTemplate, timestamp: i64, value: PropertyValue) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            group: template.group.clone(),
            timestamp,
            value,
        }
    }
}

/// Flat on-wire shape of [`Property`].
#[derive(Serialize, Deserialize)]
struct PropertyWire {
    id: String,
    group: String,
    #[serde(rename = "n")]
    name: String,
    #[serde(rename = "t", skip_serializing_if = "Option::is_none", default)]
    timestamp: Option<i64>,
    #[serde(rename = "v", skip_serializing_if = "Option::is_none", default)]
    value: Option<f64>,
    #[serde(rename = "bv", skip_serializing_if = "Option::is_none", default)]
    bool_value: Option<bool>,
    #[serde(rename = "sv", skip_serializing_if = "Option::is_none", default)]
    string_value: Option<String>,
    #[serde(rename = "jv", skip_serializing_if = "Option::is_none", default)]
    json_value: Option<Map<String, Value>>,
}

impl From<Property> for PropertyWire {
    fn from(property: Property) -> Self {
        let mut wire = PropertyWire {
            id: property.id,
            group: property.group,
            name: property.name,
            timestamp: Some(property.timestamp),
            value: None,
            bool_value: None,
            string_value: None,
            json_value: None,
        };
        match property.value {
            PropertyValue::Numeric(v) => wire.value = Some(v),
            PropertyValue::Boolean(v) => wire.bool_value = Some(v),
            PropertyValue::Text(v) => wire.string_value = Some(v),
            PropertyValue::Structured(v) => wire.json_value = Some(v),
        }
        wire
    }
}

impl TryFrom<PropertyWire> for Property {
    type Error = String;

    fn try_from(wire: PropertyWire) -> Result<Self, Self::Error> {
        let value = match (wire.value, wire.bool_value, wire.string_value, wire.json_value) {
            (Some(v), None, None, None) => PropertyValue::Numeric(v),
            (None, Some(v), None, None) => PropertyValue::Boolean(v),
            (None, None, Some(v), None) => PropertyValue::Text(v),
            (None, None, None, Some(v)) => PropertyValue::Structured(v),
            _ => return Err("property must carry exactly one of v, bv, sv, jv".to_string()),
        };
        Ok(Property {
            id: wire.id,
            name: wire.name,
            group: wire.group,
            timestamp: wire.timestamp.unwrap_or_default(),
            value,
        })
    }
}
