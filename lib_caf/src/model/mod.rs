//! # Property Data Model
//!
//! The wire types shared by every `*-property` component:
//!
//! - **`property`**: the [`PropertyTemplate`] that configures a component and the
//!   [`Property`] envelope it emits.
//! - **`request`**: the [`RequestDescriptor`] consumed by HTTP-driven components.
//!
//! Field names on the wire are short and stable (`n`, `t`, `v`, ...) because
//! downstream context engines already consume them.

/// Property templates, typed values and the emitted envelope.
pub mod property;
/// The HTTP request descriptor packet.
pub mod request;

use serde::Deserialize;

/// Reads a JSON `null` the same as an omitted field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub use property::{Property, PropertyTemplate, PropertyValue, ValueType};
pub use request::RequestDescriptor;
