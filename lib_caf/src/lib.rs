//! # lib_caf
//!
//! Shared building blocks for the context-aware flow (CAF) components. A CAF
//! component is one node of a flow-based pipeline: it receives configuration
//! packets on input ports, does its work, and writes packets to output ports.
//!
//! Modules are gated per concern, the same way the rest of the workspace gates
//! its shared library. `model` and `registry` are always available because every
//! component speaks the property wire format.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Property envelopes, templates and request descriptors.
pub mod model;
/// Component documentation entries (`--json` output).
pub mod registry;

/// Poll interval parsing and the three-port configuration intake.
#[cfg(feature = "configs")]
pub mod configs;
/// Template rendering and typed-value coercion.
#[cfg(feature = "extract")]
pub mod extract;
/// HTTP client and response conversion.
#[cfg(feature = "retrieve")]
pub mod retrieve;
/// Output sinks and the TCP frame transport.
#[cfg(feature = "ports")]
pub mod ports;
/// Long-running component loops.
#[cfg(feature = "ingestors")]
pub mod ingestors;
/// Logging setup for the component binaries.
#[cfg(feature = "loggers")]
pub mod loggers;

pub use model::{Property, PropertyTemplate, PropertyValue, RequestDescriptor, ValueType};
