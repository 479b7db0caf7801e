//! # Ingestors Module
//!
//! Long-running component loops that pull data from outside the flow and push
//! packets into it.
//!
//! ## Contained Modules:
//! - **`http_property`**: the ticking HTTP poller that extracts a typed
//!   property from every response.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// The periodic HTTP property poller.
pub mod http_property;

pub use http_property::{HttpPropertyNode, NodeError, TickOutcome};
