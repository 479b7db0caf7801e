//! # Data Retrieval Module
//!
//! HTTP plumbing for polling components.
//!
//! ## Contained Modules:
//!
//! - **`http_client`**: a `reqwest` client built once per component, with a
//!   fixed request timeout and optional TLS peer verification. It turns a
//!   [`RequestDescriptor`](crate::RequestDescriptor) into a request and runs it.
//! - **`response`**: [`ResponseView`], the tick-scoped copy of a response that
//!   is written to the response and body ports.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use thiserror::Error;

/// Reusable HTTP client for polling components.
pub mod http_client;
/// Tick-scoped response snapshot.
pub mod response;

pub use http_client::{ClientOptions, PropertyClient, REQUEST_TIMEOUT};
pub use response::ResponseView;

/// Failures between building a request and holding its full response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The descriptor's method is not a valid HTTP token.
    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    /// The descriptor's URL does not parse as an absolute URL.
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parse error.
        #[source]
        source: url::ParseError,
    },

    /// Client construction, request building, sending or body reading failed.
    #[error("{}", error_chain(.0))]
    Http(#[from] reqwest::Error),

    /// The response snapshot could not be serialized.
    #[error("failed to serialize the response: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Flattens an error and its sources into one line.
///
/// `reqwest` keeps the interesting part (connection refused, timed out,
/// certificate rejected) in the source chain rather than in its own message.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
