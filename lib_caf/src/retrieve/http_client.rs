//! # HTTP Client
//!
//! One [`PropertyClient`] is built when a component starts and reused for
//! every tick, so connections are pooled across polls and released when the
//! component is dropped.
//!
//! TLS peer verification is **off** by default. Polled endpoints commonly sit
//! behind private or self-signed certificate authorities; operators who poll
//! public endpoints should turn verification on with
//! [`ClientOptions::verify_tls`].

use super::{ResponseView, TransportError};
use crate::model::RequestDescriptor;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use std::time::Duration;

/// Client-side timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Construction options for [`PropertyClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Verify the server certificate chain and host name.
    pub verify_tls: bool,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            verify_tls: false,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

/// A pooled HTTP client that executes [`RequestDescriptor`]s.
pub struct PropertyClient {
    inner: reqwest::Client,
}

impl PropertyClient {
    /// Builds the underlying `reqwest` client.
    pub fn new(options: &ClientOptions) -> Result<Self, TransportError> {
        if !options.verify_tls {
            log::warn!("TLS certificate verification is disabled for polled endpoints");
        }
        let inner = reqwest::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()?;
        Ok(Self { inner })
    }

    /// Builds the outgoing request for `descriptor`.
    ///
    /// The `Content-Type` header is set when the descriptor names one, and
    /// every configured header value is appended in order.
    pub fn build_request(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Request, TransportError> {
        let method_name = descriptor.effective_method();
        let method = Method::from_bytes(method_name.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(method_name.to_string()))?;
        let url = Url::parse(&descriptor.url).map_err(|source| TransportError::InvalidUrl {
            url: descriptor.url.clone(),
            source,
        })?;

        let mut builder = self.inner.request(method, url);
        if !descriptor.content_type.is_empty() {
            builder = builder.header(CONTENT_TYPE, descriptor.content_type.as_str());
        }
        for (name, values) in &descriptor.headers {
            for value in values {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        Ok(builder.build()?)
    }

    /// Executes `descriptor` and reads the whole response.
    pub async fn fetch(&self, descriptor: &RequestDescriptor) -> Result<ResponseView, TransportError> {
        let request = self.build_request(descriptor)?;
        let response = self.inner.execute(request).await?;
        ResponseView::read(response).await
    }
}
