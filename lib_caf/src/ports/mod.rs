//! # Component Ports
//!
//! Packets leave and enter a component through ports. Inside the process a
//! port is a bounded `tokio::sync::mpsc` channel of [`Bytes`] frames; the
//! `tcp` module connects those channels to other components.
//!
//! Output sends never stall the component for long: data ports wait at most
//! [`SEND_TIMEOUT`] for queue space and then drop the packet, and the error
//! port never waits at all.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};

/// Length-delimited TCP transport for ports.
pub mod tcp;

pub use tcp::{bind_input, connect_output, parse_endpoint};

/// Longest a data port send may wait for queue space.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Default queue depth of a port channel.
pub const PORT_CAPACITY: usize = 64;

/// Port transport failures.
#[derive(Debug, Error)]
pub enum PortError {
    /// The endpoint string is not `tcp://host:port` or `host:port`.
    #[error("invalid endpoint {0:?}")]
    InvalidEndpoint(String),

    /// Binding an input port failed.
    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        /// Endpoint that failed.
        endpoint: String,
        /// OS error.
        #[source]
        source: std::io::Error,
    },
}

/// The output side of a polling component. Every port is optional.
#[derive(Debug, Clone, Default)]
pub struct OutputPorts {
    /// Property envelopes.
    pub property: Option<mpsc::Sender<Bytes>>,
    /// Serialized HTTP responses.
    pub response: Option<mpsc::Sender<Bytes>>,
    /// Raw response bodies.
    pub body: Option<mpsc::Sender<Bytes>>,
    /// Error text.
    pub error: Option<mpsc::Sender<Bytes>>,
}

impl OutputPorts {
    /// Whether at least one of the property, response or body ports is wired.
    pub fn has_data_output(&self) -> bool {
        self.property.is_some() || self.response.is_some() || self.body.is_some()
    }

    /// Whether the property port is wired.
    pub fn has_property(&self) -> bool {
        self.property.is_some()
    }

    /// Sends a property packet, if the port is wired.
    pub async fn send_property(&self, packet: Bytes) {
        send_data("prop", self.property.as_ref(), packet).await;
    }

    /// Sends a response packet, if the port is wired.
    pub async fn send_response(&self, packet: Bytes) {
        send_data("resp", self.response.as_ref(), packet).await;
    }

    /// Sends a body packet, if the port is wired.
    pub async fn send_body(&self, packet: Bytes) {
        send_data("body", self.body.as_ref(), packet).await;
    }

    /// Sends error text without waiting. A full or closed port drops it.
    pub fn send_error(&self, message: &str) {
        let Some(port) = self.error.as_ref() else {
            return;
        };
        match port.try_send(Bytes::copy_from_slice(message.as_bytes())) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::debug!("Error port full, dropping message"),
            Err(TrySendError::Closed(_)) => log::debug!("Error port closed, dropping message"),
        }
    }
}

async fn send_data(name: &str, port: Option<&mpsc::Sender<Bytes>>, packet: Bytes) {
    let Some(port) = port else {
        return;
    };
    match port.send_timeout(packet, SEND_TIMEOUT).await {
        Ok(()) => {}
        Err(SendTimeoutError::Timeout(_)) => log::warn!("Port {} is full, dropping packet", name),
        Err(SendTimeoutError::Closed(_)) => log::warn!("Port {} is closed, dropping packet", name),
    }
}
