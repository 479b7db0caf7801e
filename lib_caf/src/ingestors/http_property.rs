//! # HTTP Property Poller
//!
//! Drives the run phase of the `http_property` component. Once configuration
//! intake has produced a [`RunConfig`], the node polls the configured endpoint
//! once per interval and routes the outcome of every tick:
//!
//! | Outcome                    | Log   | Error port | Other ports            |
//! |----------------------------|-------|------------|------------------------|
//! | transport failure          | error | yes        | nothing                |
//! | success                    | debug | no         | resp + body, then prop |
//! | unsupported content type   | warn  | no         | resp + body only       |
//! | extraction failure         | warn  | no         | resp + body only       |
//!
//! No tick outcome stops the loop; only the shutdown token does, and it also
//! cuts short a tick that is still waiting on the endpoint or a full port.
//!
//! ## Tick scheduling
//! Ticks are serialized: the next tick cannot start before the current one
//! finishes. If a tick overruns one or more interval boundaries, the missed
//! boundaries are skipped rather than fired back to back.

use crate::configs::RunConfig;
use crate::extract::{extract_property, ExtractError};
use crate::model::Property;
use crate::ports::OutputPorts;
use crate::retrieve::{error_chain, ClientOptions, PropertyClient, TransportError};
use bytes::Bytes;
use thiserror::Error;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Startup failures of the node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// None of the property, response or body ports is wired.
    #[error("at least one of the prop, resp or body ports must be configured")]
    NoDataOutput,

    /// The HTTP client could not be built.
    #[error("failed to build the HTTP client: {0}")]
    Client(#[from] TransportError),
}

/// What a single tick did. Returned for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A property was emitted.
    Emitted(Property),
    /// Raw outputs were written; no property port is wired.
    RawOnly,
    /// The request could not be built, sent or read.
    TransportFailed(String),
    /// The content type is not JSON; extraction was skipped.
    Unsupported(String),
    /// Body parsing, rendering or coercion failed.
    ExtractionFailed(String),
}

/// The `http_property` run phase: a reusable client plus the output ports.
pub struct HttpPropertyNode {
    client: PropertyClient,
    outputs: OutputPorts,
}

impl HttpPropertyNode {
    /// Builds the node. The HTTP client is created here, once.
    pub fn new(options: &ClientOptions, outputs: OutputPorts) -> Result<Self, NodeError> {
        if !outputs.has_data_output() {
            return Err(NodeError::NoDataOutput);
        }
        let client = PropertyClient::new(options)?;
        Ok(Self { client, outputs })
    }

    /// Ticks every `config.interval` until `shutdown` fires.
    ///
    /// The first tick happens one interval after the call.
    pub async fn run(&self, config: RunConfig, shutdown: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + config.interval, config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!("Started polling {} every {:?}", config.request.url, config.interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    log::info!("Poller shutting down...");
                    break;
                }
                _ = ticker.tick() => {
                    // An in-flight request is abandoned on shutdown.
                    tokio::select! {
                        _ = shutdown.cancelled() => {
                            log::info!("Poller shutting down, abandoning the current tick...");
                            break;
                        }
                        outcome = self.tick(&config) => log::trace!("Tick finished: {:?}", outcome),
                    }
                }
            }
        }
    }

    /// Runs a single poll-extract-emit cycle.
    pub async fn tick(&self, config: &RunConfig) -> TickOutcome {
        let timestamp = chrono::Utc::now().timestamp();
        let request = &config.request;

        // --- Phase 1: Execute the request ---
        let view = match self.client.fetch(request).await {
            Ok(view) => view,
            Err(e) => {
                let message = error_chain(&e);
                log::error!(
                    "ERROR performing HTTP {} {}: {}",
                    request.effective_method(),
                    request.url,
                    message
                );
                self.outputs.send_error(&message);
                return TickOutcome::TransportFailed(message);
            }
        };
        log::debug!("{} {} -> {}", request.effective_method(), request.url, view.status_line);

        // --- Phase 2: Raw outputs, independent of extraction ---
        if self.outputs.response.is_some() {
            match view.to_packet() {
                Ok(packet) => self.outputs.send_response(Bytes::from(packet)).await,
                Err(e) => {
                    log::error!("ERROR converting response to packet: {}", e);
                    self.outputs.send_error(&e.to_string());
                }
            }
        }
        if self.outputs.body.is_some() {
            self.outputs.send_body(Bytes::from(view.body.clone())).await;
        }

        if !self.outputs.has_property() {
            return TickOutcome::RawOnly;
        }

        // --- Phase 3: Extract, coerce and emit ---
        match extract_property(request, &config.template, &view.body, timestamp) {
            Ok(property) => match serde_json::to_vec(&property) {
                Ok(packet) => {
                    self.outputs.send_property(Bytes::from(packet)).await;
                    TickOutcome::Emitted(property)
                }
                Err(e) => {
                    log::error!("ERROR serializing property: {}", e);
                    TickOutcome::ExtractionFailed(e.to_string())
                }
            },
            Err(ExtractError::UnsupportedContentType(content_type)) => {
                log::warn!("WARNING processing of {:?} is not supported", content_type);
                TickOutcome::Unsupported(content_type)
            }
            Err(e) => {
                log::warn!("Skipping property {}: {}", config.template.id, e);
                TickOutcome::ExtractionFailed(e.to_string())
            }
        }
    }
}
