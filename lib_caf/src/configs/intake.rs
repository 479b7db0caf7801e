//! # Configuration Intake
//!
//! Waits on the interval, request and template ports at the same time and
//! returns as soon as all three have delivered a valid value. Until then a
//! newer packet on a port replaces the older one, and malformed packets are
//! logged and dropped without touching the slot they were meant for.
//!
//! The result is a [`RunConfig`] that the poll loop takes by value, so nothing
//! after intake can observe or race with a configuration change.

use super::{interval::parse_interval, ConfigError};
use crate::model::{PropertyTemplate, RequestDescriptor};
use bytes::Bytes;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Everything the poll loop needs, fixed for the lifetime of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Time between two ticks. Always greater than zero.
    pub interval: Duration,
    /// The request issued on every tick.
    pub request: RequestDescriptor,
    /// Extraction template for the property port.
    pub template: PropertyTemplate,
}

#[derive(Default)]
struct Slots {
    interval: Option<Duration>,
    request: Option<RequestDescriptor>,
    template: Option<PropertyTemplate>,
}

impl Slots {
    fn take_complete(&mut self) -> Option<RunConfig> {
        if self.interval.is_none() || self.request.is_none() || self.template.is_none() {
            return None;
        }
        Some(RunConfig {
            interval: self.interval.take()?,
            request: self.request.take()?,
            template: self.template.take()?,
        })
    }
}

/// The receiving ends of the three configuration ports.
pub struct ConfigIntake {
    interval_rx: mpsc::Receiver<Bytes>,
    request_rx: mpsc::Receiver<Bytes>,
    template_rx: mpsc::Receiver<Bytes>,
}

impl ConfigIntake {
    /// Takes ownership of the three configuration ports.
    pub fn new(
        interval_rx: mpsc::Receiver<Bytes>,
        request_rx: mpsc::Receiver<Bytes>,
        template_rx: mpsc::Receiver<Bytes>,
    ) -> Self {
        Self {
            interval_rx,
            request_rx,
            template_rx,
        }
    }

    /// Collects configuration until all three slots are filled.
    ///
    /// Blocks for as long as it takes. Returns early only on `shutdown`, or
    /// when a port closes while its slot is still empty, because the
    /// component could then never be configured.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<RunConfig, ConfigError> {
        let mut slots = Slots::default();
        let mut interval_open = true;
        let mut request_open = true;
        let mut template_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return Err(ConfigError::Shutdown),
                packet = self.interval_rx.recv(), if interval_open => match packet {
                    Some(payload) => match parse_interval(&payload) {
                        Ok(interval) => {
                            log::info!("Interval specified: {:?}", interval);
                            slots.interval = Some(interval);
                        }
                        Err(e) => log::error!("Invalid interval packet: {}", e),
                    },
                    None => interval_open = false,
                },
                packet = self.request_rx.recv(), if request_open => match packet {
                    Some(payload) => match serde_json::from_slice::<RequestDescriptor>(&payload) {
                        Ok(request) => {
                            log::info!("Request specified: {} {}", request.effective_method(), request.url);
                            slots.request = Some(request);
                        }
                        Err(source) => log::error!("{}", ConfigError::Json { what: "request", source }),
                    },
                    None => request_open = false,
                },
                packet = self.template_rx.recv(), if template_open => match packet {
                    Some(payload) => match serde_json::from_slice::<PropertyTemplate>(&payload) {
                        Ok(template) => {
                            log::info!("Template specified: {} ({})", template.id, template.value_type);
                            slots.template = Some(template);
                        }
                        Err(source) => log::error!("{}", ConfigError::Json { what: "template", source }),
                    },
                    None => template_open = false,
                },
            }

            if let Some(config) = slots.take_complete() {
                log::info!("Component configured. Moving on...");
                return Ok(config);
            }

            if !interval_open && slots.interval.is_none() {
                return Err(ConfigError::IntakeClosed("interval"));
            }
            if !request_open && slots.request.is_none() {
                return Err(ConfigError::IntakeClosed("request"));
            }
            if !template_open && slots.template.is_none() {
                return Err(ConfigError::IntakeClosed("template"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValueType;

    const REQUEST: &str = r#"{"url": "http://localhost/a", "method": "GET", "content-type": "application/json"}"#;
    const TEMPLATE: &str = r#"{"id": "p", "name": "n", "group": "g", "type": "float", "template": "{{.value}}"}"#;

    struct Ports {
        interval: mpsc::Sender<Bytes>,
        request: mpsc::Sender<Bytes>,
        template: mpsc::Sender<Bytes>,
    }

    fn intake() -> (Ports, ConfigIntake) {
        let (interval, interval_rx) = mpsc::channel(8);
        let (request, request_rx) = mpsc::channel(8);
        let (template, template_rx) = mpsc::channel(8);
        (
            Ports { interval, request, template },
            ConfigIntake::new(interval_rx, request_rx, template_rx),
        )
    }

    async fn send(tx: &mpsc::Sender<Bytes>, payload: &str) {
        tx.send(Bytes::from(payload.to_string())).await.unwrap();
    }

    #[tokio::test]
    async fn completes_in_every_arrival_order() {
        let orders: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in orders {
            let (ports, intake) = intake();
            for index in order {
                match index {
                    0 => send(&ports.interval, "50ms").await,
                    1 => send(&ports.request, REQUEST).await,
                    _ => send(&ports.template, TEMPLATE).await,
                }
            }
            let config = intake.run(CancellationToken::new()).await.unwrap();
            assert_eq!(config.interval, Duration::from_millis(50));
            assert_eq!(config.request.url, "http://localhost/a");
            assert_eq!(config.template.value_type, ValueType::Numeric);
        }
    }

    #[tokio::test]
    async fn waits_until_last_slot_arrives() {
        let (ports, intake) = intake();
        send(&ports.interval, "1s").await;
        send(&ports.request, REQUEST).await;

        let handle = tokio::spawn(intake.run(CancellationToken::new()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        send(&ports.template, TEMPLATE).await;
        let config = tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap().unwrap();
        assert_eq!(config.template.id, "p");
    }

    #[tokio::test]
    async fn malformed_packets_leave_slots_empty() {
        let (ports, intake) = intake();
        send(&ports.interval, "soon").await;
        send(&ports.interval, "0s").await;
        send(&ports.request, "{not json").await;
        send(&ports.template, r#"{"type": "xml"}"#).await;

        let handle = tokio::spawn(intake.run(CancellationToken::new()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        send(&ports.interval, "2s").await;
        send(&ports.request, REQUEST).await;
        send(&ports.template, TEMPLATE).await;
        let config = tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap().unwrap();
        assert_eq!(config.interval, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn later_packets_overwrite_earlier_ones() {
        let (ports, intake) = intake();
        send(&ports.interval, "1s").await;
        send(&ports.interval, "3s").await;
        send(&ports.request, REQUEST).await;

        let handle = tokio::spawn(intake.run(CancellationToken::new()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        send(&ports.template, TEMPLATE).await;

        let config = tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap().unwrap();
        assert_eq!(config.interval, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn closed_port_with_empty_slot_fails() {
        let (ports, intake) = intake();
        send(&ports.interval, "1s").await;
        send(&ports.request, REQUEST).await;
        drop(ports.template);

        let err = intake.run(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ConfigError::IntakeClosed("template")));
    }

    #[tokio::test]
    async fn closed_port_after_delivery_is_fine() {
        let (ports, intake) = intake();
        send(&ports.interval, "1s").await;
        drop(ports.interval);

        let handle = tokio::spawn(intake.run(CancellationToken::new()));
        send(&ports.request, REQUEST).await;
        send(&ports.template, TEMPLATE).await;
        let config = tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap().unwrap();
        assert_eq!(config.interval, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn shutdown_interrupts_intake() {
        let (_ports, intake) = intake();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(intake.run(shutdown.clone()));
        shutdown.cancel();
        let err = tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap().unwrap_err();
        assert!(matches!(err, ConfigError::Shutdown));
    }
}
