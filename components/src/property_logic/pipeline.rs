use anyhow::{Context, Result};
use lib_caf::configs::{ConfigError, ConfigIntake};
use lib_caf::ingestors::HttpPropertyNode;
use lib_caf::ports::{bind_input, connect_output, OutputPorts, PORT_CAPACITY};
use lib_caf::retrieve::ClientOptions;
use tokio_util::sync::CancellationToken;

use super::config::PortPlan;

/// Everything the worker task needs, wired and ready.
pub struct Pipeline {
    intake: ConfigIntake,
    node: HttpPropertyNode,
}

impl Pipeline {
    /// Binds the input ports and connects the output ports.
    pub async fn open(plan: &PortPlan, client: &ClientOptions, shutdown: &CancellationToken) -> Result<Self> {
        // --- Phase 1: Inputs ---
        let (interval_rx, addr) = bind_input(&plan.interval, PORT_CAPACITY, shutdown.clone())
            .await
            .context("Failed to open interval port")?;
        log::debug!("Interval port on {}", addr);
        let (request_rx, addr) = bind_input(&plan.request, PORT_CAPACITY, shutdown.clone())
            .await
            .context("Failed to open request port")?;
        log::debug!("Request port on {}", addr);
        let (template_rx, addr) = bind_input(&plan.template, PORT_CAPACITY, shutdown.clone())
            .await
            .context("Failed to open template port")?;
        log::debug!("Template port on {}", addr);

        // --- Phase 2: Outputs ---
        let connect = |endpoint: &Option<String>| -> Result<_> {
            endpoint
                .as_deref()
                .map(|e| connect_output(e, PORT_CAPACITY, shutdown.clone()))
                .transpose()
                .with_context(|| format!("Failed to open output port {:?}", endpoint))
        };
        let outputs = OutputPorts {
            property: connect(&plan.property)?,
            response: connect(&plan.response)?,
            body: connect(&plan.body)?,
            error: connect(&plan.error)?,
        };

        let node = HttpPropertyNode::new(client, outputs)?;
        Ok(Self {
            intake: ConfigIntake::new(interval_rx, request_rx, template_rx),
            node,
        })
    }

    /// Waits for configuration, then polls until `shutdown`.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        log::info!("Waiting for configuration");
        let config = match self.intake.run(shutdown.clone()).await {
            Ok(config) => config,
            Err(ConfigError::Shutdown) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        log::info!(
            "Polling {} every {:?} for property {}",
            config.request.url,
            config.interval,
            config.template.id
        );
        self.node.run(config, shutdown).await;
        Ok(())
    }
}
