use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[clap(name = "http_property", about = "Polls an HTTP endpoint and extracts a typed property from every response", version)]
pub struct Config {
    #[clap(long = "port-int", env = "HTTP_PROPERTY_PORT_INT", help = "Input port endpoint for the polling interval.")]
    pub port_int: Option<String>,

    #[clap(long = "port-req", env = "HTTP_PROPERTY_PORT_REQ", help = "Input port endpoint for the request descriptor.")]
    pub port_req: Option<String>,

    #[clap(long = "port-tmpl", env = "HTTP_PROPERTY_PORT_TMPL", help = "Input port endpoint for the property template.")]
    pub port_tmpl: Option<String>,

    #[clap(long = "port-prop", env = "HTTP_PROPERTY_PORT_PROP", help = "Output port endpoint for extracted properties.")]
    pub port_prop: Option<String>,

    #[clap(long = "port-resp", env = "HTTP_PROPERTY_PORT_RESP", help = "Output port endpoint for serialized HTTP responses.")]
    pub port_resp: Option<String>,

    #[clap(long = "port-body", env = "HTTP_PROPERTY_PORT_BODY", help = "Output port endpoint for raw response bodies.")]
    pub port_body: Option<String>,

    #[clap(long = "port-err", env = "HTTP_PROPERTY_PORT_ERR", help = "Output port endpoint for error messages.")]
    pub port_err: Option<String>,

    #[clap(long, help = "Print component documentation in JSON and exit.")]
    pub json: bool,

    #[clap(long, env = "HTTP_PROPERTY_DEBUG", help = "Enable debug logging to stdout.")]
    pub debug: bool,

    #[clap(long, env = "HTTP_PROPERTY_VERIFY_TLS", help = "Verify TLS certificates of polled endpoints.")]
    pub verify_tls: bool,

    #[clap(long, env = "HTTP_PROPERTY_LOG_DIR", help = "Also write logs to a file in this directory.")]
    pub log_dir: Option<PathBuf>,
}

/// Validated port wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortPlan {
    pub interval: String,
    pub request: String,
    pub template: String,
    pub property: Option<String>,
    pub response: Option<String>,
    pub body: Option<String>,
    pub error: Option<String>,
}

impl Config {
    /// Checks the required ports. Empty strings count as missing.
    pub fn port_plan(&self) -> Result<PortPlan, String> {
        let given = |port: &Option<String>| port.clone().filter(|p| !p.trim().is_empty());

        let interval = given(&self.port_int).ok_or("--port-int is required")?;
        let request = given(&self.port_req).ok_or("--port-req is required")?;
        let template = given(&self.port_tmpl).ok_or("--port-tmpl is required")?;

        let plan = PortPlan {
            interval,
            request,
            template,
            property: given(&self.port_prop),
            response: given(&self.port_resp),
            body: given(&self.port_body),
            error: given(&self.port_err),
        };
        if plan.property.is_none() && plan.response.is_none() && plan.body.is_none() {
            return Err("at least one of --port-prop, --port-resp or --port-body is required".to_string());
        }
        Ok(plan)
    }
}

pub fn load_config() -> Config {
    Config::parse()
}
