use anyhow::Result;
use tokio::signal;
use tokio_util::sync::CancellationToken;

mod property_logic;
use property_logic::{config, pipeline::Pipeline};

use clap::CommandFactory;
use lib_caf::loggers::{setup_logging, LogOptions};
use lib_caf::registry;
use lib_caf::retrieve::ClientOptions;

const COMPONENT: &str = "http_property";

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config();

    if config.json {
        println!("{}", registry::http_property_entry().to_json()?);
        return Ok(());
    }

    let plan = match config.port_plan() {
        Ok(plan) => plan,
        Err(reason) => {
            eprintln!("{}\n", reason);
            let _ = config::Config::command().print_help();
            std::process::exit(1);
        }
    };

    setup_logging(&LogOptions {
        component: COMPONENT.to_string(),
        debug: config.debug,
        log_dir: config.log_dir.clone(),
    })?;

    let shutdown = CancellationToken::new();
    let client = ClientOptions {
        verify_tls: config.verify_tls,
        ..ClientOptions::default()
    };
    let pipeline = match Pipeline::open(&plan, &client, &shutdown).await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    };

    let mut worker = tokio::spawn(pipeline.run(shutdown.clone()));

    // Wait for shutdown signal, or for the worker to give up on its own
    let finished = tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
            None
        }
        _ = async {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut term_signal) => {
                        term_signal.recv().await;
                        log::info!("SIGTERM received, initiating shutdown.");
                    }
                    Err(e) => {
                        log::error!("Failed to install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                // On non-unix platforms, just wait forever.
                std::future::pending::<()>().await;
            }
        } => None,
        joined = &mut worker => Some(joined),
    };

    shutdown.cancel();

    let joined = match finished {
        Some(joined) => joined,
        None => worker.await,
    };
    if let Err(e) = joined? {
        log::error!("{:#}", e);
        return Err(e);
    }

    log::info!("Shutdown complete.");
    Ok(())
}
