//! service-pilot
//!
//! Keeps a round-robin cache of service endpoints fetched from Consul.
//!
//! ```text
//!     containerpilot.json ──▶ config ──▶ bootstrap ──▶ registry ◀── select()
//!                                            ▲             ▲
//!     Consul catalog ◀───── lookup ──────────┴── reload ───┘
//!                                                   ▲
//!                                  SIGHUP / refresh interval
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use service_pilot::config::loader::{load_config, resolve_config_path};
use service_pilot::config::ObservabilityConfig;
use service_pilot::lifecycle::{self, signals::wait_for_shutdown_signal};
use service_pilot::observability::logging::init_logging;
use service_pilot::ServicePilot;

#[derive(Parser)]
#[command(name = "service-pilot")]
#[command(version)]
#[command(about = "Round-robin service discovery cache backed by Consul")]
struct Cli {
    /// Path to config file (defaults to $CONTAINERPILOT)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a service and print the endpoints round-robin would hand out
    Resolve {
        /// Service name
        service: String,

        /// Number of selections to print
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Keep the registry fresh until interrupted
    Run,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match resolve_config_path(cli.config.as_deref()).and_then(|p| load_config(&p)) {
        Ok(config) => config,
        Err(e) => {
            let _ = init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    let mut observability = config.observability.clone();
    if let Some(level) = cli.log_level {
        observability.log_level = level;
    }
    if let Err(e) = init_logging(&observability) {
        eprintln!("failed to initialize logging: {}", e);
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        services = config.backends.len(),
        "service-pilot starting"
    );

    match cli.command {
        Commands::Resolve { service, count } => {
            let pilot = ServicePilot::bootstrap(&config).await?;
            for _ in 0..count {
                println!("{}", pilot.select(&service)?);
            }
        }
        Commands::Run => {
            let running = lifecycle::start(&config).await?;
            for service in running.pilot.services() {
                match running.pilot.endpoints(&service) {
                    Ok(endpoints) => tracing::info!(service = %service, endpoints = ?endpoints, "Tracking service"),
                    Err(e) => tracing::warn!(service = %service, error = %e, "Service not tracked"),
                }
            }

            wait_for_shutdown_signal().await?;
            running.shutdown().await;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
