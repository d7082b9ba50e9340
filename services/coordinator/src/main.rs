//! Coordinator - Main Entry Point

use clap::{Arg, Command};
use coordinator::{start_server, CoordinatorConfig};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coordinator=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let matches = Command::new("coordinator")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Opportunity-to-fill control plane for multi-exchange perpetual futures")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("coordinator.toml"),
        )
        .arg(
            Arg::new("routes")
                .long("routes")
                .help("Print available routes and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("routes") {
        coordinator::server::print_routes();
        return;
    }

    let default_config = "coordinator.toml".to_string();
    let config_path = matches.get_one::<String>("config").unwrap_or(&default_config);

    let config = match CoordinatorConfig::load(Some(config_path)) {
        Ok(config) => {
            info!(path = %config_path, "loaded configuration");
            config
        }
        Err(e) => {
            error!(path = %config_path, error = %e, "failed to load config, exiting");
            std::process::exit(1);
        }
    };

    info!(version = env!("CARGO_PKG_VERSION"), "starting coordinator");
    info!(addr = %config.server_address(), "server will bind to");
    info!(venues = config.venues.len(), "venue registry loaded");
    info!(risk_mode = ?config.risk_mode, "risk mode");

    if let Err(e) = start_server(config).await {
        error!(error = %e, exit_code = e.exit_code(), "coordinator exiting");
        std::process::exit(e.exit_code());
    }
}
