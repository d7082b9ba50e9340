//! Coordinator: the opportunity-to-fill control plane wiring C1-C7 into
//! one process (§1 Overview). Exposes an HTTP surface for operator
//! visibility and control (§6) over a background loop that scores,
//! risk-checks, schedules, and executes jobs.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;
pub mod state;

pub use config::CoordinatorConfig;
pub use error::StartupError;
pub use server::CoordinatorServer;
pub use state::AppState;

/// Builds [`AppState`] from `config` and serves the coordinator's HTTP
/// surface and tick loop until the process is terminated.
pub async fn start_server(config: CoordinatorConfig) -> Result<(), StartupError> {
    let state = AppState::new(config).map_err(StartupError::Config)?;
    let server = CoordinatorServer::new(state)?;
    server.start().await
}
