//! Coordinator server: axum router over [`AppState`] plus the
//! background tick loop that drives the scheduler (§5, §6).

use crate::error::StartupError;
use crate::handlers::{control, health, metrics, status};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct CoordinatorServer {
    state: AppState,
    addr: SocketAddr,
    tick_interval: Duration,
}

impl CoordinatorServer {
    pub fn new(state: AppState) -> Result<Self, StartupError> {
        let addr: SocketAddr = state
            .config
            .server_address()
            .parse()
            .map_err(|e: std::net::AddrParseError| StartupError::Bind(state.config.server_address(), std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
        let tick_interval = Duration::from_millis(state.config.server.tick_interval_ms);
        Ok(Self { state, addr, tick_interval })
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health::health_check))
            .route("/state", get(status::get_state))
            .route("/metrics", get(metrics::render_metrics))
            .route("/control/kill", post(control::kill))
            .route("/control/resume", post(control::resume))
            .route("/control/mode", post(control::set_mode))
            .route("/control/override", post(control::set_override))
            .with_state(self.state.clone())
            .layer(DefaultBodyLimit::max(self.state.config.server.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(self.state.config.server.timeout_seconds)))
            .layer(TraceLayer::new_for_http())
    }

    /// Spawns the background tick task and serves the HTTP surface until
    /// the listener is shut down.
    pub async fn start(self) -> Result<(), StartupError> {
        let app = self.router();

        let tick_state = self.state.clone();
        let mut ticker = tokio::time::interval(self.tick_interval);
        tokio::spawn(async move {
            loop {
                ticker.tick().await;
                tick_state.run_tick().await;
            }
        });

        info!(addr = %self.addr, "binding coordinator HTTP surface");
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| StartupError::Bind(self.addr.to_string(), e))?;

        info!(addr = %self.addr, "coordinator listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| StartupError::Bind(self.addr.to_string(), std::io::Error::new(std::io::ErrorKind::Other, e)))?;

        Ok(())
    }
}

/// Operator-facing route listing, printed with `--routes`.
pub fn print_routes() {
    println!("Coordinator routes:");
    println!("  GET  /health           - per-venue connection health");
    println!("  GET  /state            - global and per-venue state");
    println!("  GET  /metrics          - Prometheus metrics");
    println!("  POST /control/kill     - engage kill switch (?scope=global|venue:<id>)");
    println!("  POST /control/resume   - clear kill switch (?scope=global|venue:<id>)");
    println!("  POST /control/mode     - set risk mode");
    println!("  POST /control/override - toggle manual risk override");
}
