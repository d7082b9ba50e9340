//! Coordinator configuration: venue registry, caps, execution, risk,
//! quote, and connection settings (§6 Configuration), layered TOML over
//! `COORDINATOR__`-prefixed environment variables via
//! [`common::load_layered`].

use capital::CapitalConfig;
use common::Venue;
use execution::ExecutionConfig;
use quote_pipeline::QuoteConfig;
use risk::RiskMode;
use scheduler::SchedulerConfig;
use serde::{Deserialize, Serialize};
use supervisor::{RetryConfig, SupervisorConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub timeout_seconds: u64,
    pub max_body_size: usize,
    /// Interval between background `Scheduler::tick` rounds.
    pub tick_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            timeout_seconds: 30,
            max_body_size: 1024 * 1024,
            tick_interval_ms: 250,
        }
    }
}

/// One venue's registration (§6 Configuration: "Venue registry").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueEntry {
    pub id: u16,
    pub name: String,
    pub initial_equity_usd: f64,
    pub trade_enabled: bool,
    /// Names of the env vars holding API credentials; never the
    /// credentials themselves.
    pub api_key_env: String,
    pub api_secret_env: String,
    pub rate_limit_capacity: f64,
    pub rate_limit_refill_per_sec: f64,
}

impl VenueEntry {
    #[must_use]
    pub fn venue(&self) -> Venue {
        Venue::new(self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub server: ServerConfig,
    pub venues: Vec<VenueEntry>,
    pub caps: CapitalConfig,
    pub scheduler: SchedulerConfig,
    pub execution: ExecutionConfig,
    pub risk_mode: RiskMode,
    pub quote: QuoteConfig,
    pub connection: SupervisorConfig,
    pub retry: RetryConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            venues: Vec::new(),
            caps: CapitalConfig::default(),
            scheduler: SchedulerConfig::default(),
            execution: ExecutionConfig::default(),
            risk_mode: RiskMode::default(),
            quote: QuoteConfig::default(),
            connection: SupervisorConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Loads from an optional TOML file overridden by `COORDINATOR__`
    /// environment variables (e.g. `COORDINATOR__SERVER__PORT=9000`).
    /// Missing file or fields fall back to component defaults rather than
    /// refusing to start.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        common::load_layered(path, "COORDINATOR")
    }

    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_venues_and_balanced_risk_mode() {
        let cfg = CoordinatorConfig::default();
        assert!(cfg.venues.is_empty());
        assert_eq!(cfg.risk_mode, RiskMode::Balanced);
    }

    #[test]
    fn server_address_combines_host_and_port() {
        let cfg = CoordinatorConfig::default();
        assert_eq!(cfg.server_address(), "127.0.0.1:8080");
    }

    #[test]
    fn load_with_missing_file_and_no_env_falls_back_to_defaults() {
        let cfg = CoordinatorConfig::load(Some("/nonexistent/coordinator.toml")).unwrap();
        assert_eq!(cfg.server.port, 8080);
    }
}
