//! Wire types for the operator HTTP surface (§6). Kept separate from the
//! internal domain types so the JSON shape doesn't drift with internal
//! refactors.

use risk::RiskMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ConnectionHealthView {
    pub venue: String,
    pub role: String,
    pub state: String,
    pub error_streak: u32,
    pub last_heartbeat_ms: u64,
    pub health_score: u8,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub connections: Vec<ConnectionHealthView>,
}

#[derive(Debug, Serialize)]
pub struct VenueStateView {
    pub venue: String,
    pub equity_usd: f64,
    pub realized_pnl_today_usd: f64,
    pub volume_today_usd: f64,
    pub fees_today_usd: f64,
    pub utilization_pct: f64,
    pub safe_mode: bool,
    pub venue_kill_switch: bool,
}

#[derive(Debug, Serialize)]
pub struct JobCountersView {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub rejected: u64,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub risk_mode: RiskMode,
    pub global_kill_switch: bool,
    pub auto_halt: bool,
    pub consecutive_failures: u32,
    pub pending: usize,
    pub running: usize,
    pub terminal_recorded: usize,
    pub counters: JobCountersView,
    pub venues: Vec<VenueStateView>,
    pub uptime_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    pub mode: RiskMode,
}

#[derive(Debug, Deserialize)]
pub struct SetOverrideRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct ControlScopeQuery {
    pub scope: String,
}

#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub ok: bool,
    pub detail: String,
}

/// Parsed `scope` query parameter for `/control/kill` and
/// `/control/resume`: either `global` or `venue:<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlScope {
    Global,
    Venue(u16),
}

impl ControlScope {
    pub fn parse(raw: &str) -> Result<Self, String> {
        if raw == "global" {
            return Ok(Self::Global);
        }
        if let Some(id) = raw.strip_prefix("venue:") {
            return id
                .parse::<u16>()
                .map(Self::Venue)
                .map_err(|_| format!("invalid venue id in scope '{raw}'"));
        }
        Err(format!("unrecognized scope '{raw}', expected 'global' or 'venue:<id>'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_scope() {
        assert_eq!(ControlScope::parse("global"), Ok(ControlScope::Global));
    }

    #[test]
    fn parses_venue_scope() {
        assert_eq!(ControlScope::parse("venue:3"), Ok(ControlScope::Venue(3)));
    }

    #[test]
    fn rejects_malformed_scope() {
        assert!(ControlScope::parse("nonsense").is_err());
        assert!(ControlScope::parse("venue:abc").is_err());
    }
}
