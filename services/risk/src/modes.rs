//! Risk mode presets (conservative/balanced/aggressive), §2/§4.4.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskMode {
    Conservative,
    Balanced,
    Aggressive,
}

impl Default for RiskMode {
    fn default() -> Self {
        Self::Balanced
    }
}

/// A preset triple of thresholds and weights selected by `SetMode` and
/// swapped at tick boundaries (§4.4).
#[derive(Debug, Clone, Copy)]
pub struct ModePreset {
    pub min_edge_bps: i64,
    pub max_consecutive_failures: u32,
    pub threshold: f64,
    pub w_safety: f64,
    pub w_volume: f64,
    pub max_latency_ms: u64,
    pub volatility_threshold: f64,
}

impl RiskMode {
    #[must_use]
    pub const fn preset(self) -> ModePreset {
        match self {
            Self::Conservative => ModePreset {
                min_edge_bps: 5,
                max_consecutive_failures: 3,
                threshold: 80.0,
                w_safety: 0.7,
                w_volume: 0.3,
                max_latency_ms: 150,
                volatility_threshold: 0.02,
            },
            Self::Balanced => ModePreset {
                min_edge_bps: 3,
                max_consecutive_failures: 5,
                threshold: 70.0,
                w_safety: 0.6,
                w_volume: 0.4,
                max_latency_ms: 300,
                volatility_threshold: 0.04,
            },
            Self::Aggressive => ModePreset {
                min_edge_bps: 1,
                max_consecutive_failures: 8,
                threshold: 60.0,
                w_safety: 0.5,
                w_volume: 0.5,
                max_latency_ms: 500,
                volatility_threshold: 0.08,
            },
        }
    }
}
