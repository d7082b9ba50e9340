//! Execution engine configuration (§6 Configuration: Execution).

use common::Px;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Maximum time a Maker leg is allowed to sit unfilled before the
    /// watchdog cancels it and falls back to Taker.
    pub maker_timeout_ms: u64,
    /// Hard per-cycle cap on unhedged notional before the watchdog forces
    /// a Taker fallback.
    pub max_unhedged_usd: Px,
    /// Conservative estimate of cancel-plus-fallback latency, added to
    /// `maker_timeout_ms` for the documented unhedged-time bound.
    pub cancel_latency_ms: u64,
    /// Below this fill rate (over the rolling window) the pair degrades.
    pub min_fill_rate: f64,
    /// Above this fallback rate (over the rolling window) the pair degrades.
    pub max_fallback_rate: f64,
    /// Rolling window size in samples.
    pub window_size: usize,
    /// Degradation cooldown, seconds.
    pub cooldown_sec: i64,
    /// Minimum liquidity score (0-100) required on both venues for
    /// `DOUBLE_MAKER_OPPORTUNISTIC` to be selected.
    pub double_maker_min_liquidity_score: u8,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            maker_timeout_ms: 2_000,
            max_unhedged_usd: Px::from_f64(5_000.0),
            cancel_latency_ms: 250,
            min_fill_rate: 0.5,
            max_fallback_rate: 0.3,
            window_size: 20,
            cooldown_sec: 300,
            double_maker_min_liquidity_score: 70,
        }
    }
}
