//! Quote value types and pipeline configuration.

use common::{Px, Qty, Symbol, Ts, Venue};
use serde::{Deserialize, Serialize};

/// Quality label assigned to a quote after scoring (§4.1 stage 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLabel {
    Good,
    Warn,
    Bad,
}

/// A normalized, quality-scored quote for one (venue, symbol).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub venue: Venue,
    pub symbol: Symbol,
    pub best_bid: Px,
    pub best_ask: Px,
    pub bid_size: Qty,
    pub ask_size: Qty,
    /// Timestamp the venue attached to the update.
    pub event_ts: Ts,
    /// Timestamp this process received the raw update.
    pub receive_ts: Ts,
    /// Timestamp this process finished processing the update.
    pub processing_ts: Ts,
    pub mid: Px,
    pub spread_bps: i64,
    pub quality: QualityLabel,
    pub quality_score: u8,
}

impl Quote {
    #[must_use]
    pub fn bid_ask_valid(&self) -> bool {
        self.best_bid.ticks() > 0 && self.best_ask.ticks() > 0 && self.best_bid < self.best_ask
    }
}

/// Raw, unvalidated update pushed by a feed adapter (§6 `OnRawQuote`).
#[derive(Debug, Clone)]
pub struct RawQuote {
    pub venue: Venue,
    pub symbol: Symbol,
    pub bid: Px,
    pub ask: Px,
    pub bid_size: Qty,
    pub ask_size: Qty,
    pub event_ts: Ts,
}

/// Tunable thresholds for the quote pipeline (§6 Configuration: Quote).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Drop updates older than this relative to `now` (default 2000ms).
    pub stale_ms: u64,
    /// Reject updates whose mid deviates from the cached reference by more
    /// than this fraction (default 0.01 = 1%).
    pub max_dev: f64,
    /// Latency bands, in ms, for the quality-score deduction.
    pub latency_warn_ms: u64,
    pub latency_bad_ms: u64,
    /// Freshness bands, in ms.
    pub freshness_warn_ms: u64,
    pub freshness_bad_ms: u64,
    /// Variance (deviation) bands, as fractions.
    pub variance_warn: f64,
    pub variance_bad: f64,
    /// Label thresholds on the 0-100 quality score.
    pub good_threshold: u8,
    pub warn_threshold: u8,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            stale_ms: 2_000,
            max_dev: 0.01,
            latency_warn_ms: 50,
            latency_bad_ms: 200,
            freshness_warn_ms: 500,
            freshness_bad_ms: 1_500,
            variance_warn: 0.001,
            variance_bad: 0.005,
            good_threshold: 80,
            warn_threshold: 50,
        }
    }
}

/// Reason a raw update was rejected, for per-venue counters and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QuoteRejectReason {
    #[error("non-positive price")]
    NonPositivePrice,
    #[error("crossed book: bid >= ask")]
    Crossed,
    #[error("stale: age exceeds STALE_MS")]
    Stale,
    #[error("deviation from reference exceeds MAX_DEV")]
    Deviation,
    #[error("quality label is BAD")]
    BadQuality,
}
