//! Per-dimension risk scores (§4.4), each normalized to `[0, 100]`.

use crate::modes::ModePreset;
use common::Ts;

/// Inputs the per-dimension scorers need; assembled by the caller from C1's
/// quotes, C2's context, and C7's health each tick.
#[derive(Debug, Clone, Copy)]
pub struct DimensionInputs {
    pub next_funding_in_secs: i64,
    pub spread_bps: i64,
    pub rolling_volatility: f64,
    pub max_leg_latency_ms: u64,
    pub liquidation_distance_pct: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionScores {
    pub funding: f64,
    pub spread: f64,
    pub volatility: f64,
    pub latency: f64,
    pub liquidation_distance: f64,
}

const BLACKOUT_SECS: i64 = 10 * 60;

impl DimensionScores {
    #[must_use]
    pub fn compute(inputs: &DimensionInputs, preset: &ModePreset) -> Self {
        let funding = if in_funding_blackout(Ts::from_millis(0), Ts::from_millis(inputs.next_funding_in_secs.unsigned_abs() * 1_000)) {
            0.0
        } else {
            100.0
        };

        // Tighter spread -> higher score; saturate at 50 bps.
        let spread = (100.0 - (inputs.spread_bps as f64 / 50.0 * 100.0)).clamp(0.0, 100.0);

        let volatility = (100.0
            - (inputs.rolling_volatility / preset.volatility_threshold.max(1e-9) * 100.0))
            .clamp(0.0, 100.0);

        let latency = (100.0
            - (inputs.max_leg_latency_ms as f64 / preset.max_latency_ms.max(1) as f64 * 100.0))
            .clamp(0.0, 100.0);

        let liquidation_distance = (inputs.liquidation_distance_pct * 100.0).clamp(0.0, 100.0);

        Self {
            funding,
            spread,
            volatility,
            latency,
            liquidation_distance,
        }
    }

    /// Weighted sum per §4.4: funding 25, spread 25, volatility 20,
    /// latency 15, liquidation distance 15.
    #[must_use]
    pub fn safety_score(&self) -> f64 {
        self.funding * 0.25
            + self.spread * 0.25
            + self.volatility * 0.20
            + self.latency * 0.15
            + self.liquidation_distance * 0.15
    }
}

/// Volume contribution toward a configured daily target, normalized to
/// `[0, 100]`.
#[must_use]
pub fn volume_score(notional_today: f64, daily_target: f64) -> f64 {
    if daily_target <= 0.0 {
        return 0.0;
    }
    (notional_today / daily_target * 100.0).clamp(0.0, 100.0)
}

/// True while `now` is within `BLACKOUT_MIN` of the given funding
/// timestamp, on either side.
#[must_use]
pub fn in_funding_blackout(now: Ts, next_funding: Ts) -> bool {
    let diff = if now.as_millis() > next_funding.as_millis() {
        now.as_millis() - next_funding.as_millis()
    } else {
        next_funding.as_millis() - now.as_millis()
    };
    diff <= (BLACKOUT_SECS as u64) * 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::RiskMode;

    #[test]
    fn funding_score_is_zero_inside_blackout_window() {
        let inputs = DimensionInputs {
            next_funding_in_secs: 300,
            spread_bps: 5,
            rolling_volatility: 0.01,
            max_leg_latency_ms: 50,
            liquidation_distance_pct: 0.5,
        };
        let scores = DimensionScores::compute(&inputs, &RiskMode::Balanced.preset());
        assert_eq!(scores.funding, 0.0);
    }

    #[test]
    fn funding_score_is_full_outside_blackout_window() {
        let inputs = DimensionInputs {
            next_funding_in_secs: 3_600,
            spread_bps: 5,
            rolling_volatility: 0.01,
            max_leg_latency_ms: 50,
            liquidation_distance_pct: 0.5,
        };
        let scores = DimensionScores::compute(&inputs, &RiskMode::Balanced.preset());
        assert_eq!(scores.funding, 100.0);
    }

    #[test]
    fn safety_score_weights_sum_to_full_scale() {
        let inputs = DimensionInputs {
            next_funding_in_secs: 3_600,
            spread_bps: 0,
            rolling_volatility: 0.0,
            max_leg_latency_ms: 0,
            liquidation_distance_pct: 1.0,
        };
        let scores = DimensionScores::compute(&inputs, &RiskMode::Balanced.preset());
        assert!((scores.safety_score() - 100.0).abs() < 1e-9);
    }
}
