//! Execution mode selection (§4.6 "Mode selection" / "Forced degradation").

use common::{Px, Venue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    SafeTakerOnly,
    HybridHedgeTaker,
    DoubleMakerOpportunistic,
}

/// Per-leg venue quote context needed to pick a mode and, for
/// `HybridHedgeTaker`, to decide which leg hedges.
#[derive(Debug, Clone, Copy)]
pub struct VenueLegInfo {
    pub venue: Venue,
    pub maker_fee_bps: i32,
    pub taker_fee_bps: i32,
    pub liquidity_score: u8,
}

/// Picks the configured mode's candidate, then applies the venue-pair
/// conditions that narrow it (double-maker eligibility). Forced
/// degradation to `SAFE_TAKER_ONLY` is applied by the caller when C7
/// reports the pair degraded or the Maker tracker has it in cooldown —
/// that check sits above this pure selection (engine.rs).
#[must_use]
pub fn select_mode(configured: ExecutionMode, buy: VenueLegInfo, sell: VenueLegInfo, min_liquidity: u8) -> ExecutionMode {
    match configured {
        ExecutionMode::SafeTakerOnly => ExecutionMode::SafeTakerOnly,
        ExecutionMode::HybridHedgeTaker => ExecutionMode::HybridHedgeTaker,
        ExecutionMode::DoubleMakerOpportunistic => {
            let both_negative_maker = buy.maker_fee_bps < 0 && sell.maker_fee_bps < 0;
            let both_liquid = buy.liquidity_score >= min_liquidity && sell.liquidity_score >= min_liquidity;
            if both_negative_maker && both_liquid {
                ExecutionMode::DoubleMakerOpportunistic
            } else {
                ExecutionMode::HybridHedgeTaker
            }
        }
    }
}

/// Chooses the hedge leg (Taker, dispatched first) for `HybridHedgeTaker`:
/// the leg whose venue's maker rate is *less* favorable, so the Maker
/// (rebate) leg goes where the rebate is best (§4.6).
#[must_use]
pub fn choose_hedge_leg(buy: VenueLegInfo, sell: VenueLegInfo) -> Venue {
    if buy.maker_fee_bps >= sell.maker_fee_bps {
        buy.venue
    } else {
        sell.venue
    }
}

/// Unhedged-notional guard input: true once either side's unhedged
/// notional would exceed the configured cap (§4.6 hard contract).
#[must_use]
pub fn exceeds_unhedged_cap(unhedged_notional: Px, max_unhedged: Px) -> bool {
    unhedged_notional > max_unhedged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(venue: u16, maker_fee_bps: i32, liquidity: u8) -> VenueLegInfo {
        VenueLegInfo {
            venue: Venue::new(venue),
            maker_fee_bps,
            taker_fee_bps: 5,
            liquidity_score: liquidity,
        }
    }

    #[test]
    fn double_maker_requires_both_negative_fees_and_liquidity() {
        let buy = leg(1, -2, 80);
        let sell = leg(2, -1, 90);
        assert_eq!(
            select_mode(ExecutionMode::DoubleMakerOpportunistic, buy, sell, 70),
            ExecutionMode::DoubleMakerOpportunistic
        );
    }

    #[test]
    fn double_maker_falls_back_to_hybrid_when_liquidity_insufficient() {
        let buy = leg(1, -2, 40);
        let sell = leg(2, -1, 90);
        assert_eq!(
            select_mode(ExecutionMode::DoubleMakerOpportunistic, buy, sell, 70),
            ExecutionMode::HybridHedgeTaker
        );
    }

    #[test]
    fn hedge_leg_is_the_less_favorable_maker_rate() {
        let buy = leg(1, 2, 80);
        let sell = leg(2, -1, 90);
        assert_eq!(choose_hedge_leg(buy, sell), Venue::new(1));
    }

    #[test]
    fn unhedged_cap_boundary_is_strictly_greater_than() {
        let cap = Px::from_f64(1_000.0);
        assert!(!exceeds_unhedged_cap(cap, cap));
        assert!(exceeds_unhedged_cap(Px::from_f64(1_000.01), cap));
    }
}
