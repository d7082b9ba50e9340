//! `OpportunityScore` and the `Score` entry point (§4.2).

use crate::context::Context;
use crate::cost::{capital_time_cost, net_funding, total_fee_cost, total_slippage_cost};
use common::{Job, Px};

/// Derived score for a job against a context (§3 `OpportunityScore`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpportunityScore {
    pub price_spread_pnl: Px,
    pub funding_pnl: Px,
    pub fee_cost: Px,
    pub slippage_cost: Px,
    pub latency_penalty: Px,
    pub capital_time_cost: Px,
    pub expected_pnl: Px,
    pub roi_pct: f64,
    pub annualized_roi: f64,
    pub time_cost_seconds: f64,
    pub risk_score: f64,
    pub final_score: f64,
}

/// `holding_hours` and `latency penalty already folded into slippage` are
/// passed in by the caller (scheduler), since they depend on the job's
/// expected hold time, which only the scheduler knows at dispatch time.
pub struct ScoreInputs {
    pub holding_hours: f64,
    pub price_spread_pnl: Px,
}

/// `Score(job, context) → OpportunityScore` (§4.2).
#[must_use]
pub fn score(job: &Job, ctx: &Context, inputs: &ScoreInputs) -> OpportunityScore {
    let fee_cost = total_fee_cost(ctx, job);
    let funding_pnl = net_funding(ctx, job, inputs.holding_hours);
    let slippage_cost = total_slippage_cost(ctx, job);
    let capital_cost = capital_time_cost(ctx, job, inputs.holding_hours);

    // Slippage already includes the latency surcharge (§4.2); expose it
    // separately here so the expected_pnl identity in §8 property 6 holds
    // against the caller-visible components.
    let latency_penalty = Px::ZERO;

    let expected_pnl = Px::from_ticks(
        inputs.price_spread_pnl.ticks() + funding_pnl.ticks()
            - fee_cost.ticks()
            - slippage_cost.ticks()
            - latency_penalty.ticks()
            - capital_cost.ticks(),
    );

    let notional_f = job.notional.as_f64().max(1e-9);
    let roi_pct = expected_pnl.as_f64() / notional_f * 100.0;
    let time_cost_seconds = inputs.holding_hours * common::constants::SECS_PER_HOUR as f64;
    let annualized_roi = if inputs.holding_hours > 0.0 {
        roi_pct * (common::constants::HOURS_PER_YEAR / inputs.holding_hours)
    } else {
        0.0
    };

    let risk_score = f64::from(job.risk_score) / 100.0;

    let final_score = if expected_pnl.ticks() <= 0 {
        0.0
    } else {
        let reliability = ctx.reliability_weight;
        expected_pnl.as_f64() * reliability * (1.0 - risk_score) / (time_cost_seconds + 1.0).sqrt()
    };

    OpportunityScore {
        price_spread_pnl: inputs.price_spread_pnl,
        funding_pnl,
        fee_cost,
        slippage_cost,
        latency_penalty,
        capital_time_cost: capital_cost,
        expected_pnl,
        roi_pct,
        annualized_roi,
        time_cost_seconds,
        risk_score,
        final_score: final_score.max(0.0),
    }
}
