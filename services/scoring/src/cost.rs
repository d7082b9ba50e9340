//! Cost-component formulas for C2 (§4.2 Fee, Funding, Slippage, Capital-time).

use crate::context::{Context, OrderType};
use common::{Job, Leg, Px, Side};

/// Fee for one leg: `notional × fee_rate`, sign preserved (rebate yields a
/// negative cost, i.e. income). `order_type` is Taker unless the caller
/// specifies the leg executes as a maker (execution-engine concern; C2
/// scores the taker-fee case by default and lets C6 correct realized pnl).
#[must_use]
pub fn fee_for_leg(ctx: &Context, job: &Job, leg: &Leg, order_type: OrderType) -> Px {
    let leg_notional = leg_notional(job, leg);
    let bps = ctx.fee_bps(leg.venue, job.symbol, order_type);
    Px::from_ticks((leg_notional.ticks() * bps) / 10_000)
}

/// Round-trip fee cost: sum over legs, default taker on every leg (the
/// conservative estimate; Hybrid/Maker fills realize a lower actual cost).
#[must_use]
pub fn total_fee_cost(ctx: &Context, job: &Job) -> Px {
    job.legs
        .iter()
        .fold(Px::ZERO, |acc, leg| acc.add(fee_for_leg(ctx, job, leg, OrderType::Taker)))
}

/// Per-leg notional: each leg carries the same notional as the job divided
/// evenly is wrong for unequal-size multi-leg jobs, so we price by the
/// leg's own quantity; callers that build single-size legs get job.notional
/// back exactly.
#[must_use]
pub fn leg_notional(job: &Job, leg: &Leg) -> Px {
    if job.legs.len() == 1 {
        return job.notional;
    }
    let total_qty: i64 = job.legs.iter().map(|l| l.qty.raw()).sum();
    if total_qty == 0 {
        return Px::ZERO;
    }
    Px::from_ticks((job.notional.ticks() * leg.qty.raw()) / total_qty)
}

/// Net funding cost/income across all legs: long pays positive, short
/// receives positive (i.e. the leg-sign convention flips the sign of what
/// a short leg "pays").
#[must_use]
pub fn net_funding(ctx: &Context, job: &Job, holding_hours: f64) -> Px {
    let mut total = 0.0_f64;
    for leg in &job.legs {
        let Some(snap) = ctx.funding_of(leg.venue, job.symbol) else {
            continue;
        };
        let leg_notional_f = leg_notional(job, leg).as_f64();
        let cycles = holding_hours / snap.funding_cycle_hours.max(1e-9);
        let sign = match leg.side {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        };
        total += sign * leg_notional_f * snap.rate * cycles;
    }
    Px::from_f64(total)
}

/// Volume-weighted slippage estimate for one leg against top-of-book depth,
/// with the configured fallback model when depth is insufficient, plus a
/// latency surcharge when venue latency exceeds the configured band.
#[must_use]
pub fn slippage_for_leg(ctx: &Context, job: &Job, leg: &Leg) -> Px {
    let leg_notional_f = leg_notional(job, leg).as_f64();
    let base = match ctx.depth_of(leg.venue, job.symbol, leg.side) {
        Some(depth) if depth.cumulative_qty_ticks > 0 => {
            let coverage = leg.qty.raw() as f64 / depth.cumulative_qty_ticks as f64;
            leg_notional_f * coverage.min(1.0) * FALLBACK_SLIPPAGE_COEFF
        }
        _ => {
            let reference = ctx
                .depth_of(leg.venue, job.symbol, leg.side)
                .map(|d| d.reference_depth_ticks)
                .filter(|&d| d > 0)
                .unwrap_or(leg.qty.raw().max(1));
            leg_notional_f * (leg.qty.raw() as f64 / reference as f64) * FALLBACK_SLIPPAGE_COEFF
        }
    };
    let latency = ctx.latency_of(leg.venue);
    let surcharge = if latency > ctx.latency_surcharge_band_ms {
        ctx.latency_surcharge_k * (latency as f64) / 1000.0
    } else {
        0.0
    };
    Px::from_f64(base + surcharge)
}

/// Depth-insufficiency fallback coefficient: slippage proportional to
/// `notional / reference_depth` (§4.2), scaled into a fraction of notional.
const FALLBACK_SLIPPAGE_COEFF: f64 = 0.0005;

#[must_use]
pub fn total_slippage_cost(ctx: &Context, job: &Job) -> Px {
    job.legs
        .iter()
        .fold(Px::ZERO, |acc, leg| acc.add(slippage_for_leg(ctx, job, leg)))
}

/// `notional × (annual_rate / 8760) × holding_hours`.
#[must_use]
pub fn capital_time_cost(ctx: &Context, job: &Job, holding_hours: f64) -> Px {
    let rate_per_hour = ctx.capital_cost_annual_rate / common::constants::HOURS_PER_YEAR;
    Px::from_f64(job.notional.as_f64() * rate_per_hour * holding_hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FeeKey, FeeRate};
    use common::{JobId, Qty, StrategyType, Symbol, Ts, Venue};

    fn single_leg_job(notional: f64, side: Side) -> Job {
        Job {
            id: JobId(1),
            strategy: StrategyType::Wash,
            symbol: Symbol::new(1),
            legs: vec![Leg {
                venue: Venue::new(1),
                side,
                qty: Qty::from_f64(notional / 50_000.0),
            }],
            notional: Px::from_f64(notional),
            expected_edge_bps: 10,
            expected_pnl: Px::ZERO,
            risk_score: 0,
            latency_score: 0,
            volume_score: 0,
            funding_score: 0,
            liquidity_score: 0,
            source: "test".to_string(),
            submit_ts: Ts::from_millis(0),
        }
    }

    #[test]
    fn fee_rebate_is_negative_cost() {
        let ctx = Context::new(0.05);
        ctx.fees.insert(
            FeeKey {
                venue: Venue::new(1),
                symbol: Symbol::new(1),
                order_type: OrderType::Maker,
            },
            FeeRate { bps: -2 },
        );
        let job = single_leg_job(1_000.0, Side::Buy);
        let fee = fee_for_leg(&ctx, &job, &job.legs[0], OrderType::Maker);
        assert!(fee.ticks() < 0);
    }

    #[test]
    fn incentive_bps_reduces_maker_fee() {
        let ctx = Context::new(0.05);
        ctx.fees.insert(
            FeeKey {
                venue: Venue::new(1),
                symbol: Symbol::new(1),
                order_type: OrderType::Maker,
            },
            FeeRate { bps: 2 },
        );
        ctx.incentive_bps.insert(Venue::new(1), -3);
        let job = single_leg_job(1_000.0, Side::Buy);
        let fee = fee_for_leg(&ctx, &job, &job.legs[0], OrderType::Maker);
        // effective bps = 2 + (-3) = -1, i.e. a net rebate.
        assert!(fee.ticks() < 0);
    }

    #[test]
    fn capital_time_cost_scales_with_holding_hours() {
        let ctx = Context::new(0.08760); // chosen so rate/8760h = 1e-5/h for a clean number
        let job = single_leg_job(10_000.0, Side::Buy);
        let cost_1h = capital_time_cost(&ctx, &job, 1.0);
        let cost_2h = capital_time_cost(&ctx, &job, 2.0);
        assert!((cost_2h.as_f64() - 2.0 * cost_1h.as_f64()).abs() < 1e-6);
    }
}
