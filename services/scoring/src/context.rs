//! Market/fee context a `Score` call is evaluated against (§4.2 `Context`).

use common::{Px, Side, Symbol, Ts, Venue};
use dashmap::DashMap;

/// Maker/taker fee rate for one (venue, symbol, side), in basis points.
/// Negative values are rebates; the sign is preserved through to the fee
/// leg so a rebate reduces (or reverses) cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeeKey {
    pub venue: Venue,
    pub symbol: Symbol,
    pub order_type: OrderType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    Maker,
    Taker,
}

#[derive(Debug, Clone, Copy)]
pub struct FeeRate {
    pub bps: i64,
}

/// Funding snapshot for a (venue, symbol) perpetual.
#[derive(Debug, Clone, Copy)]
pub struct FundingSnapshot {
    /// Current funding rate, as a fraction (e.g. `0.0001` = 1 bp).
    pub rate: f64,
    pub next_funding_ts: Ts,
    pub funding_cycle_hours: f64,
}

/// Cumulative order-book depth sample used for slippage estimation.
#[derive(Debug, Clone, Copy)]
pub struct DepthSample {
    /// Cumulative quantity available at or better than top-of-book, in
    /// fixed-point quantity units.
    pub cumulative_qty_ticks: i64,
    /// Reference depth used by the fallback slippage model when the
    /// sample doesn't cover the requested notional.
    pub reference_depth_ticks: i64,
}

/// Market/fee/latency context carried into every `Score` call. Built once
/// per tick by the scheduler from C1/C3 reads and venue configuration.
#[derive(Debug, Default)]
pub struct Context {
    pub fees: DashMap<FeeKey, FeeRate>,
    pub funding: DashMap<(Venue, Symbol), FundingSnapshot>,
    pub depth: DashMap<(Venue, Symbol, Side), DepthSample>,
    pub latency_ms: DashMap<Venue, u64>,
    /// Per-venue maker-rebate-program adjustment, added to the maker fee
    /// leg's bps. Positive values make the maker leg more favorable.
    pub incentive_bps: DashMap<Venue, i32>,
    /// Annualized capital-cost rate (e.g. `0.05` = 5%/yr).
    pub capital_cost_annual_rate: f64,
    /// Latency surcharge coefficient `k`, applied per §4.2 when latency
    /// exceeds `latency_surcharge_band_ms`.
    pub latency_surcharge_k: f64,
    pub latency_surcharge_band_ms: u64,
    /// Reliability weight in the final-score formula.
    pub reliability_weight: f64,
}

impl Context {
    #[must_use]
    pub fn new(capital_cost_annual_rate: f64) -> Self {
        Self {
            fees: DashMap::new(),
            funding: DashMap::new(),
            depth: DashMap::new(),
            latency_ms: DashMap::new(),
            incentive_bps: DashMap::new(),
            capital_cost_annual_rate,
            latency_surcharge_k: 1.0,
            latency_surcharge_band_ms: 500,
            reliability_weight: 1.0,
        }
    }

    #[must_use]
    pub fn fee_bps(&self, venue: Venue, symbol: Symbol, order_type: OrderType) -> i64 {
        let key = FeeKey {
            venue,
            symbol,
            order_type,
        };
        let base = self.fees.get(&key).map_or(0, |r| r.bps);
        if matches!(order_type, OrderType::Maker) {
            base + i64::from(self.incentive_bps.get(&venue).map_or(0, |v| *v))
        } else {
            base
        }
    }

    #[must_use]
    pub fn funding_of(&self, venue: Venue, symbol: Symbol) -> Option<FundingSnapshot> {
        self.funding.get(&(venue, symbol)).map(|f| *f)
    }

    #[must_use]
    pub fn depth_of(&self, venue: Venue, symbol: Symbol, side: Side) -> Option<DepthSample> {
        self.depth.get(&(venue, symbol, side)).map(|d| *d)
    }

    #[must_use]
    pub fn latency_of(&self, venue: Venue) -> u64 {
        self.latency_ms.get(&venue).map_or(0, |l| *l)
    }
}

/// Notional-weighted price: `(notional_ticks * SCALE) / price_ticks`, used
/// to convert a notional in quote currency into base-currency quantity for
/// fee/slippage math without floats. Exposed for `cost.rs`.
#[must_use]
pub fn notional_to_qty_ticks(notional: Px, price: Px) -> i64 {
    if price.ticks() == 0 {
        return 0;
    }
    (notional.ticks() * common::constants::SCALE_4) / price.ticks()
}
