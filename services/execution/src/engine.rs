//! `ExecuteHedge`: the C6 contract (§4.6). Mode selection, forced
//! degradation, the unhedged-risk watchdog, and Maker-statistics
//! recording all meet here.

use crate::adapter::{ExchangeAdapter, OrderKind, OrderStatus};
use crate::config::ExecutionConfig;
use crate::error::ExecutionError;
use crate::fill_probability::estimate_fill_probability;
use crate::maker_tracker::{MakerTracker, Pair};
use crate::mode::{choose_hedge_leg, exceeds_unhedged_cap, select_mode, ExecutionMode, VenueLegInfo};
use common::{Px, Qty, Side, Symbol, Ts, Venue};
use std::sync::Arc;
use std::time::Duration;
use supervisor::{ConnectionRole, ConnectionState, ConnectionSupervisor};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct LegResult {
    pub venue: Venue,
    pub side: Side,
    pub status: OrderStatus,
    pub filled_price: Option<Px>,
    pub fee: Px,
}

#[derive(Debug, Clone, Copy)]
pub struct HedgeResult {
    pub buy_leg: LegResult,
    pub sell_leg: LegResult,
    pub total_unhedged_time_ms: u64,
    pub peak_unhedged_notional: Px,
    pub had_fallback: bool,
    pub mode_used: ExecutionMode,
}

#[derive(Debug, Clone, Copy)]
pub struct HedgeRequest {
    pub symbol: Symbol,
    pub qty: Qty,
    pub buy: VenueLegInfo,
    pub sell: VenueLegInfo,
    pub buy_px: Px,
    pub sell_px: Px,
    pub configured_mode: ExecutionMode,
    pub is_wash_mode: bool,
    pub job_is_wash: bool,
    pub expected_pnl: Option<Px>,
    pub min_pnl: Option<Px>,
}

fn fee_for(px: Px, qty: Qty, fee_bps: i32) -> Px {
    let notional = Px::from_ticks(px.mul_qty(qty));
    Px::from_ticks((notional.ticks() as i128 * fee_bps as i128 / 10_000) as i64)
}

pub struct ExecutionEngine {
    config: ExecutionConfig,
    adapter: Arc<dyn ExchangeAdapter>,
    maker_tracker: Arc<MakerTracker>,
    supervisor: Arc<ConnectionSupervisor>,
}

impl ExecutionEngine {
    #[must_use]
    pub fn new(
        config: ExecutionConfig,
        adapter: Arc<dyn ExchangeAdapter>,
        maker_tracker: Arc<MakerTracker>,
        supervisor: Arc<ConnectionSupervisor>,
    ) -> Self {
        Self {
            config,
            adapter,
            maker_tracker,
            supervisor,
        }
    }

    fn validate(&self, req: &HedgeRequest) -> Result<(), ExecutionError> {
        if req.is_wash_mode && !req.job_is_wash {
            return Err(ExecutionError::NotWashMode);
        }
        if let (Some(expected), Some(min)) = (req.expected_pnl, req.min_pnl) {
            if expected < min {
                return Err(ExecutionError::BelowMinPnl(expected, min));
            }
        }
        Ok(())
    }

    fn pair_degraded(&self, buy_venue: Venue, sell_venue: Venue, now: Ts) -> bool {
        let connection_degraded = [buy_venue, sell_venue].iter().any(|v| {
            !matches!(
                self.supervisor.connection_state(*v, ConnectionRole::Trading),
                Some(ConnectionState::Connected)
            )
        });
        connection_degraded || self.maker_tracker.is_degraded(Pair::new(buy_venue, sell_venue), now)
    }

    /// `ExecuteHedge(buyVenue, sellVenue, symbol, notional, buyPx, sellPx,
    /// context) → HedgeResult` (§4.6).
    pub async fn execute_hedge(&self, req: HedgeRequest, now: Ts) -> Result<HedgeResult, ExecutionError> {
        self.validate(&req)?;

        let forced_safe = self.pair_degraded(req.buy.venue, req.sell.venue, now);
        let mode = if forced_safe {
            ExecutionMode::SafeTakerOnly
        } else {
            select_mode(req.configured_mode, req.buy, req.sell, self.config.double_maker_min_liquidity_score)
        };
        if forced_safe {
            warn!(buy = ?req.buy.venue, sell = ?req.sell.venue, "forced SAFE_TAKER_ONLY: pair degraded");
        }

        match mode {
            ExecutionMode::SafeTakerOnly => self.run_safe_taker_only(&req, mode).await,
            ExecutionMode::HybridHedgeTaker => self.run_hybrid_hedge_taker(&req, mode).await,
            ExecutionMode::DoubleMakerOpportunistic => self.run_double_maker(&req, mode).await,
        }
    }

    async fn taker_fill(&self, venue: Venue, symbol: Symbol, side: Side, qty: Qty, fee_bps: i32) -> Result<LegResult, ExecutionError> {
        let ack = self
            .adapter
            .place_order(venue, symbol, side, qty, OrderKind::Market)
            .await
            .map_err(|e| ExecutionError::OrderRejected(venue, e.to_string()))?;
        if ack.status != OrderStatus::Filled {
            return Err(ExecutionError::HedgeLegFailed(venue));
        }
        let px = ack.filled_price.unwrap_or(Px::ZERO);
        Ok(LegResult {
            venue,
            side,
            status: ack.status,
            filled_price: ack.filled_price,
            fee: fee_for(px, qty, fee_bps),
        })
    }

    async fn run_safe_taker_only(&self, req: &HedgeRequest, mode: ExecutionMode) -> Result<HedgeResult, ExecutionError> {
        let qty = req.qty;
        let (buy_res, sell_res) = tokio::join!(
            self.taker_fill(req.buy.venue, req.symbol, Side::Buy, qty, req.buy.taker_fee_bps),
            self.taker_fill(req.sell.venue, req.symbol, Side::Sell, qty, req.sell.taker_fee_bps)
        );
        Ok(HedgeResult {
            buy_leg: buy_res?,
            sell_leg: sell_res?,
            total_unhedged_time_ms: 0,
            peak_unhedged_notional: Px::ZERO,
            had_fallback: false,
            mode_used: mode,
        })
    }

    /// Places a Maker leg, enforcing both halves of the watchdog: the
    /// notional cap is checked before the order is even placed (an
    /// outright skip of the Maker attempt), and the fill-timeout is
    /// checked while it's outstanding. Either trip forces a Taker
    /// fallback for this leg (§4.6 hard contract).
    async fn run_maker_leg(
        &self,
        pair: Pair,
        info: VenueLegInfo,
        side: Side,
        px: Px,
        qty: Qty,
        symbol: Symbol,
        req: &HedgeRequest,
    ) -> Result<(LegResult, bool), ExecutionError> {
        let notional = Px::from_ticks(px.mul_qty(qty));
        if exceeds_unhedged_cap(notional, self.config.max_unhedged_usd) {
            warn!(venue = ?info.venue, ?notional, "unhedged notional exceeds cap, skipping maker leg");
            let fallback = self.taker_fill(info.venue, symbol, side, qty, info.taker_fee_bps).await?;
            return Ok((fallback, true));
        }

        let recent_fill_rate = self.maker_tracker.stats(pair).map_or(0.5, |s| s.fill_rate());
        let notional_over_depth = 1.0 - f64::from(info.liquidity_score) / 100.0;
        let predicted_fill_prob = estimate_fill_probability(0.0, notional_over_depth, recent_fill_rate);
        info!(venue = ?info.venue, predicted_fill_prob, "maker leg decision");

        let ack = self
            .adapter
            .place_order(info.venue, symbol, side, qty, OrderKind::PostOnly(px))
            .await
            .map_err(|e| ExecutionError::OrderRejected(info.venue, e.to_string()))?;

        if ack.status == OrderStatus::Filled {
            self.maker_tracker.record_attempt(pair, true, false, false, req_now(req));
            Ok((
                LegResult {
                    venue: info.venue,
                    side,
                    status: ack.status,
                    filled_price: ack.filled_price,
                    fee: fee_for(px, qty, info.maker_fee_bps),
                },
                false,
            ))
        } else {
            tokio::time::sleep(Duration::from_millis(self.config.maker_timeout_ms)).await;
            let _ = self.adapter.cancel_order(info.venue, ack.order_id).await;
            self.maker_tracker.record_attempt(pair, false, true, true, req_now(req));
            let fallback = self.taker_fill(info.venue, symbol, side, qty, info.taker_fee_bps).await?;
            info!(venue = ?info.venue, "maker leg timed out, fell back to taker");
            Ok((fallback, true))
        }
    }

    /// One leg is Taker (the hedge, issued first), the other Maker
    /// post-only at the opportunity price; the watchdog bounds how long
    /// the position can stay unhedged (§4.6 hard contract).
    async fn run_hybrid_hedge_taker(&self, req: &HedgeRequest, mode: ExecutionMode) -> Result<HedgeResult, ExecutionError> {
        let hedge_venue = choose_hedge_leg(req.buy, req.sell);
        let (hedge_info, hedge_side, hedge_px, maker_info, maker_side, maker_px) = if hedge_venue == req.buy.venue {
            (req.buy, Side::Buy, req.buy_px, req.sell, Side::Sell, req.sell_px)
        } else {
            (req.sell, Side::Sell, req.sell_px, req.buy, Side::Buy, req.buy_px)
        };

        let hedge_leg = self.taker_fill(hedge_info.venue, req.symbol, hedge_side, req.qty, hedge_info.taker_fee_bps).await?;

        let watchdog_start = std::time::Instant::now();
        let pair = Pair::new(req.buy.venue, req.sell.venue);
        let (maker_leg, had_fallback) = self
            .run_maker_leg(pair, maker_info, maker_side, maker_px, req.qty, req.symbol, req)
            .await?;

        let unhedged_ms = u64::try_from(watchdog_start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let notional = Px::from_ticks(hedge_px.mul_qty(req.qty));

        let (buy_leg, sell_leg) = if hedge_side == Side::Buy {
            (hedge_leg, maker_leg)
        } else {
            (maker_leg, hedge_leg)
        };

        Ok(HedgeResult {
            buy_leg,
            sell_leg,
            total_unhedged_time_ms: unhedged_ms,
            peak_unhedged_notional: notional,
            had_fallback,
            mode_used: mode,
        })
    }

    /// Both legs attempt Maker concurrently; either side whose notional
    /// would exceed the unhedged cap, or that doesn't fill in time, is
    /// replaced by a Taker fill (§4.6).
    async fn run_double_maker(&self, req: &HedgeRequest, mode: ExecutionMode) -> Result<HedgeResult, ExecutionError> {
        let pair = Pair::new(req.buy.venue, req.sell.venue);
        let start = std::time::Instant::now();

        let (buy_result, sell_result) = tokio::join!(
            self.run_maker_leg(pair, req.buy, Side::Buy, req.buy_px, req.qty, req.symbol, req),
            self.run_maker_leg(pair, req.sell, Side::Sell, req.sell_px, req.qty, req.symbol, req)
        );
        let (buy_leg, buy_fallback) = buy_result?;
        let (sell_leg, sell_fallback) = sell_result?;
        let had_fallback = buy_fallback || sell_fallback;

        let unhedged_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let notional = Px::from_ticks(req.buy_px.mul_qty(req.qty));

        Ok(HedgeResult {
            buy_leg,
            sell_leg,
            total_unhedged_time_ms: unhedged_ms,
            peak_unhedged_notional: if had_fallback { notional } else { Px::ZERO },
            had_fallback,
            mode_used: mode,
        })
    }
}

// Kept free of `self` so maker-attempt recording doesn't need a `Ts`
// clock threaded through every call.
fn req_now(_req: &HedgeRequest) -> Ts {
    Ts::now()
}
