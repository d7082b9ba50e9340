//! C4 Risk Evaluator: `Evaluate`, kill switches, auto-halt, mode switching.

use crate::dimensions::{volume_score, DimensionInputs, DimensionScores};
use crate::modes::RiskMode;
use crate::verdict::{Decision, RejectReason, Verdict};
use common::{Job, Px, Symbol, Venue};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Per-tick market/account context the evaluator scores a job against.
/// Consecutive-failure and auto-halt state live on the evaluator itself
/// (§4.4 `RecordSuccess`/`RecordFailure`), not here.
#[derive(Debug, Clone, Copy)]
pub struct RiskContext {
    pub equity: Px,
    pub today_pnl: Px,
    pub loss_limit_pct: f64,
    pub loss_limit_abs: Px,
    pub manual_override: bool,
    pub dimensions: DimensionInputs,
    pub notional_today: f64,
    pub daily_target: f64,
}

pub struct RiskEvaluator {
    global_kill: AtomicBool,
    venue_kill: DashMap<Venue, ()>,
    auto_halt: AtomicBool,
    consecutive_failures: AtomicU32,
    mode: RwLock<RiskMode>,
    fast_market_blacklist: DashMap<Symbol, ()>,
    delayed_venue_blacklist: DashMap<Venue, ()>,
}

impl Default for RiskEvaluator {
    fn default() -> Self {
        Self::new(RiskMode::Balanced)
    }
}

impl RiskEvaluator {
    #[must_use]
    pub fn new(mode: RiskMode) -> Self {
        Self {
            global_kill: AtomicBool::new(false),
            venue_kill: DashMap::new(),
            auto_halt: AtomicBool::new(false),
            consecutive_failures: AtomicU32::new(0),
            mode: RwLock::new(mode),
            fast_market_blacklist: DashMap::new(),
            delayed_venue_blacklist: DashMap::new(),
        }
    }

    pub fn set_global_kill_switch(&self, on: bool) {
        self.global_kill.store(on, Ordering::SeqCst);
    }

    #[must_use]
    pub fn global_kill_switch(&self) -> bool {
        self.global_kill.load(Ordering::SeqCst)
    }

    pub fn set_venue_kill_switch(&self, venue: Venue, on: bool) {
        if on {
            self.venue_kill.insert(venue, ());
        } else {
            self.venue_kill.remove(&venue);
        }
    }

    pub fn set_auto_halt(&self, on: bool) {
        self.auto_halt.store(on, Ordering::SeqCst);
    }

    /// Operator-only reset of the auto-halt flag (§4.4).
    pub fn reset_auto_halt(&self) {
        self.auto_halt.store(false, Ordering::SeqCst);
    }

    /// `SetMode`: swaps the active preset. Callers apply this at tick
    /// boundaries per §4.4.
    pub fn set_mode(&self, mode: RiskMode) {
        *self.mode.write() = mode;
    }

    #[must_use]
    pub fn mode(&self) -> RiskMode {
        *self.mode.read()
    }

    pub fn blacklist_symbol(&self, symbol: Symbol) {
        self.fast_market_blacklist.insert(symbol, ());
    }

    pub fn blacklist_venue(&self, venue: Venue) {
        self.delayed_venue_blacklist.insert(venue, ());
    }

    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    /// Increments the failure streak; engages `auto_halt` once the active
    /// mode's cap is reached.
    pub fn record_failure(&self) {
        let count = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        if count >= self.mode().preset().max_consecutive_failures {
            self.auto_halt.store(true, Ordering::SeqCst);
        }
    }

    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    /// `Evaluate(job, context) → Verdict` (§4.4).
    #[must_use]
    pub fn evaluate(&self, job: &Job, ctx: &RiskContext) -> Verdict {
        if self.global_kill_switch() {
            return Verdict::reject(RejectReason::GlobalKillSwitch);
        }
        if job.legs.iter().any(|leg| self.venue_kill.contains_key(&leg.venue)) {
            return Verdict::reject(RejectReason::VenueKillSwitch);
        }
        if self.auto_halt.load(Ordering::SeqCst) && !ctx.manual_override {
            return Verdict::reject(RejectReason::AutoHalt);
        }
        let loss_pct_limit = Px::from_ticks((-(ctx.equity.ticks() as f64) * ctx.loss_limit_pct) as i64);
        if ctx.today_pnl < loss_pct_limit || ctx.today_pnl < Px::from_ticks(-ctx.loss_limit_abs.ticks()) {
            return Verdict::reject(RejectReason::DailyLossLimit);
        }
        if self.fast_market_blacklist.contains_key(&job.symbol) {
            return Verdict::reject(RejectReason::FastMarketBlacklist);
        }
        if job
            .legs
            .iter()
            .any(|leg| self.delayed_venue_blacklist.contains_key(&leg.venue))
        {
            return Verdict::reject(RejectReason::DelayedVenueBlacklist);
        }

        let preset = self.mode().preset();
        let mut soft_triggered: Option<RejectReason> = None;
        if job.expected_edge_bps < preset.min_edge_bps {
            soft_triggered = Some(RejectReason::BelowMinEdge);
        } else if self.consecutive_failures() >= preset.max_consecutive_failures {
            soft_triggered = Some(RejectReason::ConsecutiveFailures);
        }

        if let Some(reason) = soft_triggered {
            if !ctx.manual_override {
                return Verdict::reject(reason);
            }
        }

        let dims = DimensionScores::compute(&ctx.dimensions, &preset);
        let safety = dims.safety_score();
        let volume = volume_score(ctx.notional_today, ctx.daily_target);
        let final_score = preset.w_safety * safety + preset.w_volume * volume;

        if final_score < preset.threshold {
            return if ctx.manual_override {
                Verdict {
                    decision: Decision::Warn,
                    safety_score: safety,
                    volume_score: volume,
                    final_score,
                    reason: Some(RejectReason::BelowThreshold),
                    per_dimension_scores: dims,
                }
            } else {
                Verdict {
                    decision: Decision::Reject,
                    safety_score: safety,
                    volume_score: volume,
                    final_score,
                    reason: Some(RejectReason::BelowThreshold),
                    per_dimension_scores: dims,
                }
            };
        }

        Verdict {
            decision: if soft_triggered.is_some() {
                Decision::Warn
            } else {
                Decision::Accept
            },
            safety_score: safety,
            volume_score: volume,
            final_score,
            reason: soft_triggered,
            per_dimension_scores: dims,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{JobId, Leg, Qty, Side, StrategyType, Ts};

    fn good_job(edge_bps: i64) -> Job {
        Job {
            id: JobId(1),
            strategy: StrategyType::Arbitrage,
            symbol: Symbol::new(1),
            legs: vec![Leg {
                venue: Venue::new(1),
                side: Side::Buy,
                qty: Qty::from_units(1),
            }],
            notional: Px::from_f64(1_000.0),
            expected_edge_bps: edge_bps,
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

    fn good_ctx() -> RiskContext {
        RiskContext {
            equity: Px::from_f64(10_000.0),
            today_pnl: Px::ZERO,
            loss_limit_pct: 0.05,
            loss_limit_abs: Px::from_f64(1_000.0),
            manual_override: false,
            dimensions: DimensionInputs {
                next_funding_in_secs: 3_600,
                spread_bps: 1,
                rolling_volatility: 0.0,
                max_leg_latency_ms: 10,
                liquidation_distance_pct: 1.0,
            },
            notional_today: 5_000.0,
            daily_target: 10_000.0,
        }
    }

    #[test]
    fn global_kill_switch_rejects_unconditionally() {
        let evaluator = RiskEvaluator::default();
        evaluator.set_global_kill_switch(true);
        let v = evaluator.evaluate(&good_job(10), &good_ctx());
        assert_eq!(v.decision, Decision::Reject);
        assert_eq!(v.reason, Some(RejectReason::GlobalKillSwitch));
    }

    #[test]
    fn daily_loss_limit_trips_on_pct_breach() {
        let evaluator = RiskEvaluator::default();
        let mut ctx = good_ctx();
        ctx.today_pnl = Px::from_f64(-600.0); // > 5% of 10000 equity
        let v = evaluator.evaluate(&good_job(10), &ctx);
        assert_eq!(v.reason, Some(RejectReason::DailyLossLimit));
    }

    #[test]
    fn below_min_edge_rejects_without_override() {
        let evaluator = RiskEvaluator::default();
        let v = evaluator.evaluate(&good_job(0), &good_ctx());
        assert_eq!(v.reason, Some(RejectReason::BelowMinEdge));
        assert_eq!(v.decision, Decision::Reject);
    }

    #[test]
    fn below_min_edge_warns_with_override() {
        let evaluator = RiskEvaluator::default();
        let mut ctx = good_ctx();
        ctx.manual_override = true;
        let v = evaluator.evaluate(&good_job(0), &ctx);
        assert_eq!(v.decision, Decision::Warn);
    }

    #[test]
    fn aggressive_mode_accepts_lower_score_than_balanced() {
        let evaluator = RiskEvaluator::default();
        let mut ctx = good_ctx();
        ctx.dimensions.spread_bps = 40; // degrade safety score somewhat
        let balanced = evaluator.evaluate(&good_job(10), &ctx);
        evaluator.set_mode(RiskMode::Aggressive);
        let aggressive = evaluator.evaluate(&good_job(10), &ctx);
        assert!(aggressive.final_score == balanced.final_score);
        // With a lower threshold, aggressive is at least as permissive.
        if balanced.decision == Decision::Reject {
            assert_ne!(aggressive.decision, Decision::Reject);
        }
    }

    #[test]
    fn record_failure_engages_auto_halt_at_mode_cap() {
        let evaluator = RiskEvaluator::new(RiskMode::Aggressive); // cap = 8
        for _ in 0..8 {
            evaluator.record_failure();
        }
        let v = evaluator.evaluate(&good_job(10), &good_ctx());
        assert_eq!(v.reason, Some(RejectReason::AutoHalt));
    }

    #[test]
    fn reset_auto_halt_clears_the_flag() {
        let evaluator = RiskEvaluator::new(RiskMode::Aggressive);
        for _ in 0..8 {
            evaluator.record_failure();
        }
        evaluator.reset_auto_halt();
        let v = evaluator.evaluate(&good_job(10), &good_ctx());
        assert_ne!(v.reason, Some(RejectReason::AutoHalt));
    }
}
