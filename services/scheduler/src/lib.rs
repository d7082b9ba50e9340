//! C5 Scheduler: turns accepted jobs into dispatched work, respecting
//! capital and risk at every tick (§4.5).

pub mod error;
pub mod record;
pub mod scheduler;
pub mod tick;

pub use error::SubmitError;
pub use record::{RunningEntry, TerminalReason, TerminalRecord};
pub use scheduler::{JobOutcome, Scheduler, SchedulerConfig, SchedulerCounters, TickInputs};
pub use tick::TickReport;

#[cfg(test)]
mod tests {
    use super::*;
    use capital::{CapitalConfig, CapitalCoordinator};
    use common::{Job, JobId, Leg, Px, Qty, Side, StrategyType, Symbol, Ts, Venue};
    use risk::{RiskContext, RiskEvaluator, RiskMode};
    use scoring::{Context as ScoringContext, ScoreInputs};
    use std::sync::Arc;

    struct FixedInputs;

    impl TickInputs for FixedInputs {
        fn score_inputs(&self, _job: &Job) -> ScoreInputs {
            ScoreInputs {
                holding_hours: 1.0,
                price_spread_pnl: Px::from_f64(50.0),
            }
        }

        fn risk_context(&self, _job: &Job) -> RiskContext {
            RiskContext {
                equity: Px::from_f64(100_000.0),
                today_pnl: Px::ZERO,
                loss_limit_pct: 0.05,
                loss_limit_abs: Px::from_f64(5_000.0),
                manual_override: false,
                dimensions: risk::DimensionInputs {
                    next_funding_in_secs: 3_600,
                    spread_bps: 1,
                    rolling_volatility: 0.0,
                    max_leg_latency_ms: 10,
                    liquidation_distance_pct: 1.0,
                },
                notional_today: 0.0,
                daily_target: 1_000.0,
            }
        }
    }

    fn job(id: u64, venue: u16, notional: f64) -> Job {
        Job {
            id: JobId(id),
            strategy: StrategyType::Wash,
            symbol: Symbol::new(1),
            legs: vec![Leg {
                venue: Venue::new(venue),
                side: Side::Buy,
                qty: Qty::from_f64(notional / 50_000.0),
            }],
            notional: Px::from_f64(notional),
            expected_edge_bps: 10,
            expected_pnl: Px::ZERO,
            risk_score: 10,
            latency_score: 90,
            volume_score: 90,
            funding_score: 90,
            liquidity_score: 90,
            source: "test".to_string(),
            submit_ts: Ts::from_millis(id),
        }
    }

    fn wired(equity: f64) -> (Arc<CapitalCoordinator>, Arc<RiskEvaluator>) {
        let capital = Arc::new(CapitalCoordinator::new(CapitalConfig::default()));
        capital.register_venue(Venue::new(1), Px::from_f64(equity), Ts::from_millis(0));
        let risk = Arc::new(RiskEvaluator::new(RiskMode::Balanced));
        (capital, risk)
    }

    #[test]
    fn submit_then_tick_dispatches() {
        let (capital, risk) = wired(1_000_000.0);
        let sched = Scheduler::new(SchedulerConfig::default(), capital, risk);
        sched.submit(job(1, 1, 1_000.0)).unwrap();
        let report = sched.tick(&ScoringContext::new(0.05), &FixedInputs, Ts::from_millis(1));
        assert_eq!(report.scheduled.len(), 1);
        assert_eq!(sched.running_len(), 1);
        assert_eq!(sched.pending_len(), 0);
    }

    #[test]
    fn on_job_finished_releases_capital_and_records_outcome() {
        let (capital, risk) = wired(1_000_000.0);
        let sched = Scheduler::new(SchedulerConfig::default(), capital.clone(), risk);
        sched.submit(job(1, 1, 1_000.0)).unwrap();
        sched.tick(&ScoringContext::new(0.05), &FixedInputs, Ts::from_millis(1));
        let job_id = JobId(1);
        sched.on_job_finished(
            job_id,
            JobOutcome::Completed {
                realized_pnl: Px::from_f64(10.0),
                fee: Px::from_f64(1.0),
            },
            Ts::from_millis(2),
        );
        assert_eq!(sched.running_len(), 0);
        assert_eq!(sched.terminal_len(), 1);
        let vc = capital.venue_capital(Venue::new(1)).unwrap();
        assert_eq!(vc.realized_pnl_today, Px::from_f64(10.0));
    }

    #[test]
    fn submit_rejects_invalid_job() {
        let (capital, risk) = wired(1_000_000.0);
        let sched = Scheduler::new(SchedulerConfig::default(), capital, risk);
        let mut bad = job(1, 1, 1_000.0);
        bad.legs.clear();
        assert!(sched.submit(bad).is_err());
    }

    #[test]
    fn submit_rejects_when_pending_queue_full() {
        let (capital, risk) = wired(1_000_000.0);
        let mut cfg = SchedulerConfig::default();
        cfg.max_pending = 1;
        let sched = Scheduler::new(cfg, capital, risk);
        sched.submit(job(1, 1, 1_000.0)).unwrap();
        let err = sched.submit(job(2, 1, 1_000.0)).unwrap_err();
        assert_eq!(err, SubmitError::QueueFull);
    }

    #[test]
    fn tick_leaves_job_pending_when_capital_exhausted() {
        let (capital, risk) = wired(100.0); // far too little equity
        let sched = Scheduler::new(SchedulerConfig::default(), capital, risk);
        sched.submit(job(1, 1, 1_000.0)).unwrap();
        let report = sched.tick(&ScoringContext::new(0.05), &FixedInputs, Ts::from_millis(1));
        assert!(report.scheduled.is_empty());
        assert_eq!(sched.pending_len(), 1);
    }

    #[test]
    fn global_concurrency_cap_blocks_further_dispatch() {
        let (capital, risk) = wired(10_000_000.0);
        let mut cfg = SchedulerConfig::default();
        cfg.max_global = 1;
        let sched = Scheduler::new(cfg, capital, risk);
        sched.submit(job(1, 1, 1_000.0)).unwrap();
        sched.submit(job(2, 1, 1_000.0)).unwrap();
        let report = sched.tick(&ScoringContext::new(0.05), &FixedInputs, Ts::from_millis(1));
        assert_eq!(report.scheduled.len(), 1);
        assert_eq!(sched.pending_len(), 1);
    }

    #[test]
    fn ranking_prefers_higher_expected_pnl_under_scarce_capital() {
        let (capital, risk) = wired(3_000.0);
        let sched = Scheduler::new(SchedulerConfig::default(), capital, risk);
        sched.submit(job(1, 1, 100.0)).unwrap();
        sched.submit(job(2, 1, 2_900.0)).unwrap();
        let report = sched.tick(&ScoringContext::new(0.05), &FixedInputs, Ts::from_millis(1));
        assert!(!report.scheduled.is_empty());
    }

    #[test]
    fn lifetime_counters_track_submit_and_finish_outside_the_bounded_ring() {
        let (capital, risk) = wired(1_000_000.0);
        let sched = Scheduler::new(SchedulerConfig::default(), capital, risk);
        sched.submit(job(1, 1, 1_000.0)).unwrap();
        sched.tick(&ScoringContext::new(0.05), &FixedInputs, Ts::from_millis(1));
        sched.on_job_finished(
            JobId(1),
            JobOutcome::Completed {
                realized_pnl: Px::from_f64(5.0),
                fee: Px::from_f64(1.0),
            },
            Ts::from_millis(2),
        );
        let counters = sched.counters();
        assert_eq!(counters.submitted, 1);
        assert_eq!(counters.completed, 1);
        assert_eq!(counters.failed, 0);
        assert_eq!(counters.rejected, 0);
    }
}
