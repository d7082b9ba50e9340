//! C5 Scheduler: `Submit`, `Tick`, `OnJobFinished` (§4.5).

use crate::error::SubmitError;
use crate::record::{RunningEntry, TerminalReason, TerminalRecord};
use crate::tick::TickReport;
use capital::{CapitalCoordinator, ReleaseOutcome};
use common::{Job, JobId, Px, Ts, Venue};
use parking_lot::Mutex;
use risk::{Decision, RejectReason, RiskContext, RiskEvaluator};
use scoring::{score, Context as ScoringContext, ScoreInputs};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct SchedulerConfig {
    pub max_global: usize,
    pub max_per_venue: usize,
    pub max_pending: usize,
    pub max_terminal_ring: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_global: 100,
            max_per_venue: 20,
            max_pending: 10_000,
            max_terminal_ring: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum JobOutcome {
    Completed { realized_pnl: Px, fee: Px },
    Failed,
}

/// Per-tick inputs needed to score and risk-evaluate a candidate job.
/// Supplied by the caller (the coordinator binary, wiring C1/C2/C4
/// together) since only it knows current market/account state.
pub trait TickInputs {
    fn score_inputs(&self, job: &Job) -> ScoreInputs;
    fn risk_context(&self, job: &Job) -> RiskContext;
}

/// Lifetime counters, for the operator `/state` surface — the terminal
/// ring is bounded and rolls off, so these survive beyond its capacity.
#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct SchedulerCounters {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub rejected: u64,
}

pub struct Scheduler {
    config: SchedulerConfig,
    capital: Arc<CapitalCoordinator>,
    risk: Arc<RiskEvaluator>,
    pending: Mutex<VecDeque<Job>>,
    running: Mutex<HashMap<JobId, RunningEntry>>,
    terminal: Mutex<VecDeque<TerminalRecord>>,
    tick_lock: Mutex<()>,
    next_id: AtomicU64,
    submitted_total: AtomicU64,
    completed_total: AtomicU64,
    failed_total: AtomicU64,
    rejected_total: AtomicU64,
}

impl Scheduler {
    #[must_use]
    pub fn new(config: SchedulerConfig, capital: Arc<CapitalCoordinator>, risk: Arc<RiskEvaluator>) -> Self {
        Self {
            config,
            capital,
            risk,
            pending: Mutex::new(VecDeque::new()),
            running: Mutex::new(HashMap::new()),
            terminal: Mutex::new(VecDeque::new()),
            tick_lock: Mutex::new(()),
            next_id: AtomicU64::new(1),
            submitted_total: AtomicU64::new(0),
            completed_total: AtomicU64::new(0),
            failed_total: AtomicU64::new(0),
            rejected_total: AtomicU64::new(0),
        }
    }

    /// Allocates a fresh job id; two calls always yield distinct ids
    /// (§8 property 10).
    #[must_use]
    pub fn next_job_id(&self) -> JobId {
        JobId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// `Submit(job) → (ok, reason)`.
    pub fn submit(&self, job: Job) -> Result<JobId, SubmitError> {
        if job.validate().is_err() {
            return Err(SubmitError::Invalid);
        }
        let mut pending = self.pending.lock();
        if pending.len() >= self.config.max_pending {
            return Err(SubmitError::QueueFull);
        }
        let id = job.id;
        pending.push_back(job);
        self.submitted_total.fetch_add(1, Ordering::Relaxed);
        Ok(id)
    }

    fn push_terminal(&self, job_id: JobId, reason: TerminalReason, detail: String, now: Ts) {
        let mut ring = self.terminal.lock();
        if ring.len() >= self.config.max_terminal_ring {
            ring.pop_front();
        }
        ring.push_back(TerminalRecord {
            job_id,
            reason,
            detail,
            at: now,
        });
    }

    fn running_count_for_venue(running: &HashMap<JobId, RunningEntry>, venue: Venue) -> usize {
        running
            .values()
            .filter(|e| e.job.legs.iter().any(|l| l.venue == venue))
            .count()
    }

    /// `Tick(marketContext) → TickReport` — one deterministic scheduling
    /// round (§4.5).
    pub fn tick(&self, scoring_ctx: &ScoringContext, inputs: &dyn TickInputs, now: Ts) -> TickReport {
        let _guard = self.tick_lock.lock(); // ticks never overlap
        let mut report = TickReport::default();

        let running_len = self.running.lock().len();
        if running_len >= self.config.max_global {
            report.global_concurrent_limit_hit = true;
            report.running_total = running_len;
            report.pending_remaining = self.pending.lock().len();
            warn!(running = running_len, "scheduler at global concurrency cap");
            return report;
        }

        // Step 1: snapshot pending.
        let snapshot: Vec<Job> = self.pending.lock().iter().cloned().collect();

        // Steps 3-4: evaluate risk and capital, partition into survivors
        // and terminal/stay-pending.
        let mut survivors: Vec<(Job, f64)> = Vec::new();
        let mut still_pending: Vec<Job> = Vec::new();

        for job in snapshot {
            let risk_ctx = inputs.risk_context(&job);
            let verdict = self.risk.evaluate(&job, &risk_ctx);
            if verdict.decision == Decision::Reject {
                let hard = verdict.reason.is_none_or(RejectReason::is_terminal);
                if !hard {
                    // Soft reject: mode- or market-dependent, may pass on
                    // a later tick (§4.5, e.g. scenario S5). Stays in
                    // `pending`, not terminated.
                    still_pending.push(job);
                    continue;
                }
                self.push_terminal(
                    job.id,
                    TerminalReason::Rejected,
                    verdict
                        .reason
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "rejected".to_string()),
                    now,
                );
                report.rejected.push((job.id, "risk_reject".to_string()));
                self.rejected_total.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            if self.capital.can_reserve(&job).is_err() {
                still_pending.push(job);
                continue;
            }

            let score_inputs = inputs.score_inputs(&job);
            let opp_score = score(&job, scoring_ctx, &score_inputs);
            survivors.push((job, opp_score.final_score));
            // still_pending will be reconstructed below from whichever
            // survivors don't get scheduled this round.
        }

        // Step 5: rank by final_score descending, stable on submit_ts.
        survivors.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.submit_ts.as_millis().cmp(&b.0.submit_ts.as_millis()))
        });

        // Step 6: greedy selection.
        let mut running = self.running.lock();
        for (job, _final_score) in survivors {
            if running.len() >= self.config.max_global {
                still_pending.push(job);
                continue;
            }
            let venue_cap_hit = job
                .legs
                .iter()
                .any(|l| Self::running_count_for_venue(&running, l.venue) >= self.config.max_per_venue);
            if venue_cap_hit {
                still_pending.push(job);
                continue;
            }
            match self.capital.reserve(&job) {
                Ok(reservation) => {
                    let job_id = job.id;
                    report.scheduled.push(job_id);
                    report.dispatched.push((job_id, job.clone(), reservation.clone()));
                    running.insert(
                        job_id,
                        RunningEntry {
                            job,
                            reservation,
                            dispatched_at: now,
                        },
                    );
                    info!(job_id = job_id.0, "job dispatched");
                }
                Err(_) => still_pending.push(job),
            }
        }
        report.running_total = running.len();
        drop(running);

        *self.pending.lock() = still_pending.into_iter().collect();
        report.pending_remaining = self.pending.lock().len();
        report
    }

    /// `OnJobFinished(jobId, result)`.
    pub fn on_job_finished(&self, job_id: JobId, outcome: JobOutcome, now: Ts) {
        let entry = { self.running.lock().remove(&job_id) };
        let Some(entry) = entry else {
            return;
        };
        match outcome {
            JobOutcome::Completed { realized_pnl, fee } => {
                self.capital
                    .release(&entry.reservation, ReleaseOutcome::Filled, realized_pnl, fee, now);
                self.risk.record_success();
                self.push_terminal(job_id, TerminalReason::Completed, "completed".to_string(), now);
                self.completed_total.fetch_add(1, Ordering::Relaxed);
            }
            JobOutcome::Failed => {
                self.capital
                    .release(&entry.reservation, ReleaseOutcome::Failed, Px::ZERO, Px::ZERO, now);
                self.risk.record_failure();
                self.push_terminal(job_id, TerminalReason::Failed, "failed".to_string(), now);
                self.failed_total.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    #[must_use]
    pub fn running_len(&self) -> usize {
        self.running.lock().len()
    }

    #[must_use]
    pub fn terminal_len(&self) -> usize {
        self.terminal.lock().len()
    }

    #[must_use]
    pub fn counters(&self) -> SchedulerCounters {
        SchedulerCounters {
            submitted: self.submitted_total.load(Ordering::Relaxed),
            completed: self.completed_total.load(Ordering::Relaxed),
            failed: self.failed_total.load(Ordering::Relaxed),
            rejected: self.rejected_total.load(Ordering::Relaxed),
        }
    }
}
