//! Job lifecycle records (§3 lifecycle: `pending → running → {completed,
//! failed, rejected}`, no skips/regressions/duplicates — §8 property 3).

use capital::Reservation;
use common::{Job, JobId, Ts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalReason {
    Completed,
    Failed,
    Rejected,
    Skipped,
}

pub struct RunningEntry {
    pub job: Job,
    pub reservation: Reservation,
    pub dispatched_at: Ts,
}

/// Bounded record of a job that reached a terminal state, kept in the
/// terminal ring for operator inspection (§4.5 "bounded terminal ring").
#[derive(Debug, Clone)]
pub struct TerminalRecord {
    pub job_id: JobId,
    pub reason: TerminalReason,
    pub detail: String,
    pub at: Ts,
}
