//! `TickReport`, the result of one scheduling round (§4.5).

use capital::Reservation;
use common::{Job, JobId};

#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub scheduled: Vec<JobId>,
    /// Jobs newly moved into `running` this tick, with the `Job` and
    /// `Reservation` the caller needs to dispatch them through C6 and
    /// later call `OnJobFinished` (§2 Flow: "C6 executes").
    pub dispatched: Vec<(JobId, Job, Reservation)>,
    pub rejected: Vec<(JobId, String)>,
    pub skipped: Vec<JobId>,
    pub pending_remaining: usize,
    pub running_total: usize,
    pub global_concurrent_limit_hit: bool,
}
