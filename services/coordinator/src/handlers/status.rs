//! `GET /state` (§6: "global stats: equity, today pnl, volume,
//! active/pending/running/rejected counts, risk mode, kill-switch
//! flags").

use crate::dto::{JobCountersView, StateResponse, VenueStateView};
use crate::state::AppState;
use axum::extract::State;
use axum::response::Json;

pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let venues = state
        .capital
        .all_venues()
        .into_iter()
        .map(|(venue, vc)| VenueStateView {
            venue: venue.to_string(),
            equity_usd: vc.equity.as_f64(),
            realized_pnl_today_usd: vc.realized_pnl_today.as_f64(),
            volume_today_usd: vc.volume_today.as_f64(),
            fees_today_usd: vc.fees_today.as_f64(),
            utilization_pct: vc.utilization_pct(),
            safe_mode: vc.safe_mode,
            venue_kill_switch: state.supervisor.kill_switches.venue(venue),
        })
        .collect();

    let counters = state.scheduler.counters();

    Json(StateResponse {
        risk_mode: state.risk.mode(),
        global_kill_switch: state.risk.global_kill_switch(),
        auto_halt: state.risk.consecutive_failures() > 0,
        consecutive_failures: state.risk.consecutive_failures(),
        pending: state.scheduler.pending_len(),
        running: state.scheduler.running_len(),
        terminal_recorded: state.scheduler.terminal_len(),
        counters: JobCountersView {
            submitted: counters.submitted,
            completed: counters.completed,
            failed: counters.failed,
            rejected: counters.rejected,
        },
        venues,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
