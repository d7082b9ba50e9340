//! `POST /control/*` (§6: "kill, resume, set-mode, set-override").
//!
//! Kill/resume act on both halt layers at once: C4's risk-evaluator
//! kill switch (stops new jobs being scheduled) and C7's connection
//! kill switch (stops in-flight order submission), so an operator
//! flipping a switch gets one consistent halt instead of two
//! partially-overlapping ones.

use crate::dto::{ControlResponse, ControlScope, ControlScopeQuery, SetModeRequest, SetOverrideRequest};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::Json;
use common::Venue;

fn apply_kill(state: &AppState, scope: ControlScope, on: bool) -> String {
    match scope {
        ControlScope::Global => {
            state.risk.set_global_kill_switch(on);
            state.supervisor.kill_switches.set_global(on);
            "global".to_string()
        }
        ControlScope::Venue(id) => {
            let venue = Venue::new(id);
            state.risk.set_venue_kill_switch(venue, on);
            state.supervisor.kill_switches.set_venue(venue, on);
            format!("venue:{id}")
        }
    }
}

pub async fn kill(
    State(state): State<AppState>,
    Query(q): Query<ControlScopeQuery>,
) -> Json<ControlResponse> {
    match ControlScope::parse(&q.scope) {
        Ok(scope) => {
            let label = apply_kill(&state, scope, true);
            Json(ControlResponse { ok: true, detail: format!("killed {label}") })
        }
        Err(detail) => Json(ControlResponse { ok: false, detail }),
    }
}

pub async fn resume(
    State(state): State<AppState>,
    Query(q): Query<ControlScopeQuery>,
) -> Json<ControlResponse> {
    match ControlScope::parse(&q.scope) {
        Ok(scope) => {
            let label = apply_kill(&state, scope, false);
            Json(ControlResponse { ok: true, detail: format!("resumed {label}") })
        }
        Err(detail) => Json(ControlResponse { ok: false, detail }),
    }
}

pub async fn set_mode(
    State(state): State<AppState>,
    Json(req): Json<SetModeRequest>,
) -> Json<ControlResponse> {
    state.risk.set_mode(req.mode);
    Json(ControlResponse { ok: true, detail: format!("mode set to {:?}", req.mode) })
}

/// Manual-override toggle: lets an operator push a job through a daily
/// loss-limit reject (§4.4 `manual_override`) and resets the
/// auto-halt streak when disengaged.
pub async fn set_override(
    State(state): State<AppState>,
    Json(req): Json<SetOverrideRequest>,
) -> Json<ControlResponse> {
    state.risk.set_auto_halt(!req.enabled && state.risk.consecutive_failures() > 0);
    if req.enabled {
        state.risk.reset_auto_halt();
    }
    Json(ControlResponse {
        ok: true,
        detail: format!("override enabled={}", req.enabled),
    })
}
