//! `GET /health` (§6: "snapshot of per-venue health, latency, error
//! streak, state").

use crate::dto::{ConnectionHealthView, HealthResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::response::Json;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state
        .supervisor
        .health_snapshot()
        .into_iter()
        .map(|(venue, role, health)| ConnectionHealthView {
            venue: venue.to_string(),
            role: format!("{role:?}"),
            state: format!("{:?}", health.state),
            error_streak: health.error_streak,
            last_heartbeat_ms: health.last_heartbeat.as_millis(),
            health_score: health.health_score(),
        })
        .collect();
    Json(HealthResponse { connections })
}
