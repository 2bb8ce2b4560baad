use crate::server::AppState;
use crate::types::HealthResponse;
use axum::{extract::State, Json};
use tracing::instrument;

/// `GET /health`: uptime plus table sizes, cheap enough to poll.
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.broker.health();
    Json(HealthResponse {
        uptime_sec: snapshot.uptime_sec,
        topics: snapshot.topics,
        subscribers: snapshot.subscribers,
    })
}
