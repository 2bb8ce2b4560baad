use crate::server::AppState;
use crate::types::{StatsResponse, TopicStats};
use axum::{extract::State, Json};
use tracing::instrument;

/// `GET /stats`: per-topic message and subscriber counters.
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let topics = state
        .broker
        .stats()
        .into_iter()
        .map(|(name, stats)| {
            (
                name,
                TopicStats {
                    messages: stats.messages,
                    subscribers: stats.subscribers,
                },
            )
        })
        .collect();
    Json(StatsResponse { topics })
}
