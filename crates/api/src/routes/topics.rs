//! Topic lifecycle endpoints: list, create, delete.

use crate::routes::broker_error;
use crate::server::AppState;
use crate::types::{
    CreateTopicRequest, ErrorResponse, LifecycleResponse, TopicSummary, TopicsResponse,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use relaymq_common::ErrorCode;
use tracing::{info, instrument};

#[instrument(skip(state))]
pub async fn list_topics(State(state): State<AppState>) -> Json<TopicsResponse> {
    let topics = state
        .broker
        .list_topics()
        .into_iter()
        .map(|summary| TopicSummary {
            name: summary.name,
            subscribers: summary.subscribers,
        })
        .collect();
    Json(TopicsResponse { topics })
}

/// `POST /topics`: 201 on creation, 409 when the name is taken, 400 on a
/// missing name or undecodable body.
#[instrument(skip(state, payload))]
pub async fn create_topic(
    State(state): State<AppState>,
    payload: Result<Json<CreateTopicRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LifecycleResponse>), (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("invalid request body: {rejection}"),
                code: ErrorCode::BadRequest,
            }),
        )
    })?;

    state
        .broker
        .create_topic(&request.name)
        .map_err(broker_error)?;

    info!(topic = %request.name, "topic created");
    Ok((
        StatusCode::CREATED,
        Json(LifecycleResponse {
            status: "created".to_string(),
            topic: request.name,
        }),
    ))
}

/// `DELETE /topics/{name}`: notifies subscribers before the record goes.
#[instrument(skip(state))]
pub async fn delete_topic(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<LifecycleResponse>, (StatusCode, Json<ErrorResponse>)> {
    state.broker.delete_topic(&name).map_err(broker_error)?;

    info!(topic = %name, "topic deleted");
    Ok(Json(LifecycleResponse {
        status: "deleted".to_string(),
        topic: name,
    }))
}
