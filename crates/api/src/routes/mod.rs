//! Control-plane route handlers.

pub mod health;
pub mod stats;
pub mod topics;

use crate::types::ErrorResponse;
use axum::{http::StatusCode, Json};
use relaymq_common::BrokerError;

/// Maps a broker error onto the control-plane status space: 400 for bad
/// requests, 404 for missing topics, 409 for create conflicts, 500 otherwise.
pub(crate) fn broker_error(err: BrokerError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        BrokerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        BrokerError::TopicNotFound(_) => StatusCode::NOT_FOUND,
        BrokerError::TopicExists(_) => StatusCode::CONFLICT,
        BrokerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let code = err.code();
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code,
        }),
    )
}
