use crate::frame::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("topic already exists: {0}")]
    TopicExists(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BrokerError {
    /// Wire code surfaced to clients on both the socket and the control
    /// plane. `TopicExists` only occurs on the control plane, where it maps
    /// to a 409 rather than a socket error frame.
    pub fn code(&self) -> ErrorCode {
        match self {
            BrokerError::TopicNotFound(_) => ErrorCode::TopicNotFound,
            BrokerError::TopicExists(_) | BrokerError::BadRequest(_) => ErrorCode::BadRequest,
            BrokerError::Internal(_) => ErrorCode::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, BrokerError>;
