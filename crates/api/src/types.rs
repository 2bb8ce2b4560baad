//! Request and response bodies for the control plane.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `POST /topics`.
#[derive(Debug, Deserialize)]
pub struct CreateTopicRequest {
    pub name: String,
}

/// One row of `GET /topics`.
#[derive(Debug, Serialize)]
pub struct TopicSummary {
    pub name: String,
    pub subscribers: usize,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    pub topics: Vec<TopicSummary>,
}

/// Acknowledgement of a create or delete.
#[derive(Debug, Serialize)]
pub struct LifecycleResponse {
    pub status: String,
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub uptime_sec: u64,
    pub topics: usize,
    /// Subscriptions summed across topics, with multiplicity.
    pub subscribers: usize,
}

#[derive(Debug, Serialize)]
pub struct TopicStats {
    pub messages: u64,
    pub subscribers: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub topics: HashMap<String, TopicStats>,
}

/// Error body shared by every non-2xx control-plane response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: relaymq_common::ErrorCode,
}
