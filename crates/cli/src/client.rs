//! Thin HTTP client for the control plane.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct TopicSummary {
    pub name: String,
    pub subscribers: usize,
}

#[derive(Debug, Deserialize)]
pub struct TopicsResponse {
    pub topics: Vec<TopicSummary>,
}

#[derive(Debug, Deserialize)]
pub struct LifecycleResponse {
    pub status: String,
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub uptime_sec: u64,
    pub topics: usize,
    pub subscribers: usize,
}

#[derive(Debug, Deserialize)]
pub struct TopicStats {
    pub messages: u64,
    pub subscribers: usize,
}

#[derive(Debug, Deserialize)]
pub struct StatsResponse {
    pub topics: HashMap<String, TopicStats>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn list_topics(&self) -> Result<TopicsResponse> {
        let response = self.http.get(self.url("/topics")).send().await?;
        Self::decode(response).await
    }

    pub async fn create_topic(&self, name: &str) -> Result<LifecycleResponse> {
        let response = self
            .http
            .post(self.url("/topics"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn delete_topic(&self, name: &str) -> Result<LifecycleResponse> {
        let response = self
            .http
            .delete(self.url(&format!("/topics/{name}")))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.http.get(self.url("/health")).send().await?;
        Self::decode(response).await
    }

    pub async fn stats(&self) -> Result<StatsResponse> {
        let response = self.http.get(self.url("/stats")).send().await?;
        Self::decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        Err(anyhow!("server error ({status}): {message}"))
    }
}
