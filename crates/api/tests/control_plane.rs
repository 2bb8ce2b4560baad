//! Control-plane tests driving the full router through tower's oneshot.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use relaymq_api::{AppState, RelayServer};
use relaymq_common::SystemConfig;
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn server() -> (Router, AppState) {
    let server = RelayServer::new(SystemConfig::default());
    let state = server.state();
    (server.router(), state)
}

async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn create_list_and_conflict() {
    let (router, _) = server();

    let (status, body) = request(&router, "POST", "/topics", Some(json!({"name": "weather"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"status": "created", "topic": "weather"}));

    let (status, body) = request(&router, "POST", "/topics", Some(json!({"name": "weather"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("weather"));

    let (status, body) = request(&router, "GET", "/topics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"topics": [{"name": "weather", "subscribers": 0}]})
    );
}

#[tokio::test]
async fn create_rejects_bad_bodies() {
    let (router, _) = server();

    let (status, body) = request(&router, "POST", "/topics", Some(json!({"nome": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = request(&router, "POST", "/topics", Some(json!({"name": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Undecodable body.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/topics")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_then_not_found() {
    let (router, _) = server();
    request(&router, "POST", "/topics", Some(json!({"name": "weather"}))).await;

    let (status, body) = request(&router, "DELETE", "/topics/weather", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "deleted", "topic": "weather"}));

    let (status, body) = request(&router, "DELETE", "/topics/weather", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "TOPIC_NOT_FOUND");
}

#[tokio::test]
async fn health_and_stats_reflect_broker_state() {
    let (router, state) = server();
    request(&router, "POST", "/topics", Some(json!({"name": "weather"}))).await;

    let dispatcher = state.broker.dispatcher();
    state.broker.attach("c1", dispatcher);
    state.broker.subscribe("c1", "weather", 0).unwrap();
    state
        .broker
        .publish(
            "weather",
            json!({"id": "00000000-0000-4000-8000-000000000001", "payload": {"t": 20}}),
        )
        .unwrap();

    let (status, body) = request(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topics"], 1);
    assert_eq!(body["subscribers"], 1);
    assert!(body["uptime_sec"].is_u64());

    let (status, body) = request(&router, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"topics": {"weather": {"messages": 1, "subscribers": 1}}})
    );
}
