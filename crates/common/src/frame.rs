//! Wire protocol for the `/ws` session surface.
//!
//! Frames are JSON text in both directions. Inbound frames carry a `type`
//! discriminator plus an optional `request_id` that is echoed verbatim in the
//! response; outbound frames are acks, pongs, errors, live events, and
//! topic-lifecycle info notices.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Notice sent to subscribers when their topic is removed.
pub const TOPIC_DELETED: &str = "topic_deleted";

/// Current wall-clock time as ISO-8601 UTC with a trailing `Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A request frame sent by a client over the WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Join a topic, optionally replaying the last `last_n` events.
    Subscribe {
        topic: String,
        client_id: String,
        #[serde(default)]
        last_n: usize,
        #[serde(default)]
        request_id: Option<String>,
    },
    /// Leave a topic.
    Unsubscribe {
        topic: String,
        client_id: String,
        #[serde(default)]
        request_id: Option<String>,
    },
    /// Publish a message object to every subscriber of a topic.
    Publish {
        topic: String,
        message: serde_json::Value,
        #[serde(default)]
        request_id: Option<String>,
    },
    /// Liveness probe; answered with a pong.
    Ping {
        #[serde(default)]
        request_id: Option<String>,
    },
}

/// Result reported in a successful ack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Subscribed,
    Unsubscribed,
    Published,
}

/// Machine-readable error codes carried on both surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    TopicNotFound,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

/// The server-wrapped form of a published message.
///
/// Built once per successful publish and shared by `Arc` between the topic
/// history and every subscriber queue, so all recipients observe an
/// identical `topic`/`message`/`ts` triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub topic: String,
    pub message: serde_json::Value,
    pub ts: String,
}

/// A frame sent by the server over the WebSocket.
///
/// `request_id` fields are always present on responses, serialized as
/// `null` when the inbound frame carried none (or could not be parsed).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    Ack {
        request_id: Option<String>,
        topic: String,
        status: AckStatus,
        ts: String,
    },
    Pong {
        request_id: Option<String>,
        ts: String,
    },
    Error {
        request_id: Option<String>,
        error: ErrorBody,
        ts: String,
    },
    Event(Arc<EventEnvelope>),
    Info {
        topic: String,
        msg: String,
        ts: String,
    },
}

impl ServerFrame {
    pub fn ack(request_id: Option<String>, topic: impl Into<String>, status: AckStatus) -> Self {
        ServerFrame::Ack {
            request_id,
            topic: topic.into(),
            status,
            ts: timestamp(),
        }
    }

    pub fn pong(request_id: Option<String>) -> Self {
        ServerFrame::Pong {
            request_id,
            ts: timestamp(),
        }
    }

    pub fn error(request_id: Option<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        ServerFrame::Error {
            request_id,
            error: ErrorBody {
                code,
                message: message.into(),
            },
            ts: timestamp(),
        }
    }

    pub fn topic_deleted(topic: impl Into<String>) -> Self {
        ServerFrame::Info {
            topic: topic.into(),
            msg: TOPIC_DELETED.to_string(),
            ts: timestamp(),
        }
    }
}

/// Checks the shape required of a published `message`: an object carrying a
/// UUID string `id` and a `payload` of any JSON type.
pub fn validate_publish_message(message: &serde_json::Value) -> std::result::Result<(), String> {
    let obj = match message.as_object() {
        Some(obj) => obj,
        None => return Err("message must be a JSON object".to_string()),
    };

    match obj.get("id").and_then(|id| id.as_str()) {
        Some(id) if uuid::Uuid::parse_str(id).is_ok() => {}
        Some(_) => return Err("message.id must be a UUID".to_string()),
        None => return Err("message must contain a string field 'id'".to_string()),
    }

    if !obj.contains_key("payload") {
        return Err("message must contain a field 'payload'".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_subscribe_with_defaults() {
        let frame: ClientFrame = serde_json::from_str(
            r#"{"type":"subscribe","topic":"weather","client_id":"11111111-1111-1111-1111-111111111111"}"#,
        )
        .unwrap();

        match frame {
            ClientFrame::Subscribe {
                topic,
                client_id,
                last_n,
                request_id,
            } => {
                assert_eq!(topic, "weather");
                assert_eq!(client_id, "11111111-1111-1111-1111-111111111111");
                assert_eq!(last_n, 0);
                assert!(request_id.is_none());
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_type() {
        let err = serde_json::from_str::<ClientFrame>(r#"{"type":"halt"}"#).unwrap_err();
        assert!(err.to_string().contains("halt"));
    }

    #[test]
    fn rejects_missing_required_field() {
        assert!(serde_json::from_str::<ClientFrame>(
            r#"{"type":"publish","topic":"weather"}"#
        )
        .is_err());
    }

    #[test]
    fn ack_serializes_null_request_id() {
        let frame = ServerFrame::ack(None, "weather", AckStatus::Published);
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "ack");
        assert_eq!(value["status"], "published");
        assert!(value["request_id"].is_null());
    }

    #[test]
    fn event_frame_inlines_envelope() {
        let envelope = Arc::new(EventEnvelope {
            topic: "weather".to_string(),
            message: json!({"id": "22222222-2222-2222-2222-222222222222", "payload": {"t": 20}}),
            ts: timestamp(),
        });
        let value = serde_json::to_value(ServerFrame::Event(envelope)).unwrap();
        assert_eq!(value["type"], "event");
        assert_eq!(value["topic"], "weather");
        assert_eq!(value["message"]["payload"]["t"], 20);
    }

    #[test]
    fn error_codes_use_wire_spelling() {
        let value = serde_json::to_value(ErrorCode::TopicNotFound).unwrap();
        assert_eq!(value, "TOPIC_NOT_FOUND");
    }

    #[test]
    fn timestamps_are_utc_with_z_suffix() {
        let ts = timestamp();
        assert!(ts.ends_with('Z'), "expected trailing Z: {ts}");
        assert!(!ts.contains("+00:00"));
    }

    #[test]
    fn validates_publish_message_shape() {
        let ok = json!({"id": "22222222-2222-2222-2222-222222222222", "payload": {}});
        assert!(validate_publish_message(&ok).is_ok());

        let bad_id = json!({"id": "not-a-uuid", "payload": {}});
        assert!(validate_publish_message(&bad_id).is_err());

        let no_payload = json!({"id": "22222222-2222-2222-2222-222222222222"});
        assert!(validate_publish_message(&no_payload).is_err());

        assert!(validate_publish_message(&json!("scalar")).is_err());
    }
}
