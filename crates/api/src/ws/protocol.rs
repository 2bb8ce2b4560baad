//! Per-connection protocol state machine.
//!
//! Decodes inbound text frames, validates their shape, dispatches to the
//! broker, and answers through the session's dispatcher so responses and
//! events share one ordered outbound stream.

use relaymq_broker::{Broker, Dispatcher};
use relaymq_common::{AckStatus, BrokerError, ClientFrame, ErrorCode, ServerFrame};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct ProtocolHandler {
    broker: Arc<Broker>,
    dispatcher: Dispatcher,
    /// Provisional at accept; replaced by the id the client supplies on its
    /// first subscribe.
    client_id: String,
}

impl ProtocolHandler {
    /// Attaches a fresh provisional session bound to `dispatcher`.
    pub fn new(broker: Arc<Broker>, dispatcher: Dispatcher) -> Self {
        let client_id = Uuid::new_v4().to_string();
        broker.attach(&client_id, dispatcher.clone());
        Self {
            broker,
            dispatcher,
            client_id,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Handles one inbound text frame. Never fails the connection: every
    /// problem is answered with an error frame and the session stays open.
    pub fn handle_text(&mut self, text: &str) {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(_) => {
                self.send_error(None, ErrorCode::BadRequest, "invalid JSON");
                return;
            }
        };

        // Recover the request id before typed decoding so shape errors can
        // still be correlated by the client.
        let request_id = value
            .get("request_id")
            .and_then(|id| id.as_str())
            .map(str::to_string);

        let frame: ClientFrame = match serde_json::from_value(value) {
            Ok(frame) => frame,
            Err(error) => {
                self.send_error(request_id, ErrorCode::BadRequest, error.to_string());
                return;
            }
        };

        match frame {
            ClientFrame::Subscribe {
                topic,
                client_id,
                last_n,
                request_id,
            } => self.handle_subscribe(topic, client_id, last_n, request_id),
            ClientFrame::Unsubscribe {
                topic,
                client_id,
                request_id,
            } => self.handle_unsubscribe(topic, client_id, request_id),
            ClientFrame::Publish {
                topic,
                message,
                request_id,
            } => self.handle_publish(topic, message, request_id),
            ClientFrame::Ping { request_id } => {
                self.send(ServerFrame::pong(request_id));
            }
        }
    }

    /// Tears the session down on disconnect, dropping every membership.
    pub fn finish(&self) {
        self.broker.release(&self.client_id, &self.dispatcher);
        debug!(client_id = %self.client_id, "protocol handler finished");
    }

    fn handle_subscribe(
        &mut self,
        topic: String,
        client_id: String,
        last_n: usize,
        request_id: Option<String>,
    ) {
        if topic.is_empty() || client_id.is_empty() {
            self.send_error(
                request_id,
                ErrorCode::BadRequest,
                "missing required fields: topic or client_id",
            );
            return;
        }

        if client_id != self.client_id {
            // The client-supplied id supersedes the current binding; state
            // under the old id is discarded.
            self.broker.release(&self.client_id, &self.dispatcher);
            self.broker.attach(&client_id, self.dispatcher.clone());
            debug!(
                old = %self.client_id,
                new = %client_id,
                "session rebound to client-supplied id"
            );
            self.client_id = client_id.clone();
        }

        match self.broker.subscribe(&client_id, &topic, last_n) {
            Ok(()) => self.send(ServerFrame::ack(request_id, topic, AckStatus::Subscribed)),
            Err(error) => self.send_broker_error(request_id, error),
        }
    }

    fn handle_unsubscribe(&mut self, topic: String, client_id: String, request_id: Option<String>) {
        if topic.is_empty() || client_id.is_empty() {
            self.send_error(
                request_id,
                ErrorCode::BadRequest,
                "missing required fields: topic or client_id",
            );
            return;
        }

        match self.broker.unsubscribe(&client_id, &topic) {
            Ok(()) => self.send(ServerFrame::ack(request_id, topic, AckStatus::Unsubscribed)),
            Err(error) => self.send_broker_error(request_id, error),
        }
    }

    fn handle_publish(
        &mut self,
        topic: String,
        message: serde_json::Value,
        request_id: Option<String>,
    ) {
        if topic.is_empty() || message.is_null() {
            self.send_error(
                request_id,
                ErrorCode::BadRequest,
                "missing required fields: topic or message",
            );
            return;
        }

        match self.broker.publish(&topic, message) {
            Ok(()) => self.send(ServerFrame::ack(request_id, topic, AckStatus::Published)),
            Err(error) => self.send_broker_error(request_id, error),
        }
    }

    fn send(&self, frame: ServerFrame) {
        if !self.dispatcher.enqueue(frame) {
            warn!(client_id = %self.client_id, "dropping response for closed session");
        }
    }

    fn send_broker_error(&self, request_id: Option<String>, error: BrokerError) {
        let code = error.code();
        self.send(ServerFrame::error(request_id, code, error.to_string()));
    }

    fn send_error(&self, request_id: Option<String>, code: ErrorCode, message: impl Into<String>) {
        self.send(ServerFrame::error(request_id, code, message));
    }
}
