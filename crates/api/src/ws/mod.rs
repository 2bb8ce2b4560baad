//! The `/ws` endpoint: connection accept, reader loop, and the single
//! writer task that drains the session's dispatcher onto the socket.

pub mod protocol;

pub use protocol::ProtocolHandler;

use crate::server::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use relaymq_broker::Dispatcher;
use std::time::Duration;
use tracing::{debug, error, info};

/// How long teardown waits for the writer to flush before abandoning it.
const WRITER_SHUTDOWN: Duration = Duration::from_secs(5);

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| client_session(state, socket))
}

/// Runs one connection: the reader loop lives here, the writer is spawned,
/// and connection close is the sole cancellation signal for both.
async fn client_session(state: AppState, socket: WebSocket) {
    let (sink, mut stream) = socket.split();
    let dispatcher = state.broker.dispatcher();
    let mut handler = ProtocolHandler::new(state.broker.clone(), dispatcher.clone());
    info!(client_id = %handler.client_id(), "websocket session opened");

    let writer = tokio::spawn(write_frames(sink, dispatcher.clone()));

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => handler.handle_text(&text),
            Ok(Message::Close(_)) => break,
            // The surface is text-only; binary and transport pings are ignored.
            Ok(_) => {}
            Err(error) => {
                debug!(error = %error, "websocket read failed");
                break;
            }
        }
    }

    handler.finish();
    dispatcher.close();

    let abort = writer.abort_handle();
    if tokio::time::timeout(WRITER_SHUTDOWN, writer).await.is_err() {
        abort.abort();
    }
    info!(client_id = %handler.client_id(), "websocket session closed");
}

/// The session's single writer: serializes dispatcher batches onto the
/// socket in enqueue order. A transport failure closes the dispatcher and
/// ends the session with no redelivery.
async fn write_frames(mut sink: SplitSink<WebSocket, Message>, dispatcher: Dispatcher) {
    let mut buf = Vec::new();
    while dispatcher.next_batch(&mut buf).await {
        for frame in buf.drain(..) {
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(err) => {
                    error!(error = %err, "failed to encode outbound frame");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                dispatcher.close();
                return;
            }
        }
    }
    let _ = sink.close().await;
}
