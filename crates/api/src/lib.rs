//! # RelayMQ API server
//!
//! HTTP and WebSocket surface over the in-memory broker core.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   Control plane     │ <- /topics, /health, /stats
//! ├─────────────────────┤
//! │   WebSocket /ws     │ <- subscribe / unsubscribe / publish / ping
//! ├─────────────────────┤
//! │   ProtocolHandler   │ <- per-connection frame state machine
//! ├─────────────────────┤
//! │       Broker        │ <- topics, sessions, history, fan-out
//! └─────────────────────┘
//! ```
//!
//! Control-plane requests call the broker directly; socket frames go through
//! the per-connection [`ws::ProtocolHandler`], and everything a session
//! receives is serialized by its single dispatcher writer.

pub mod middleware;
pub mod routes;
pub mod server;
pub mod types;
pub mod ws;

pub use server::{AppState, RelayServer};
pub use types::*;
