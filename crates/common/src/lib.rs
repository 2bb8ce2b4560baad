//! Common types and utilities shared across all crates

pub mod config;
pub mod error;
pub mod frame;
pub mod telemetry;

pub use config::*;
pub use error::{BrokerError, Result};
pub use frame::*;
