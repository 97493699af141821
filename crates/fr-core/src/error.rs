//! Typed error definitions for the funding-rate monitor.
//!
//! Provides [`FeedError`] for domain-specific errors that are more informative
//! than plain `anyhow::Error` strings. All variants implement `std::error::Error`
//! via `thiserror`, so they integrate seamlessly with `anyhow::Result`.

use thiserror::Error;

/// Domain-specific errors for the funding-rate monitor.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// WebSocket connection, handshake, or communication error.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Payload parsing error.
    #[error("parse error: {0}")]
    Parse(String),

    /// A reading that violates the canonical event invariants
    /// (bad symbol, out-of-range rate, denylisted ticker).
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Dispatch queue error.
    #[error("queue error: {0}")]
    Queue(String),
}
