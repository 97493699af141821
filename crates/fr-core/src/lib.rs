//! # fr-core
//!
//! Core crate for the funding-rate monitor, providing:
//!
//! - **Types** (`types`) — the canonical [`FundingEvent`], source enum,
//!   symbol normalization, major-coin denylist
//! - **Configuration** (`config`) — JSON config deserialization with defaults
//! - **Error types** (`error`) — domain-specific `FeedError` via thiserror
//! - **WebSocket** (`ws`) — transport connect helper and ping formats
//! - **Time utilities** (`time_util`) — epoch-microsecond timestamps
//! - **Logging** (`logging`) — tracing-based structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod time_util;
pub mod types;
pub mod ws;

// Re-export types at crate root for convenience.
pub use types::*;
