//! # fr-feed
//!
//! The real-time funding-rate pipeline: per-exchange source modules feeding
//! a shared significance filter and a bounded dispatch queue, orchestrated
//! by [`monitor::Monitor`].
//!
//! ## Data flow
//!
//! ```text
//! wire payload -> sources::<exchange>::parse -> FundingEvent
//!              -> filter::SignificanceFilter -> queue::EventSender
//!              -> monitor consumer loop -> registered Consumer callbacks
//! ```
//!
//! ## Shared infrastructure
//!
//! - [`sources`] — per-exchange `SourceDef` builders and parsers
//! - [`registry`] — `Source` → `SourceDef` factory
//! - [`filter`] — last-reading significance filter
//! - [`queue`] — bounded batch queue
//! - [`supervisor`] — per-source connection state machine
//! - [`monitor`] — orchestrator, statistics, sweep

pub mod filter;
pub mod json_util;
pub mod monitor;
pub mod queue;
pub mod registry;
pub mod sources;
pub mod supervisor;

use anyhow::Result;
use async_trait::async_trait;
use fr_core::types::FundingEvent;

/// Callback interface for downstream consumers (alerting, persistence).
///
/// Invoked by the orchestrator with non-empty, ordered batches of
/// alert-worthy events. Implementations may perform I/O; a returned error is
/// logged at the orchestrator boundary and never stops future dispatch.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Human-readable consumer name, used in error logs.
    fn name(&self) -> &str;

    /// Deliver one batch.
    async fn deliver(&self, batch: &[FundingEvent]) -> Result<()>;
}
