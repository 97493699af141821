//! Bounded dispatch queue between supervisors and the consumer loop.
//!
//! Backpressure policy: the queue is bounded and enqueue never blocks a
//! supervisor's receive loop. When the queue is full the **newest arrival is
//! dropped** with a warning — ingestion keeps running and the consumer works
//! through the backlog.

use std::time::Duration;

use fr_core::types::FundingEvent;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Create a bounded dispatch queue.
pub fn bounded(capacity: usize) -> (EventSender, BatchReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender { tx }, BatchReceiver { rx })
}

/// Producer half, cloned into every connection supervisor.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<FundingEvent>,
}

impl EventSender {
    /// Enqueue without blocking; drops the event if the queue is full.
    pub fn push(&self, event: FundingEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(ev)) => {
                warn!("dispatch queue full — dropping {} from {}", ev.symbol, ev.source);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("dispatch queue closed");
            }
        }
    }
}

/// Consumer half, owned by the orchestrator's consumer loop.
pub struct BatchReceiver {
    rx: mpsc::Receiver<FundingEvent>,
}

impl BatchReceiver {
    /// Receive the next batch of up to `max` events.
    ///
    /// Waits up to `poll` for the first event, then drains whatever else is
    /// immediately available. Returns `Some(vec![])` on an idle poll and
    /// `None` once every sender is gone and the queue is drained.
    pub async fn next_batch(&mut self, max: usize, poll: Duration) -> Option<Vec<FundingEvent>> {
        let first = match tokio::time::timeout(poll, self.rx.recv()).await {
            Err(_) => return Some(Vec::new()),
            Ok(None) => return None,
            Ok(Some(ev)) => ev,
        };

        let mut batch = Vec::with_capacity(max);
        batch.push(first);
        while batch.len() < max {
            match self.rx.try_recv() {
                Ok(ev) => batch.push(ev),
                Err(_) => break,
            }
        }
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fr_core::types::Source;

    fn ev(symbol: &str, at_us: u64) -> FundingEvent {
        FundingEvent::new(symbol.into(), 0.06, None, Source::Bybit, at_us).unwrap()
    }

    #[tokio::test]
    async fn batches_preserve_order_and_respect_max() {
        let (tx, mut rx) = bounded(64);
        for i in 0..15 {
            tx.push(ev(&format!("SYM{i:02}"), i));
        }
        let batch = rx.next_batch(10, Duration::from_millis(50)).await.unwrap();
        assert_eq!(batch.len(), 10);
        assert_eq!(batch[0].symbol, "SYM00");
        assert_eq!(batch[9].symbol, "SYM09");

        let rest = rx.next_batch(10, Duration::from_millis(50)).await.unwrap();
        assert_eq!(rest.len(), 5);
    }

    #[tokio::test]
    async fn full_queue_drops_newest() {
        let (tx, mut rx) = bounded(2);
        tx.push(ev("AA", 0));
        tx.push(ev("BB", 1));
        tx.push(ev("CC", 2)); // dropped, queue full

        let batch = rx.next_batch(10, Duration::from_millis(50)).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].symbol, "AA");
        assert_eq!(batch[1].symbol, "BB");
    }

    #[tokio::test]
    async fn idle_poll_returns_empty_batch() {
        let (_tx, mut rx) = bounded(4);
        let batch = rx.next_batch(10, Duration::from_millis(10)).await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn closed_and_drained_returns_none() {
        let (tx, mut rx) = bounded(4);
        tx.push(ev("AA", 0));
        drop(tx);
        let batch = rx.next_batch(10, Duration::from_millis(10)).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert!(rx.next_batch(10, Duration::from_millis(10)).await.is_none());
    }
}
