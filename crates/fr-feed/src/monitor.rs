//! Monitor orchestrator — lifecycle, dispatch, sweep, statistics.
//!
//! Owns one supervisor task per configured source, the dispatch queue's
//! consumer loop, and the periodic filter-state sweep. All tasks share state
//! only through the significance filter and the dispatch queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use fr_core::config::{AppConfig, FilterSettings};
use fr_core::time_util;
use fr_core::types::FundingEvent;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info};

use crate::filter::SignificanceFilter;
use crate::queue::{self, BatchReceiver};
use crate::registry;
use crate::supervisor::run_supervisor;
use crate::Consumer;

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Aggregate pipeline counters, updated lock-free from every task.
#[derive(Default)]
pub struct MonitorStats {
    total_events: AtomicU64,
    alerts_sent: AtomicU64,
    active_connections: AtomicI64,
    lost_connections: AtomicU64,
    failed_sources: AtomicU64,
    last_update_us: AtomicU64,
}

impl MonitorStats {
    /// One event accepted by the filter and enqueued.
    pub fn record_event(&self) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
    }

    /// `n` alert-worthy events handed to consumers.
    pub fn record_alerts(&self, n: u64) {
        self.alerts_sent.fetch_add(n, Ordering::Relaxed);
    }

    /// A supervisor entered `Streaming`.
    pub fn connection_opened(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// A supervisor left `Streaming`.
    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    /// A live connection was lost.
    pub fn record_lost(&self) {
        self.lost_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// A supervisor exhausted its retry budget.
    pub fn record_failed_source(&self) {
        self.failed_sources.fetch_add(1, Ordering::Relaxed);
    }

    /// Stamp the last-dispatch timestamp.
    pub fn touch_last_update(&self) {
        self.last_update_us.store(time_util::now_us(), Ordering::Relaxed);
    }

    /// Point-in-time view; safe to sample from any task at any time.
    pub fn snapshot(&self, tracked_symbols: usize) -> StatsSnapshot {
        StatsSnapshot {
            total_events: self.total_events.load(Ordering::Relaxed),
            alerts_sent: self.alerts_sent.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            lost_connections: self.lost_connections.load(Ordering::Relaxed),
            failed_sources: self.failed_sources.load(Ordering::Relaxed),
            tracked_symbols,
            last_update_us: self.last_update_us.load(Ordering::Relaxed),
        }
    }
}

/// Read-only statistics record for status/reporting surfaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total_events: u64,
    pub alerts_sent: u64,
    pub active_connections: i64,
    pub lost_connections: u64,
    pub failed_sources: u64,
    pub tracked_symbols: usize,
    pub last_update_us: u64,
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// The pipeline orchestrator.
pub struct Monitor {
    config: Arc<AppConfig>,
    filter: Arc<SignificanceFilter>,
    stats: Arc<MonitorStats>,
    consumers: Vec<Arc<dyn Consumer>>,
    shutdown_tx: Option<watch::Sender<bool>>,
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl Monitor {
    pub fn new(config: AppConfig) -> Self {
        let filter = Arc::new(SignificanceFilter::new(&config.filter));
        Self {
            config: Arc::new(config),
            filter,
            stats: Arc::new(MonitorStats::default()),
            consumers: Vec::new(),
            shutdown_tx: None,
            tasks: Vec::new(),
        }
    }

    /// Register a consumer callback. Must be called before `start`.
    pub fn add_consumer(&mut self, consumer: Arc<dyn Consumer>) {
        self.consumers.push(consumer);
    }

    /// Current statistics snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.filter.tracked_symbols())
    }

    /// Spawn one supervisor per source plus the consumer and sweep tasks.
    pub fn start(&mut self) -> Result<()> {
        if self.shutdown_tx.is_some() {
            return Err(anyhow!("monitor already started"));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (tx, rx) = queue::bounded(self.config.queue.capacity);

        for entry in &self.config.sources {
            let def = registry::build_source(entry);
            self.tasks.push(tokio::spawn(run_supervisor(
                def,
                self.config.websocket.clone(),
                self.filter.clone(),
                tx.clone(),
                self.stats.clone(),
                shutdown_rx.clone(),
            )));
        }
        // The consumer loop detects full shutdown through sender closure, so
        // only supervisors may hold senders.
        drop(tx);

        self.tasks.push(tokio::spawn(consumer_loop(
            rx,
            self.consumers.clone(),
            self.config.clone(),
            self.stats.clone(),
            shutdown_rx.clone(),
        )));

        self.tasks.push(tokio::spawn(sweep_loop(
            self.filter.clone(),
            self.config.filter.clone(),
            shutdown_rx,
        )));

        self.shutdown_tx = Some(shutdown_tx);
        info!("monitor started — {} source(s)", self.config.sources.len());
        Ok(())
    }

    /// Signal shutdown and wait for every task to exit.
    ///
    /// Supervisors close their transports (bounded by the close timeout),
    /// the consumer loop drains the queue, the sweep task stops.
    pub async fn stop(&mut self) {
        let Some(tx) = self.shutdown_tx.take() else {
            return;
        };
        let _ = tx.send(true);
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        info!("monitor stopped");
    }
}

// ---------------------------------------------------------------------------
// Consumer loop
// ---------------------------------------------------------------------------

async fn consumer_loop(
    mut rx: BatchReceiver,
    consumers: Vec<Arc<dyn Consumer>>,
    config: Arc<AppConfig>,
    stats: Arc<MonitorStats>,
    shutdown_rx: watch::Receiver<bool>,
) {
    let batch_size = config.queue.batch_size;
    let poll = Duration::from_secs(config.queue.poll_interval_sec);
    let alert_apr = config.filter.alert_apr;

    info!("dispatch loop started");
    loop {
        match rx.next_batch(batch_size, poll).await {
            // Every supervisor is gone and the queue is drained.
            None => break,
            Some(batch) if batch.is_empty() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
            Some(batch) => dispatch_batch(batch, &consumers, alert_apr, &stats).await,
        }
    }
    info!("dispatch loop exited");
}

/// Split a batch into alert-worthy and tracked-only events and deliver the
/// alerts to every registered consumer.
///
/// A consumer failure is logged and never affects other consumers or future
/// dispatch. Consumers are awaited sequentially, so the same consumer is
/// never invoked concurrently for overlapping batches.
async fn dispatch_batch(
    batch: Vec<FundingEvent>,
    consumers: &[Arc<dyn Consumer>],
    alert_apr: f64,
    stats: &MonitorStats,
) {
    stats.touch_last_update();

    let alerts: Vec<FundingEvent> =
        batch.into_iter().filter(|ev| ev.annualized_rate >= alert_apr).collect();
    if alerts.is_empty() {
        return;
    }

    for ev in &alerts {
        info!(
            "high APR: {} {:.2}% ({}, change {:.1}%)",
            ev.symbol, ev.annualized_rate, ev.source, ev.change_magnitude
        );
    }
    stats.record_alerts(alerts.len() as u64);

    for consumer in consumers {
        if let Err(e) = consumer.deliver(&alerts).await {
            error!("consumer '{}' failed: {e}", consumer.name());
        }
    }
}

// ---------------------------------------------------------------------------
// Sweep loop
// ---------------------------------------------------------------------------

async fn sweep_loop(
    filter: Arc<SignificanceFilter>,
    settings: FilterSettings,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let retention = Duration::from_secs(settings.retention_sec);
    let mut tick = tokio::time::interval(Duration::from_secs(settings.sweep_interval_sec));
    // The first tick completes immediately — skip it.
    tick.tick().await;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let evicted = filter.evict_older_than(time_util::now_us(), retention);
                if evicted > 0 {
                    info!("sweep evicted {evicted} stale filter entries");
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }
}
