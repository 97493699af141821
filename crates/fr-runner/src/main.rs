//! # fr-runner
//!
//! Main entry point for the funding-rate monitor.
//!
//! Loads a JSON configuration file, starts one connection supervisor per
//! configured source, and runs until interrupted. Alert-worthy batches are
//! written to the log; real alerting and persistence consumers live in the
//! surrounding application and register through the same [`Consumer`] trait.
//!
//! # Usage
//!
//! ```bash
//! fr-runner config.json --log-level info
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use fr_core::types::FundingEvent;
use fr_feed::Consumer;
use fr_feed::monitor::Monitor;
use tracing::info;

/// Real-time funding-rate monitor.
#[derive(Parser)]
#[command(name = "fr-runner", about = "Real-time funding-rate monitor")]
struct Cli {
    /// Configuration file path (JSON).
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error); defaults to
    /// the config file's `log_level`.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Optional log directory for file output.
    #[arg(long)]
    log_dir: Option<String>,
}

/// Consumer that writes alert batches to the log.
struct LogConsumer;

#[async_trait]
impl Consumer for LogConsumer {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, batch: &[FundingEvent]) -> Result<()> {
        for ev in batch {
            info!(
                "ALERT {} @ {}: rate {:.4}% apr {:.2}% change {:.1}%",
                ev.symbol, ev.source, ev.rate, ev.annualized_rate, ev.change_magnitude
            );
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = fr_core::config::load_config(&cli.config)?;

    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let log_dir = cli.log_dir.clone().or_else(|| config.log_dir.clone());
    fr_core::logging::init_logging(&log_level, log_dir.as_deref(), "fr-runner");

    info!(
        "fr-runner starting — config={}, {} source(s)",
        cli.config.display(),
        config.sources.len()
    );

    let mut monitor = Monitor::new(config);
    monitor.add_consumer(Arc::new(LogConsumer));
    monitor.start()?;

    info!("monitor running — press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    monitor.stop().await;

    let stats = monitor.stats();
    info!(
        "final stats — events: {}, alerts: {}, lost connections: {}, failed sources: {}",
        stats.total_events, stats.alerts_sent, stats.lost_connections, stats.failed_sources
    );
    Ok(())
}
