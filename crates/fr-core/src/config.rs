//! Configuration parsing for the funding-rate monitor.
//!
//! All components read their settings from a single JSON config file. Every
//! section except `sources` is optional and falls back to the defaults
//! below. Configuration is immutable after startup and shared via `Arc`.
//!
//! # Example config
//!
//! ```json
//! {
//!   "log_level": "info",
//!   "sources": [
//!     { "source": "bybit" },
//!     { "source": "okx", "url": "wss://ws.okx.com:8443/ws/v5/public" }
//!   ],
//!   "websocket": { "max_reconnects": 10, "reconnect_delay_sec": 5 },
//!   "filter": { "min_apr": 50.0, "alert_apr": 100.0 },
//!   "queue": { "capacity": 1024, "batch_size": 10 }
//! }
//! ```

use serde::Deserialize;
use tracing::info;

use crate::error::FeedError;
use crate::types::Source;

fn default_log_level() -> String {
    "info".to_string()
}

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Default log level if `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional directory for daily-rotating log files.
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Sources to monitor — one connection supervisor per entry.
    pub sources: Vec<SourceEntry>,

    /// WebSocket transport settings, shared by all supervisors.
    #[serde(default)]
    pub websocket: WsSettings,

    /// Significance filter and retention settings.
    #[serde(default)]
    pub filter: FilterSettings,

    /// Dispatch queue settings.
    #[serde(default)]
    pub queue: QueueSettings,
}

impl AppConfig {
    /// Validate cross-field constraints not expressible in serde.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.sources.is_empty() {
            return Err(FeedError::Config("no sources configured".into()));
        }
        if self.filter.alert_apr < self.filter.min_apr {
            return Err(FeedError::Config(format!(
                "alert_apr ({}) below min_apr ({})",
                self.filter.alert_apr, self.filter.min_apr
            )));
        }
        Ok(())
    }
}

/// One monitored source.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    /// Exchange identifier: `"binance"`, `"bybit"`, `"okx"`, `"gateio"`, `"bitget"`.
    pub source: Source,

    /// Endpoint override; defaults to the source's public endpoint.
    #[serde(default)]
    pub url: Option<String>,
}

impl SourceEntry {
    /// The endpoint this entry should connect to.
    pub fn endpoint(&self) -> String {
        self.url.clone().unwrap_or_else(|| self.source.default_endpoint().to_string())
    }
}

/// WebSocket transport settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WsSettings {
    /// Interval between keep-alive pings, seconds.
    pub ping_interval_sec: u64,
    /// Grace period after a ping before the connection is considered dead, seconds.
    pub ping_timeout_sec: u64,
    /// Bound on graceful close during shutdown, seconds.
    pub close_timeout_sec: u64,
    /// Maximum inbound frame/message size, bytes.
    pub max_frame_bytes: usize,
    /// Reconnect attempts before the supervisor enters its terminal state.
    pub max_reconnects: u32,
    /// Fixed delay between reconnect attempts, seconds.
    pub reconnect_delay_sec: u64,
}

impl Default for WsSettings {
    fn default() -> Self {
        Self {
            ping_interval_sec: 20,
            ping_timeout_sec: 10,
            close_timeout_sec: 10,
            max_frame_bytes: 1 << 20,
            max_reconnects: 10,
            reconnect_delay_sec: 5,
        }
    }
}

/// Significance filter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Minimum annualized rate (percent) for a reading to be considered at all.
    pub min_apr: f64,
    /// Annualized rate (percent) at or above which a reading is alert-worthy.
    pub alert_apr: f64,
    /// Minimum seconds between accepted readings for one `(symbol, source)`.
    pub min_interval_sec: u64,
    /// Minimum percent change vs. the prior accepted rate to be material.
    pub change_threshold_pct: f64,
    /// Last-reading entries older than this are evicted, seconds.
    pub retention_sec: u64,
    /// How often the eviction sweep runs, seconds.
    pub sweep_interval_sec: u64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_apr: 50.0,
            alert_apr: 100.0,
            min_interval_sec: 60,
            change_threshold_pct: 10.0,
            retention_sec: 3600,
            sweep_interval_sec: 1800,
        }
    }
}

/// Dispatch queue settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Bounded queue capacity. When full, the newest arrival is dropped.
    pub capacity: usize,
    /// Maximum events delivered to the consumer loop per batch.
    pub batch_size: usize,
    /// How long the consumer loop waits for a first event when idle, seconds.
    pub poll_interval_sec: u64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self { capacity: 1024, batch_size: 10, poll_interval_sec: 1 }
    }
}

/// Load and parse a JSON config file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    info!("loaded config from {} ({} source(s))", path.display(), config.sources.len());
    Ok(config)
}
