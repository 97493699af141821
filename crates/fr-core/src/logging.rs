//! Logging initialization using the `tracing` ecosystem.
//!
//! Provides console output (colored, human-readable) and optional file
//! output with daily rotation via `tracing-appender`. The level comes from
//! the `RUST_LOG` env var when set, otherwise from the config/CLI value.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// Call once at program start; panics on double initialization.
///
/// - `log_level`: default level if `RUST_LOG` is not set (e.g. `"info"`)
/// - `log_dir`: optional directory for daily-rotating log files
/// - `prefix`: log file name prefix (e.g. `"fr-monitor"`)
pub fn init_logging(log_level: &str, log_dir: Option<&str>, prefix: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let console_layer = fmt::layer().with_target(true).with_ansi(true);

    if let Some(dir) = log_dir {
        let file_appender = tracing_appender::rolling::daily(dir, prefix);
        let file_layer =
            fmt::layer().with_writer(file_appender).with_ansi(false).with_target(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry().with(env_filter).with(console_layer).init();
    }
}
