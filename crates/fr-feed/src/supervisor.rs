//! Connection supervisor — one task per source.
//!
//! Runs the connect → subscribe → receive-loop → reconnect state machine for
//! a single exchange feed. Each supervisor is independent: a reconnect storm
//! on one source never delays another, and nothing that happens here can
//! terminate the orchestrator or a sibling task.

use std::sync::Arc;
use std::time::Duration;

use fr_core::config::WsSettings;
use fr_core::ws::{self, PingPayload};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::filter::SignificanceFilter;
use crate::monitor::MonitorStats;
use crate::queue::EventSender;
use crate::sources::SourceDef;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Subscribing,
    Streaming,
    Reconnecting,
    Failed,
}

impl std::fmt::Display for ConnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Subscribing => "subscribing",
            Self::Streaming => "streaming",
            Self::Reconnecting => "reconnecting",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Log and apply a state transition.
fn transition(label: &str, state: &mut ConnState, to: ConnState) {
    if *state != to {
        info!("[{label}] {state} -> {to}");
        *state = to;
    }
}

/// Run the supervisor until shutdown or terminal failure.
///
/// Every received payload goes parser → filter → queue. Terminal failure
/// (retry budget exhausted) stops this source only and is surfaced through
/// `stats`; an explicit shutdown signal closes the transport and exits.
pub async fn run_supervisor(
    def: SourceDef,
    ws_settings: WsSettings,
    filter: Arc<SignificanceFilter>,
    queue: EventSender,
    stats: Arc<MonitorStats>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let label = def.source.to_string();
    let ping_interval = Duration::from_secs(ws_settings.ping_interval_sec);
    let idle_limit = ping_interval + Duration::from_secs(ws_settings.ping_timeout_sec);
    let close_timeout = Duration::from_secs(ws_settings.close_timeout_sec);

    let mut state = ConnState::Disconnected;
    let mut attempts: u32 = 0;

    loop {
        if *shutdown_rx.borrow() {
            transition(&label, &mut state, ConnState::Disconnected);
            return;
        }

        transition(&label, &mut state, ConnState::Connecting);
        info!("[{label}] connecting to {}", def.url);

        let connected = tokio::select! {
            r = ws::connect(&def.url, ws_settings.max_frame_bytes) => r,
            _ = shutdown_rx.changed() => {
                transition(&label, &mut state, ConnState::Disconnected);
                return;
            }
        };

        let stream = match connected {
            Ok(s) => s,
            Err(e) => {
                warn!("[{label}] connect failed: {e}");
                if reconnect_or_fail(
                    &label,
                    &mut state,
                    &mut attempts,
                    &ws_settings,
                    &stats,
                    &mut shutdown_rx,
                )
                .await
                {
                    continue;
                }
                return;
            }
        };

        let (mut ws_write, mut ws_read) = stream.split();

        transition(&label, &mut state, ConnState::Subscribing);
        debug!("[{label}] subscribing: {}", def.subscribe_msg);
        // Not yet counted active, so a failure here is not a lost connection.
        if let Err(e) = ws_write.send(Message::Text(def.subscribe_msg.clone().into())).await {
            error!("[{label}] subscribe send failed: {e}");
            if reconnect_or_fail(
                &label,
                &mut state,
                &mut attempts,
                &ws_settings,
                &stats,
                &mut shutdown_rx,
            )
            .await
            {
                continue;
            }
            return;
        }

        // No ack is awaited — sources do not reliably ack the handshake.
        transition(&label, &mut state, ConnState::Streaming);
        stats.connection_opened();

        let mut last_rx = Instant::now();
        let mut ping_tick = tokio::time::interval_at(Instant::now() + ping_interval, ping_interval);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    let _ = tokio::time::timeout(close_timeout, ws_write.close()).await;
                    stats.connection_closed();
                    transition(&label, &mut state, ConnState::Disconnected);
                    return;
                }

                msg = ws_read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        last_rx = Instant::now();
                        // A healthy stream restores the full retry budget.
                        attempts = 0;
                        handle_payload(&def, &filter, &queue, &stats, &text);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        last_rx = Instant::now();
                        let _ = ws_write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        warn!("[{label}] peer sent close frame");
                        break;
                    }
                    Some(Err(e)) => {
                        error!("[{label}] read error: {e}");
                        break;
                    }
                    None => {
                        warn!("[{label}] stream ended");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Pong / binary — liveness only.
                        last_rx = Instant::now();
                    }
                },

                _ = ping_tick.tick() => {
                    if last_rx.elapsed() > idle_limit {
                        warn!("[{label}] no data for {:?}, dropping connection", last_rx.elapsed());
                        break;
                    }
                    let ping_msg = match &def.ping {
                        Some(PingPayload::Text(t)) => Message::Text(t.clone().into()),
                        Some(PingPayload::Json(j)) => Message::Text(j.to_string().into()),
                        Some(PingPayload::WebSocketPing) | None => Message::Ping(vec![].into()),
                    };
                    if let Err(e) = ws_write.send(ping_msg).await {
                        error!("[{label}] ping send failed: {e}");
                        break;
                    }
                }
            }
        }

        stats.connection_closed();
        stats.record_lost();
        if reconnect_or_fail(&label, &mut state, &mut attempts, &ws_settings, &stats, &mut shutdown_rx)
            .await
        {
            continue;
        }
        return;
    }
}

/// Feed one raw payload through parser → filter → queue.
fn handle_payload(
    def: &SourceDef,
    filter: &SignificanceFilter,
    queue: &EventSender,
    stats: &MonitorStats,
    text: &str,
) {
    for event in (def.parser)(text) {
        if let Some(accepted) = filter.accept(event) {
            stats.record_event();
            queue.push(accepted);
        }
    }
}

/// Enter `Reconnecting` and wait out the fixed delay.
///
/// Returns `true` when the caller should attempt another connection. On a
/// `false` return the terminal state (`Failed` or `Disconnected`) has
/// already been applied and logged.
async fn reconnect_or_fail(
    label: &str,
    state: &mut ConnState,
    attempts: &mut u32,
    ws_settings: &WsSettings,
    stats: &MonitorStats,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> bool {
    transition(label, state, ConnState::Reconnecting);

    *attempts += 1;
    if *attempts >= ws_settings.max_reconnects {
        error!("[{label}] retry budget exhausted after {attempts} attempts");
        transition(label, state, ConnState::Failed);
        stats.record_failed_source();
        return false;
    }

    let delay = Duration::from_secs(ws_settings.reconnect_delay_sec);
    info!(
        "[{label}] reconnecting in {delay:?} (attempt {attempts}/{})",
        ws_settings.max_reconnects
    );
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = shutdown_rx.changed() => {
            transition(label, state, ConnState::Disconnected);
            false
        }
    }
}
