//! WebSocket transport helpers.
//!
//! The connection supervisor in `fr-feed` owns the state machine; this
//! module only knows how to open a TLS connection with the configured frame
//! limits and how each exchange expects to be pinged.

use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_with_config};
use tracing::debug;

/// A connected (possibly TLS) WebSocket stream.
pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Keep-alive ping format — varies by exchange.
#[derive(Debug, Clone)]
pub enum PingPayload {
    /// Send a text frame (OKX and Bitget expect the literal `"ping"`).
    Text(String),
    /// Send a JSON object as text (Bybit expects `{"op":"ping"}`).
    Json(serde_json::Value),
    /// Use the standard WebSocket ping frame.
    WebSocketPing,
}

/// Open a WebSocket connection with the configured payload-size limits.
///
/// `max_frame_bytes` bounds both frame and message size so a misbehaving
/// source cannot grow the read buffer without limit.
pub async fn connect(url: &str, max_frame_bytes: usize) -> anyhow::Result<WsStream> {
    let ws_config = WebSocketConfig::default()
        .max_message_size(Some(max_frame_bytes))
        .max_frame_size(Some(max_frame_bytes));

    let (stream, response) = connect_async_with_config(url, Some(ws_config), false).await?;
    debug!("websocket connected: {url} (status {})", response.status());
    Ok(stream)
}
