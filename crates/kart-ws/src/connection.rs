//! WebSocket connection manager.
//!
//! Owns the single upstream connection: connects, sends the `BcStart`
//! subscription once per open, dispatches frames to a [`FeedHandler`] and
//! reconnects after a fixed delay whenever the connection ends. Retries never
//! stop until [`ConnectionManager::shutdown`] is called.

use crate::error::{WsError, WsResult};
use crate::handler::FeedHandler;
use crate::message::StartRequest;
use futures_util::{SinkExt, StreamExt};
use kart_telemetry::Metrics;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// WebSocket URL (`ws://` or `wss://`).
    pub url: String,
    /// Fixed wait between a disconnect and the next attempt.
    pub reconnect_delay_ms: u64,
    /// Subscription sent immediately after every successful open.
    pub start: StartRequest,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            reconnect_delay_ms: 5000,
            start: StartRequest::new(String::new(), String::new()),
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// WebSocket connection manager.
pub struct ConnectionManager {
    config: ConnectionConfig,
    handler: Arc<dyn FeedHandler>,
    state: Arc<RwLock<ConnectionState>>,
    /// Attempts since the last successful open.
    reconnect_count: Arc<RwLock<u32>>,
    /// Cancellation token for graceful shutdown.
    shutdown_token: CancellationToken,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new(config: ConnectionConfig, handler: Arc<dyn FeedHandler>) -> Self {
        Self {
            config,
            handler,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            reconnect_count: Arc::new(RwLock::new(0)),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Number of reconnect attempts since the last successful open.
    pub fn reconnect_count(&self) -> u32 {
        *self.reconnect_count.read()
    }

    /// Delay applied before every reconnect attempt.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.config.reconnect_delay_ms)
    }

    /// Signal graceful shutdown.
    ///
    /// The connect loop exits at its next check: immediately when waiting
    /// for a reconnect, after sending a Close frame when connected.
    pub fn shutdown(&self) {
        info!("ConnectionManager shutdown requested");
        self.shutdown_token.cancel();
    }

    /// Check if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Connect and keep reconnecting until shutdown.
    ///
    /// Transport failures are logged, never returned.
    pub async fn connect(&self) -> WsResult<()> {
        loop {
            if self.is_shutdown() {
                info!("Shutdown requested, exiting connect loop");
                *self.state.write() = ConnectionState::Disconnected;
                return Ok(());
            }

            *self.state.write() = ConnectionState::Connecting;

            match self.try_connect().await {
                Ok(()) => info!("WebSocket connection closed"),
                Err(e) => error!(error = %e, "WebSocket connection error"),
            }

            // Mark the feed down before waiting so pollers never see a dead
            // socket reported as connected.
            self.handler.on_close();
            Metrics::feed_connected(false);

            if self.is_shutdown() {
                info!("Shutdown requested after disconnect, not reconnecting");
                *self.state.write() = ConnectionState::Disconnected;
                return Ok(());
            }

            let attempt = self.reconnect_count() + 1;
            *self.reconnect_count.write() = attempt;
            *self.state.write() = ConnectionState::Reconnecting;
            Metrics::feed_reconnect();

            let delay = self.reconnect_delay();
            warn!(attempt, delay_ms = delay.as_millis() as u64, "Reconnecting");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested during reconnect wait, exiting");
                    *self.state.write() = ConnectionState::Disconnected;
                    return Ok(());
                }
            }
        }
    }

    async fn try_connect(&self) -> WsResult<()> {
        info!(url = %self.config.url, "Connecting to vendor feed");

        let (ws_stream, _response) = tokio::select! {
            () = self.shutdown_token.cancelled() => return Ok(()),
            result = connect_async_tls_with_config(&self.config.url, None, true, None) => result?,
        };
        let (mut write, mut read) = ws_stream.split();

        *self.state.write() = ConnectionState::Connected;
        *self.reconnect_count.write() = 0;
        info!("WebSocket connected");

        self.handler.on_open();
        Metrics::feed_connected(true);

        // Fire-and-forget: the vendor sends no acknowledgement.
        let start = serde_json::to_string(&self.config.start)?;
        write.send(Message::Text(start)).await?;
        info!(
            client_key = %self.config.start.client_key,
            resource_id = %self.config.start.resource_id,
            "Subscription sent"
        );

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received in message loop");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(error = %e, "Failed to send Close frame during shutdown");
                    }
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handler.on_text(&text);
                        }
                        Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                            Ok(text) => self.handler.on_text(text),
                            Err(e) => {
                                warn!(error = %e, len = data.len(), "Discarding non-UTF-8 binary frame");
                            }
                        },
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping, sending pong");
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "WebSocket closed by server");
                            return Err(WsError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket read error");
                            return Err(e.into());
                        }
                        None => {
                            warn!("WebSocket stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
