//! Mock vendor WebSocket server for integration tests.
//!
//! Provides a simple WebSocket server that can:
//! - Accept connections and count them
//! - Record received messages
//! - Push text, binary or ping frames to every open connection
//! - Close connections cleanly, or drop them without a Close frame

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Instruction sent to every open connection.
#[derive(Debug, Clone)]
pub enum MockCommand {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Close,
    /// Drop the TCP stream without a closing handshake.
    Drop,
}

/// A mock WebSocket server for testing.
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    commands: broadcast::Sender<MockCommand>,
    messages: Arc<Mutex<VecDeque<String>>>,
    pongs: Arc<Mutex<Vec<Vec<u8>>>>,
    connections: Arc<AtomicU32>,
}

impl MockWsServer {
    /// Start a new mock WebSocket server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let messages: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(VecDeque::new()));
        let pongs: Arc<Mutex<Vec<Vec<u8>>>> = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicU32::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (commands, _) = broadcast::channel::<MockCommand>(64);

        let messages_clone = messages.clone();
        let pongs_clone = pongs.clone();
        let connections_clone = connections.clone();
        let commands_clone = commands.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let messages = messages_clone.clone();
                        let pongs = pongs_clone.clone();
                        let connections = connections_clone.clone();
                        let commands = commands_clone.subscribe();
                        tokio::spawn(handle_connection(stream, messages, pongs, connections, commands));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            commands,
            messages,
            pongs,
            connections,
        }
    }

    /// Get the server's WebSocket URL.
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Get the number of connections received.
    pub fn connection_count(&self) -> u32 {
        self.connections.load(Ordering::SeqCst)
    }

    /// Get all received messages.
    pub fn received_messages(&self) -> Vec<String> {
        self.messages.lock().iter().cloned().collect()
    }

    /// Payloads of every pong received.
    pub fn received_pongs(&self) -> Vec<Vec<u8>> {
        self.pongs.lock().clone()
    }

    /// Send a text frame to every open connection.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.commands.send(MockCommand::Text(text.into()));
    }

    /// Send a binary frame to every open connection.
    pub fn send_binary(&self, data: impl Into<Vec<u8>>) {
        let _ = self.commands.send(MockCommand::Binary(data.into()));
    }

    /// Send a ping to every open connection.
    pub fn send_ping(&self, data: impl Into<Vec<u8>>) {
        let _ = self.commands.send(MockCommand::Ping(data.into()));
    }

    /// Drop every open connection without a Close frame.
    pub fn drop_all(&self) {
        let _ = self.commands.send(MockCommand::Drop);
    }

    /// Close every open connection from the server side.
    pub fn close_all(&self) {
        let _ = self.commands.send(MockCommand::Close);
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    messages: Arc<Mutex<VecDeque<String>>>,
    pongs: Arc<Mutex<Vec<Vec<u8>>>>,
    connections: Arc<AtomicU32>,
    mut commands: broadcast::Receiver<MockCommand>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    connections.fetch_add(1, Ordering::SeqCst);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    messages.lock().push_back(text);
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Pong(data))) => {
                    pongs.lock().push(data);
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                _ => {}
            },
            cmd = commands.recv() => match cmd {
                Ok(MockCommand::Text(text)) => {
                    if write.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(MockCommand::Binary(data)) => {
                    if write.send(Message::Binary(data)).await.is_err() {
                        break;
                    }
                }
                Ok(MockCommand::Ping(data)) => {
                    if write.send(Message::Ping(data)).await.is_err() {
                        break;
                    }
                }
                Ok(MockCommand::Close) => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
                Ok(MockCommand::Drop) => break,
                Err(_) => break,
            },
        }
    }
}

/// Poll `check` every 20ms until it returns true or `timeout_ms` elapses.
pub async fn wait_until<F>(timeout_ms: u64, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockWsServer::start().await;
        assert!(server.url().starts_with("ws://127.0.0.1:"));
        server.shutdown().await;
    }
}
