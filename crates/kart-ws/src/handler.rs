//! Connection event sink.

/// Receives connection lifecycle events and inbound frames.
///
/// Callbacks run inline on the connection task, one at a time and in arrival
/// order. Implementations must not block: a slow callback stalls the socket.
pub trait FeedHandler: Send + Sync {
    /// The socket is open. Called before the subscription request is sent.
    fn on_open(&self);

    /// A text frame arrived (binary frames are forwarded when valid UTF-8).
    fn on_text(&self, text: &str);

    /// The connection attempt ended: server close, transport error, stream
    /// end, failed connect, or shutdown. Called before any reconnect wait.
    fn on_close(&self);
}
