//! WebSocket client for the kart timing vendor feed.
//!
//! Provides the upstream connection with:
//! - One-shot `BcStart` subscription on every open
//! - Fixed-delay reconnection with no attempt cap
//! - Cancellation-aware shutdown
//! - Inline frame dispatch to a [`FeedHandler`]

pub mod connection;
pub mod error;
pub mod handler;
pub mod message;

pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState};
pub use error::{WsError, WsResult};
pub use handler::FeedHandler;
pub use message::{frame_type, is_race_frame, StartRequest, RACE_TYPE, START_TYPE, TYPE_TAG};
