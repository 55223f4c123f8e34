//! Kart timing relay.
//!
//! Main application that wires the components together:
//! - Vendor WebSocket connection (`kart-ws`)
//! - Session state reconciliation (`kart-feed`)
//! - Polled JSON endpoint and static dashboard (`kart-dashboard`)

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, FeedConfig};
pub use error::{AppError, AppResult};
