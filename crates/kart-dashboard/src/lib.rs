//! kart-dashboard - Polled session endpoint for the kart relay.
//!
//! Serves the latest known session state to browser dashboards. It never
//! touches the vendor connection; it only reads [`kart_feed::SessionState`].
//!
//! ```text
//! GET /session.json  → {"connected","remainingSeconds","sessionStatus","lastRaceMessage"}
//! GET /metrics       → Prometheus text exposition
//! GET /*             → static files from `static_dir` (index.html for directories)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use kart_dashboard::{run_server, DashboardConfig};
//!
//! let state = Arc::new(SessionState::default());
//! run_server(state, DashboardConfig::default(), shutdown_signal()).await?;
//! ```

mod config;
mod error;
mod server;

pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use server::{create_router, run_server, AppState};
