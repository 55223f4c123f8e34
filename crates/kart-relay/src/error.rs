//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] kart_ws::WsError),

    #[error("Dashboard error: {0}")]
    Dashboard(#[from] kart_dashboard::DashboardError),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type AppResult<T> = Result<T, AppError>;
