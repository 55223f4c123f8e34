//! Main application orchestration.
//!
//! Owns the shared [`SessionState`] and hands it to both sides:
//! - the vendor feed task, through [`SessionFeed`] (sole writer)
//! - the dashboard server, read-only via snapshots

use crate::config::AppConfig;
use crate::error::AppResult;
use kart_feed::{SessionFeed, SessionState};
use kart_ws::ConnectionManager;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Main application.
pub struct Application {
    config: AppConfig,
    session: Arc<SessionState>,
    connection: Arc<ConnectionManager>,
}

impl Application {
    /// Create a new application. Nothing connects until [`Application::run`].
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let session = Arc::new(SessionState::new(config.feed.default_remaining_seconds));
        let feed = Arc::new(SessionFeed::new(session.clone()));
        let connection = Arc::new(ConnectionManager::new(config.connection_config(), feed));

        Ok(Self {
            config,
            session,
            connection,
        })
    }

    /// Shared session state.
    pub fn session(&self) -> Arc<SessionState> {
        self.session.clone()
    }

    /// Vendor connection manager.
    pub fn connection(&self) -> Arc<ConnectionManager> {
        self.connection.clone()
    }

    /// Run until ctrl-c.
    pub async fn run(self) -> AppResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await
    }

    /// Run the feed and the dashboard until `shutdown` resolves or the
    /// server fails, then stop both.
    pub async fn run_until<F>(self, shutdown: F) -> AppResult<()>
    where
        F: std::future::Future<Output = ()>,
    {
        info!(
            vendor_url = %self.config.feed.vendor_url,
            resource_id = %self.config.feed.resource_id,
            reconnect_delay_ms = self.config.feed.reconnect_delay_ms,
            "Starting vendor feed"
        );
        let connection = self.connection.clone();
        let feed_task = tokio::spawn(async move { connection.connect().await });

        let server_token = CancellationToken::new();
        let server_signal = server_token.clone();
        let mut server_task = tokio::spawn(kart_dashboard::run_server(
            self.session.clone(),
            self.config.dashboard.clone(),
            async move { server_signal.cancelled().await },
        ));

        let server_result = tokio::select! {
            result = &mut server_task => Some(result),
            () = shutdown => None,
        };

        info!("Shutting down");
        self.connection.shutdown();
        server_token.cancel();

        let server_result = match server_result {
            Some(result) => result,
            None => server_task.await,
        };
        feed_task.await??;
        server_result??;

        info!("Shutdown complete");
        Ok(())
    }
}
