//! HTTP server implementation using axum.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use kart_feed::{SessionSnapshot, SessionState};
use kart_telemetry::Metrics;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    session: Arc<SessionState>,
}

impl AppState {
    pub fn new(session: Arc<SessionState>) -> Self {
        Self { session }
    }
}

/// Create the axum router.
pub fn create_router(state: AppState, config: &DashboardConfig) -> Router {
    Router::new()
        .route("/session.json", get(get_session))
        .route("/metrics", get(get_metrics))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Current session snapshot. Always 200, defaults included.
async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot())
}

/// Prometheus exposition.
async fn get_metrics() -> Response {
    match Metrics::gather_text() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics unavailable").into_response()
        }
    }
}

/// Run the dashboard HTTP server until `shutdown` resolves.
pub async fn run_server<F>(
    session: Arc<SessionState>,
    config: DashboardConfig,
    shutdown: F,
) -> DashboardResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| DashboardError::InvalidAddress(format!("{}:{}", config.host, config.port)))?;

    let app = create_router(AppState::new(session), &config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        local = %format!("http://localhost:{}", config.port),
        static_dir = %config.static_dir,
        "Kart timer server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Dashboard server stopped");
    Ok(())
}
