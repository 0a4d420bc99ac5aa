//! REST API over the forecasting service.
//!
//! Provides three GET endpoints:
//! - `/forecast`: wind and solar forecasts for one datetime
//! - `/forecast/{energy}`: a single energy panel
//! - `/plot/{energy}`: actual vs forecast series with optional range

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::config::PresentationConfig;
use crate::forecast::ForecastService;
use crate::models::PretrainedModel;

pub use types::{DashboardResponse, ErrorResponse, PanelResponse, PlotResponse};

/// Immutable application state shared across all request handlers.
///
/// Constructed once at start-up and wrapped in `Arc`; no locks needed since
/// all data is read-only.
pub struct AppState {
    /// Loaded series and models.
    pub service: ForecastService<PretrainedModel>,
    /// Default datetime for requests without `?datetime=`.
    pub presentation: PresentationConfig,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/forecast", get(handlers::get_dashboard))
        .route("/forecast/{energy}", get(handlers::get_forecast))
        .route("/plot/{energy}", get(handlers::get_plot))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind to `addr` or the server
/// fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
