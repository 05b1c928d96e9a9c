//! HTTP API

pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::services::SchedulingService;

#[derive(Debug, Clone, Copy, Default)]
pub struct AppState {
    pub scheduler: SchedulingService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/appointments/validate", post(handlers::validate_appointment))
        .route("/api/planning/day", post(handlers::plan_day))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until the listener fails
pub async fn serve(bind_addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", bind_addr))?;

    info!("HTTP API listening on http://{}", bind_addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
