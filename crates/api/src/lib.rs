//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - The push delivery endpoint the message transport invokes
//! - Health and readiness probes

pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use sprout_processor::EventProcessor;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The event processor invoked once per delivery.
    pub processor: Arc<EventProcessor>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
