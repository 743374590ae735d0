//! HTTP router for the extraction service.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. Audit logger

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::pipeline::adverse_event::SeverityPipeline;

/// Build the service router around a ready pipeline.
pub fn api_router(pipeline: Arc<SeverityPipeline>) -> Router {
    build_router(ApiContext::new(pipeline))
}

/// Build router from pre-constructed `ApiContext`.
pub(crate) fn build_router(ctx: ApiContext) -> Router {
    // .with_state() converts Router<ApiContext> → Router<()> so the
    // from_fn middleware (state = ()) can be layered on top.
    Router::new()
        .route("/analyze", post(endpoints::analyze::analyze))
        .route("/health", get(endpoints::health::check))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(CorsLayer::permissive())
}
