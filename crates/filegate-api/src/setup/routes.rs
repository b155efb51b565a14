//! Route configuration and setup

use crate::handlers;
use crate::http_metrics::{
    http_metrics_middleware, CustomMakeSpan, CustomOnFailure, CustomOnResponse, HttpMetrics,
};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use filegate_infra::request_id_middleware;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Headroom over the file limit for multipart boundaries and part headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router {
    let http_metrics = HttpMetrics::new(&opentelemetry::global::meter("filegate"));
    setup_routes_with_metrics(state, http_metrics)
}

/// Setup routes with an explicit HTTP metrics sink.
pub fn setup_routes_with_metrics(state: Arc<AppState>, http_metrics: HttpMetrics) -> Router {
    let body_limit = state
        .limits
        .max_file_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(CustomMakeSpan)
        .on_response(CustomOnResponse)
        .on_failure(CustomOnFailure);

    // Layers added later wrap earlier ones: request ID is outermost so every
    // span and response carries it.
    Router::new()
        .route("/upload", post(handlers::upload::upload_file))
        .route("/health", get(handlers::health::health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn_with_state(
            http_metrics,
            http_metrics_middleware,
        ))
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
