//! HTTP request tracing and metrics

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use filegate_infra::{record_trace_context, RequestId};
use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};
use std::time::{Duration, Instant};
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::trace::{MakeSpan, OnFailure, OnResponse};
use tracing::Span;

/// Route label for requests that matched no route; raw paths are never used.
const UNMATCHED_ROUTE: &str = "unmatched";

#[derive(Clone)]
pub struct HttpMetrics {
    request_counter: Counter<u64>,
    request_duration: Histogram<f64>,
}

impl HttpMetrics {
    pub fn new(meter: &Meter) -> Self {
        let request_counter = meter
            .u64_counter("http.server.request.count")
            .with_description("Total number of HTTP requests")
            .build();

        let request_duration = meter
            .f64_histogram("http.server.request.duration")
            .with_description("HTTP request duration in seconds")
            .with_unit("s")
            .build();

        Self {
            request_counter,
            request_duration,
        }
    }

    pub fn record_request(&self, method: &str, route: &str, status: u16, duration: f64) {
        let labels = &[
            KeyValue::new("http.method", method.to_string()),
            KeyValue::new("http.route", route.to_string()),
            KeyValue::new("http.status_code", i64::from(status)),
        ];

        self.request_counter.add(1, labels);
        self.request_duration.record(duration, labels);
    }
}

/// Middleware recording request count and duration by method, route template and status.
pub async fn http_metrics_middleware(
    State(metrics): State<HttpMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let start = Instant::now();
    let response = next.run(request).await;

    metrics.record_request(
        &method,
        &route,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[derive(Clone, Default)]
pub struct CustomMakeSpan;

impl<B> MakeSpan<B> for CustomMakeSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let method = request.method().as_str();
        let uri = request.uri().path();
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(|mp| mp.as_str())
            .unwrap_or(uri);
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.as_str())
            .unwrap_or("");

        let span = tracing::info_span!(
            "http_request",
            otel.name = %format!("{} {}", method, route),
            otel.kind = "server",
            request_id = %request_id,
            trace_id = tracing::field::Empty,
            span_id = tracing::field::Empty,
            http.method = %method,
            http.route = %route,
            http.target = %uri,
            http.user_agent = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            http.request_content_length = tracing::field::Empty,
        );

        record_trace_context(&span);

        if let Some(user_agent) = request
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
        {
            span.record("http.user_agent", user_agent);
        }

        if let Some(content_length) = request
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
        {
            span.record("http.request_content_length", content_length);
        }

        span
    }
}

#[derive(Clone, Default)]
pub struct CustomOnResponse;

impl<B> OnResponse<B> for CustomOnResponse {
    fn on_response(self, response: &axum::http::Response<B>, latency: Duration, span: &Span) {
        let status = response.status().as_u16();
        span.record("http.status_code", status);

        if response.status().is_server_error() {
            tracing::error!(status, latency_ms = latency.as_millis(), "request failed");
        } else if response.status().is_client_error() {
            tracing::warn!(status, latency_ms = latency.as_millis(), "client error");
        } else {
            tracing::info!(status, latency_ms = latency.as_millis(), "finished processing request");
        }
    }
}

#[derive(Clone, Default)]
pub struct CustomOnFailure;

impl OnFailure<ServerErrorsFailureClass> for CustomOnFailure {
    fn on_failure(&mut self, failure: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
        tracing::error!(
            failure = %failure,
            latency_ms = latency.as_millis(),
            "request processing failed"
        );
    }
}
