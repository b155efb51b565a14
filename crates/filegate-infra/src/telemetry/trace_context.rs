//! OpenTelemetry trace/span IDs as plain span fields, so every log line
//! emitted inside a request carries them.

use tracing::Span;

/// Hex `(trace_id, span_id)` of the OpenTelemetry span backing `span`.
///
/// `None` when export is compiled out, disabled at runtime, or the span is
/// not sampled into a valid context.
#[cfg(feature = "observability-opentelemetry")]
pub fn trace_context(span: &Span) -> Option<(String, String)> {
    use opentelemetry::trace::TraceContextExt;
    use tracing_opentelemetry::OpenTelemetrySpanExt;

    let cx = span.context();
    let otel_span = cx.span();
    let span_context = otel_span.span_context();
    span_context.is_valid().then(|| {
        (
            span_context.trace_id().to_string(),
            span_context.span_id().to_string(),
        )
    })
}

#[cfg(not(feature = "observability-opentelemetry"))]
pub fn trace_context(_span: &Span) -> Option<(String, String)> {
    None
}

/// Fill the `trace_id` and `span_id` fields declared on `span`.
pub fn record_trace_context(span: &Span) {
    if let Some((trace_id, span_id)) = trace_context(span) {
        span.record("trace_id", trace_id.as_str());
        span.record("span_id", span_id.as_str());
    }
}
