//! Filegate Infrastructure Library
//!
//! Shared infrastructure for the Filegate service:
//! - Middleware (request ID)
//! - Telemetry initialization (tracing subscriber, optional OpenTelemetry export)

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId};

#[cfg(feature = "observability-basic")]
pub use telemetry::{
    init_telemetry, record_trace_context, shutdown_telemetry, trace_context, TelemetrySettings,
};
