//! Telemetry initialization
//!
//! Installs the global tracing subscriber and, with the
//! `observability-opentelemetry` feature, OTLP trace and metric export.

#[cfg(feature = "observability-opentelemetry")]
mod init_opentelemetry;

#[cfg(not(feature = "observability-opentelemetry"))]
mod init_basic;

mod trace_context;

#[cfg(feature = "observability-opentelemetry")]
pub use init_opentelemetry::{init_telemetry, shutdown_telemetry};

#[cfg(not(feature = "observability-opentelemetry"))]
pub use init_basic::{init_telemetry, shutdown_telemetry};

pub use trace_context::{record_trace_context, trace_context};

use filegate_core::Config;
use tracing_subscriber::EnvFilter;

/// Everything telemetry setup needs, detached from the full config.
#[derive(Clone, Debug)]
pub struct TelemetrySettings {
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub service_name: String,
    pub service_version: String,
    pub protocol: String,
    pub environment: String,
    pub sampler: String,
    pub sample_ratio: f64,
    pub metrics_interval_secs: u64,
    pub log_level: String,
    pub json_logs: bool,
}

impl TelemetrySettings {
    pub fn from_config(config: &Config) -> Self {
        let t = &config.telemetry;
        Self {
            enabled: t.otel_enabled,
            endpoint: Some(t.otel_endpoint.clone()).filter(|e| !e.is_empty()),
            service_name: t.otel_service_name.clone(),
            service_version: t.otel_service_version.clone(),
            protocol: t.otel_protocol.clone(),
            environment: config.environment.clone(),
            sampler: t.otel_sampler.clone(),
            sample_ratio: t.otel_sample_ratio,
            metrics_interval_secs: t.otel_metrics_interval_secs,
            log_level: config.log_level.clone(),
            json_logs: config.log_format.eq_ignore_ascii_case("json"),
        }
    }
}

/// `RUST_LOG` wins; otherwise `LOG_LEVEL` applies to this service and tower-http.
pub(crate) fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives(log_level).into())
}

fn default_directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains('=') {
        // Already a full directive list
        level.to_string()
    } else {
        format!("filegate={level},tower_http={level}")
    }
}
