use super::{env_filter, TelemetrySettings};
use opentelemetry::{trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    metrics::{self as sdkmetrics, PeriodicReader},
    trace::{self as sdktrace, BatchConfig, BatchSpanProcessor, RandomIdGenerator, Sampler},
    Resource,
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static METER_PROVIDER: OnceLock<sdkmetrics::SdkMeterProvider> = OnceLock::new();

fn sampler_from(settings: &TelemetrySettings) -> Sampler {
    match settings.sampler.as_str() {
        "always_off" => Sampler::AlwaysOff,
        "trace_id_ratio" => {
            let ratio = settings.sample_ratio.clamp(0.0, 1.0);
            if ratio <= 0.0 {
                tracing::warn!("OTEL_SAMPLE_RATIO is 0.0, using AlwaysOff sampler");
                Sampler::AlwaysOff
            } else if ratio >= 1.0 {
                Sampler::AlwaysOn
            } else {
                Sampler::TraceIdRatioBased(ratio)
            }
        }
        other => {
            if other != "always_on" {
                tracing::warn!(sampler = %other, "Unknown sampler type, defaulting to AlwaysOn");
            }
            Sampler::AlwaysOn
        }
    }
}

/// Initialize tracing with OTLP export of traces and metrics.
pub fn init_telemetry(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let (compact, json) = if settings.json_logs {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    let endpoint = match (&settings.endpoint, settings.enabled) {
        (Some(endpoint), true) => endpoint.clone(),
        _ => {
            tracing_subscriber::registry()
                .with(env_filter(&settings.log_level))
                .with(compact)
                .with(json)
                .try_init()?;

            tracing::info!("OpenTelemetry disabled, using standard tracing");
            return Ok(());
        }
    };

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.to_str().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown".to_string());

    let instance_id =
        env::var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| uuid::Uuid::new_v4().to_string());

    let resource = Resource::new(vec![
        KeyValue::new(SERVICE_NAME, settings.service_name.clone()),
        KeyValue::new(SERVICE_VERSION, settings.service_version.clone()),
        KeyValue::new("deployment.environment", settings.environment.clone()),
        KeyValue::new("host.name", hostname.clone()),
        KeyValue::new("service.instance.id", instance_id.clone()),
    ]);

    let span_exporter = if settings.protocol == "http" {
        opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(&endpoint)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP span exporter: {}", e))?
    } else {
        opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&endpoint)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build gRPC span exporter: {}", e))?
    };

    let batch_processor =
        BatchSpanProcessor::builder(span_exporter, opentelemetry_sdk::runtime::Tokio)
            .with_batch_config(BatchConfig::default())
            .build();

    let tracer_provider = sdktrace::TracerProvider::builder()
        .with_span_processor(batch_processor)
        .with_sampler(sampler_from(settings))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource.clone())
        .build();

    let tracer = tracer_provider.tracer(settings.service_name.clone());
    opentelemetry::global::set_tracer_provider(tracer_provider);

    let metric_exporter = if settings.protocol == "http" {
        opentelemetry_otlp::MetricExporter::builder()
            .with_http()
            .with_endpoint(&endpoint)
            .with_temporality(sdkmetrics::Temporality::Cumulative)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP metric exporter: {}", e))?
    } else {
        opentelemetry_otlp::MetricExporter::builder()
            .with_tonic()
            .with_endpoint(&endpoint)
            .with_temporality(sdkmetrics::Temporality::Cumulative)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build gRPC metric exporter: {}", e))?
    };

    let reader = PeriodicReader::builder(metric_exporter, opentelemetry_sdk::runtime::Tokio)
        .with_interval(Duration::from_secs(settings.metrics_interval_secs))
        .build();

    let meter_provider = sdkmetrics::SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource)
        .build();

    opentelemetry::global::set_meter_provider(meter_provider.clone());
    let _ = METER_PROVIDER.set(meter_provider);

    tracing_subscriber::registry()
        .with(env_filter(&settings.log_level))
        .with(compact)
        .with(json)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()?;

    tracing::info!(
        endpoint = %endpoint,
        protocol = %settings.protocol,
        environment = %settings.environment,
        sampler = %settings.sampler,
        sample_ratio = settings.sample_ratio,
        metrics_interval_secs = settings.metrics_interval_secs,
        hostname = %hostname,
        instance_id = %instance_id,
        "OpenTelemetry initialized successfully"
    );

    Ok(())
}

/// Flush pending spans and metrics.
pub async fn shutdown_telemetry() {
    tracing::info!("Shutting down OpenTelemetry...");

    opentelemetry::global::shutdown_tracer_provider();

    if let Some(provider) = METER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "Failed to shut down meter provider");
        }
    }

    tracing::info!("OpenTelemetry shutdown complete");
}
