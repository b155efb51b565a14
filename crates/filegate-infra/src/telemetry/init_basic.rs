use super::{env_filter, TelemetrySettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize basic tracing (without OpenTelemetry)
pub fn init_telemetry(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let (compact, json) = if settings.json_logs {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(env_filter(&settings.log_level))
        .with(compact)
        .with(json)
        .try_init()?;

    if settings.enabled {
        tracing::warn!("OTEL_ENABLED is set but the OpenTelemetry feature is not compiled in");
    }
    tracing::info!("Using standard tracing");
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown (OpenTelemetry feature not enabled)");
}
