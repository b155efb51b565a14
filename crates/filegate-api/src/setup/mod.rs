//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::services::upload::{OtelUploadMetrics, UploadService};
use crate::state::{AppState, UploadLimits};
use anyhow::{Context, Result};
use filegate_core::Config;
use filegate_infra::TelemetrySettings;
use filegate_processing::ContentValidator;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(config).context("Configuration validation failed")?;

    filegate_infra::init_telemetry(&TelemetrySettings::from_config(config))
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(config).await?;

    let upload_service = UploadService::new(
        ContentValidator::new(config.allowed_content_types().to_vec()),
        storage,
        Arc::new(OtelUploadMetrics::global()),
    );
    let state = Arc::new(AppState::new(
        Arc::new(upload_service),
        UploadLimits::from_config(config),
    ));

    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
