//! Configuration module
//!
//! Settings are read once at startup from the process environment (a `.env`
//! file is loaded first when present) and are immutable afterwards.

use std::env;

use crate::storage_types::StorageBackend;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 2131;
const MAX_FILE_SIZE_MB: usize = 10;
const UPLOAD_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ALLOWED_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,application/pdf";
const OTEL_SAMPLE_RATIO: f64 = 1.0;
const OTEL_METRICS_INTERVAL_SECS: u64 = 30;

/// OpenTelemetry exporter settings
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub otel_enabled: bool,
    pub otel_endpoint: String,
    pub otel_service_name: String,
    pub otel_service_version: String,
    pub otel_protocol: String,
    pub otel_sampler: String,
    pub otel_sample_ratio: f64,
    pub otel_metrics_interval_secs: u64,
}

/// Storage backend settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    // Custom endpoint for S3-compatible providers (MinIO, LocalStack)
    pub s3_endpoint: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub local_storage_path: Option<String>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub upload_timeout_secs: u64,
    pub storage: StorageConfig,
    pub log_level: String,
    pub log_format: String,
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_PORT,
        };

        let max_file_size_mb = match var("MAX_FILE_SIZE_MB") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_MB must be a valid number"))?,
            None => MAX_FILE_SIZE_MB,
        };
        let max_file_size_bytes = max_file_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large"))?;

        let allowed_content_types = var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|| DEFAULT_ALLOWED_CONTENT_TYPES.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let backend = match var("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: var("S3_BUCKET"),
            s3_region: var("S3_REGION").or_else(|| var("AWS_REGION")),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_access_key_id: var("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
        };

        let telemetry = TelemetryConfig {
            otel_enabled: var("OTEL_ENABLED")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            otel_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|| "http://localhost:4317".to_string()),
            otel_service_name: var("OTEL_SERVICE_NAME").unwrap_or_else(|| "filegate".to_string()),
            otel_service_version: var("OTEL_SERVICE_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            otel_protocol: var("OTEL_EXPORTER_OTLP_PROTOCOL")
                .unwrap_or_else(|| "grpc".to_string()),
            otel_sampler: var("OTEL_SAMPLER").unwrap_or_else(|| "always_on".to_string()),
            otel_sample_ratio: var("OTEL_SAMPLE_RATIO")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(OTEL_SAMPLE_RATIO),
            otel_metrics_interval_secs: var("OTEL_METRICS_INTERVAL_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(OTEL_METRICS_INTERVAL_SECS),
        };

        Ok(Config {
            environment,
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            max_file_size_bytes,
            allowed_content_types,
            upload_timeout_secs: var("UPLOAD_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(UPLOAD_TIMEOUT_SECS),
            storage,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format: var("LOG_FORMAT").unwrap_or_else(|| "compact".to_string()),
            telemetry,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        if self.upload_timeout_secs == 0 {
            return Err(anyhow::anyhow!("UPLOAD_TIMEOUT_SECS must be greater than 0"));
        }

        let ratio = self.telemetry.otel_sample_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(anyhow::anyhow!(
                "OTEL_SAMPLE_RATIO must be between 0.0 and 1.0, got {}",
                ratio
            ));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
                // Production relies on the ambient credential chain (instance role).
                if !self.is_production()
                    && (self.storage.aws_access_key_id.is_none()
                        || self.storage.aws_secret_access_key.is_none())
                {
                    return Err(anyhow::anyhow!(
                        "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set outside production"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Mock => {}
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.backend
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.allowed_content_types
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_bytes
    }
}
