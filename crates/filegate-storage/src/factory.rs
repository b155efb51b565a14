#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{MockStorage, Storage, StorageBackend, StorageError, StorageResult};
use filegate_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = &config.storage;

    match storage.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = storage
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = storage.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let credentials = storage
                .aws_access_key_id
                .clone()
                .zip(storage.aws_secret_access_key.clone());

            let s3 = S3Storage::new(bucket, region, storage.s3_endpoint.clone(), credentials)?;
            Ok(Arc::new(s3))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = storage.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;

            let local = LocalStorage::new(base_path).await?;
            Ok(Arc::new(local))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Mock => {
            tracing::warn!("Using in-memory mock storage; uploads are not persisted");
            Ok(Arc::new(MockStorage::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(|key| vars.get(key).cloned()).unwrap()
    }

    #[tokio::test]
    async fn test_creates_mock_backend() {
        let storage = create_storage(&config(&[("STORAGE_BACKEND", "mock")]))
            .await
            .unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Mock);
    }

    #[cfg(feature = "storage-local")]
    #[tokio::test]
    async fn test_creates_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let storage = create_storage(&config(&[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", &path),
        ]))
        .await
        .unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn test_s3_without_bucket_is_config_error() {
        let result = create_storage(&config(&[("STORAGE_BACKEND", "s3")])).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
