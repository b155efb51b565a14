use crate::keys::generate_object_key;
use crate::traits::{ObjectMetadata, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::Instrument;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO, "http://localhost:4566" for LocalStack)
    /// * `credentials` - Static access key pair; `None` falls back to the
    ///   environment and instance credential chain
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        credentials: Option<(String, String)>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some((access_key_id, secret_access_key)) = credentials {
            builder = builder
                .with_access_key_id(access_key_id)
                .with_secret_access_key(secret_access_key);
        }

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage { store, bucket })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        metadata: &ObjectMetadata,
    ) -> StorageResult<StoredObject> {
        let key = generate_object_key(&metadata.filename);
        let span = tracing::info_span!(
            "storage.s3.upload",
            aws.bucket = %self.bucket,
            file.name = %metadata.filename,
            file.type = %metadata.content_type,
            object.key = %key,
        );

        async move {
            let start = std::time::Instant::now();

            // A single PUT is atomic: the object is either fully visible or absent.
            let mut buffer = Vec::new();
            reader.read_to_end(&mut buffer).await.map_err(|e| {
                StorageError::UploadFailed(format!("Failed to read from stream: {}", e))
            })?;

            let size = buffer.len() as u64;
            let location = Path::from(key.clone());

            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, metadata.content_type.clone().into());
            let opts = PutOptions {
                attributes,
                ..Default::default()
            };

            self.store
                .put_opts(&location, PutPayload::from(Bytes::from(buffer)), opts)
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        bucket = %self.bucket,
                        key = %key,
                        size_bytes = size,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 upload failed"
                    );
                    StorageError::UploadFailed(e.to_string())
                })?;

            tracing::info!(
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload successful"
            );

            Ok(StoredObject { key, size })
        }
        .instrument(span)
        .await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
