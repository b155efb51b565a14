//! In-memory storage backend for tests and for running without cloud access.

use crate::keys::generate_object_key;
use crate::traits::{ObjectMetadata, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::RwLock;
use tracing::Instrument;

/// A stored object as the mock saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockObject {
    pub data: Bytes,
    pub metadata: ObjectMetadata,
}

/// Storage that keeps objects in memory.
///
/// Can be switched into a failing mode and can delay writes, so callers can
/// exercise error and cancellation paths.
#[derive(Debug, Default)]
pub struct MockStorage {
    objects: RwLock<HashMap<String, MockObject>>,
    should_fail: AtomicBool,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose every upload fails.
    pub fn failing() -> Self {
        let storage = Self::default();
        storage.set_should_fail(true);
        storage
    }

    /// Delay each upload after the bytes are read and before they are committed.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Number of times `upload` was invoked, successful or not.
    pub fn upload_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn get(&self, key: &str) -> Option<MockObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        metadata: &ObjectMetadata,
    ) -> StorageResult<StoredObject> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let span = tracing::info_span!(
            "storage.mock.upload",
            file.name = %metadata.filename,
            file.type = %metadata.content_type,
        );

        async move {
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(StorageError::BackendError(
                    "mock storage configured to fail".to_string(),
                ));
            }

            let mut buffer = Vec::new();
            reader.read_to_end(&mut buffer).await?;

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let key = generate_object_key(&metadata.filename);
            let size = buffer.len() as u64;
            self.objects.write().await.insert(
                key.clone(),
                MockObject {
                    data: Bytes::from(buffer),
                    metadata: metadata.clone(),
                },
            );

            tracing::debug!(key = %key, size_bytes = size, "Mock upload stored");
            Ok(StoredObject { key, size })
        }
        .instrument(span)
        .await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Mock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stores_exact_bytes() {
        let storage = MockStorage::new();
        let data = b"\x89PNG\r\n\x1a\nrest of image".to_vec();
        let mut reader = &data[..];

        let stored = storage
            .upload(&mut reader, &ObjectMetadata::new("pic.png", "image/png"))
            .await
            .unwrap();

        assert_eq!(stored.size, data.len() as u64);
        let object = storage.get(&stored.key).await.unwrap();
        assert_eq!(object.data.as_ref(), &data[..]);
        assert_eq!(object.metadata.content_type, "image/png");
        assert_eq!(storage.upload_calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_mode_stores_nothing() {
        let storage = MockStorage::failing();
        let mut reader = &b"data"[..];

        let result = storage
            .upload(&mut reader, &ObjectMetadata::new("a.pdf", "application/pdf"))
            .await;

        assert!(matches!(result, Err(StorageError::BackendError(_))));
        assert!(storage.is_empty().await);
        assert_eq!(storage.upload_calls(), 1);
    }

    #[tokio::test]
    async fn test_distinct_uploads_get_distinct_keys() {
        let storage = MockStorage::new();
        let meta = ObjectMetadata::new("same.png", "image/png");

        let a = storage.upload(&mut &b"one"[..], &meta).await.unwrap();
        let b = storage.upload(&mut &b"two"[..], &meta).await.unwrap();

        assert_ne!(a.key, b.key);
        assert_eq!(storage.len().await, 2);
    }
}
