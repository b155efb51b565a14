//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p filegate-api`.

#![allow(dead_code)]

pub mod fixtures;
pub mod metrics;

use axum_test::TestServer;
use filegate_api::http_metrics::HttpMetrics;
use filegate_api::setup::routes;
use filegate_api::{AppState, UploadLimits, UploadService};
use filegate_processing::ContentValidator;
use filegate_storage::MockStorage;
use std::sync::Arc;
use std::time::Duration;

pub use metrics::RecordingMetrics;

/// Test application: server plus handles on the substituted collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MockStorage>,
    pub metrics: Arc<RecordingMetrics>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub struct TestAppBuilder {
    allowed: Vec<String>,
    storage: MockStorage,
    max_file_size_bytes: usize,
    timeout: Duration,
    http_metrics: Option<HttpMetrics>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            allowed: vec!["image/png".to_string(), "image/jpeg".to_string()],
            storage: MockStorage::new(),
            max_file_size_bytes: 1024 * 1024,
            timeout: Duration::from_secs(30),
            http_metrics: None,
        }
    }
}

impl TestAppBuilder {
    pub fn allowed(mut self, types: &[&str]) -> Self {
        self.allowed = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn storage(mut self, storage: MockStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn max_file_size_bytes(mut self, bytes: usize) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn http_metrics(mut self, metrics: HttpMetrics) -> Self {
        self.http_metrics = Some(metrics);
        self
    }

    pub fn build(self) -> TestApp {
        let storage = Arc::new(self.storage);
        let metrics = Arc::new(RecordingMetrics::default());
        let service = UploadService::new(
            ContentValidator::new(self.allowed),
            storage.clone(),
            metrics.clone(),
        );
        let state = Arc::new(AppState::new(
            Arc::new(service),
            UploadLimits {
                max_file_size_bytes: self.max_file_size_bytes,
                timeout: self.timeout,
            },
        ));

        let app = match self.http_metrics {
            Some(http_metrics) => routes::setup_routes_with_metrics(state, http_metrics),
            None => routes::setup_routes(state),
        };
        let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

        TestApp {
            server,
            storage,
            metrics,
        }
    }
}

/// Setup test app with mock storage and the default allow-list.
pub fn setup_test_app() -> TestApp {
    TestAppBuilder::default().build()
}
