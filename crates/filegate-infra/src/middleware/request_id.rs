use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use filegate_core::constants::REQUEST_ID_HEADER;
use std::convert::Infallible;
use uuid::Uuid;

const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID extension type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Accept a caller-supplied ID only if it is short visible ASCII.
fn sanitize(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty()
        || candidate.len() > MAX_REQUEST_ID_LEN
        || !candidate.bytes().all(|b| b.is_ascii_graphic())
    {
        return None;
    }
    Some(candidate.to_string())
}

/// Request ID middleware
/// Assigns a correlation ID to each request and includes it in:
/// - Response headers (X-Request-ID)
/// - Request extensions (for logging and the upload context)
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    // Reuse an inbound ID so traces join up across services
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(sanitize)
        .map(RequestId)
        .unwrap_or_else(RequestId::generate);

    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(RequestId::generate))
    }
}
