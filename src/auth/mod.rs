//! Static shared-secret check on the `X-API-KEY` header.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::core::paths::routes::API_KEY_HEADER;

/// Configured key, kept only as a blake3 digest. `blake3::Hash` equality is
/// constant-time.
#[derive(Clone)]
pub struct ApiKey {
    verifier: blake3::Hash,
}

impl ApiKey {
    pub fn new(key: &str) -> Self { Self { verifier: blake3::hash(key.as_bytes()) } }

    pub fn verify(&self, presented: &str) -> bool { blake3::hash(presented.as_bytes()) == self.verifier }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("ApiKey(..)") }
}

/// Middleware: 403 without a key or with the wrong one. With no key
/// configured nothing matches, so every request is rejected.
pub async fn require_api_key(State(key): State<Option<ApiKey>>, request: Request, next: Next) -> Response {
    let presented = request.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    let rejection = match (presented, key.as_ref()) {
        (None | Some(""), _) => Some("No API key provided"),
        (Some(value), Some(key)) if key.verify(value) => None,
        _ => Some("Invalid API key"),
    };
    match rejection {
        Some(message) => {
            tracing::warn!(path = %request.uri().path(), reason = message, "request rejected");
            forbidden(message)
        }
        None => next.run(request).await,
    }
}

fn forbidden(message: &str) -> Response {
    (StatusCode::FORBIDDEN, Json(json!({"error": message}))).into_response()
}
