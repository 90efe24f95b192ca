use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ApiError;

/// JSON-over-HTTPS transport with session-cookie semantics.
///
/// Paths are relative to the configured base URL; `fetch_bytes` takes an
/// absolute URL because asset downloads go straight to the CDN location the
/// server handed out. Implementations must carry cookies across calls so a
/// login is visible to every subsequent request.
#[async_trait]
pub trait IApiTransport: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError>;
    async fn post_json(&self, path: &str, body: Value) -> Result<Value, ApiError>;
    async fn put_json(&self, path: &str, body: Value) -> Result<Value, ApiError>;
    async fn delete_json(&self, path: &str) -> Result<Value, ApiError>;

    /// Download raw bytes from an absolute URL.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}
