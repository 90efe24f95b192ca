//! reqwest-backed transport with a persistent cookie store.
//!
//! All endpoint paths are joined onto the configured base URL; sessions
//! ride on cookies, so one client instance must serve the whole process.
//! Status codes are only ever read as 2xx-vs-not — a rejection surfaces
//! the body's `message`/`error` text verbatim.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use thumblab_core::config::ClientConfig;
use thumblab_core::errors::ApiError;
use thumblab_core::traits::IApiTransport;

/// HTTP transport for the Thumblab API.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Network {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: config.trimmed_base_url().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Network {
            reason: e.to_string(),
        })?;
        decode(response).await
    }
}

#[async_trait]
impl IApiTransport for HttpApi {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        tracing::debug!(path, "api: GET");
        self.send_json(self.client.get(self.url(path))).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        tracing::debug!(path, "api: POST");
        self.send_json(self.client.post(self.url(path)).json(&body))
            .await
    }

    async fn put_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        tracing::debug!(path, "api: PUT");
        self.send_json(self.client.put(self.url(path)).json(&body))
            .await
    }

    async fn delete_json(&self, path: &str) -> Result<Value, ApiError> {
        tracing::debug!(path, "api: DELETE");
        self.send_json(self.client.delete(self.url(path))).await
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        tracing::debug!(url, "api: download");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network {
                reason: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Rejected {
                message: format!("download failed with status {status}"),
            });
        }
        let bytes = response.bytes().await.map_err(|e| ApiError::Network {
            reason: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

async fn decode(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(|e| ApiError::Network {
        reason: e.to_string(),
    })?;

    if status.is_success() {
        if text.trim().is_empty() {
            // Several endpoints (logout, deduct) answer 2xx with no body.
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Malformed {
            reason: e.to_string(),
        })
    } else {
        Err(ApiError::Rejected {
            message: rejection_message(&text),
        })
    }
}

/// Pull the human-readable reason out of an error body.
fn rejection_message(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = v.get(key).and_then(|m| m.as_str()) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "request rejected".to_string()
    } else {
        trimmed.to_string()
    }
}
