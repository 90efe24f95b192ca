#![allow(dead_code)]

//! In-memory transport fake shared by the engine tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use thumblab_core::errors::ApiError;
use thumblab_core::traits::IApiTransport;

use thumblab_client::effects::UiEvent;
use tokio::sync::mpsc::UnboundedReceiver;

/// One request as the fake saw it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub key: String,
    pub body: Value,
}

type Response = Result<Value, ApiError>;

/// Keyed by `"METHOD path"` (e.g. `"POST /api/auth/login"`); byte
/// downloads use `"BYTES <url>"`.
#[derive(Default)]
pub struct FakeTransport {
    calls: Mutex<Vec<RecordedCall>>,
    queued: Mutex<HashMap<String, VecDeque<Response>>>,
    defaults: Mutex<HashMap<String, Response>>,
    bytes: Mutex<HashMap<String, Result<Vec<u8>, ApiError>>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persistent response for a key; served whenever the queue is empty.
    pub fn stub(&self, key: &str, response: Response) {
        self.defaults
            .lock()
            .unwrap()
            .insert(key.to_string(), response);
    }

    /// One-shot response, consumed before the persistent stub.
    pub fn enqueue(&self, key: &str, response: Response) {
        self.queued
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn stub_bytes(&self, url: &str, result: Result<Vec<u8>, ApiError>) {
        self.bytes.lock().unwrap().insert(url.to_string(), result);
    }

    /// Make a key answer only after the given (tokio) delay.
    pub fn delay(&self, key: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(key.to_string(), delay);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, key: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.key == key)
            .count()
    }

    /// Index of the first call to `key`, for ordering assertions.
    pub fn first_call_index(&self, key: &str) -> Option<usize> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .position(|c| c.key == key)
    }

    async fn respond(&self, method: &str, path: &str, body: Value) -> Response {
        let key = format!("{method} {path}");
        self.calls.lock().unwrap().push(RecordedCall {
            key: key.clone(),
            body,
        });

        let delay = self.delays.lock().unwrap().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(response) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }
        if let Some(response) = self.defaults.lock().unwrap().get(&key) {
            return response.clone();
        }
        Err(ApiError::Rejected {
            message: format!("no stub for {key}"),
        })
    }
}

#[async_trait]
impl IApiTransport for FakeTransport {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.respond("GET", path, Value::Null).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.respond("POST", path, body).await
    }

    async fn put_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.respond("PUT", path, body).await
    }

    async fn delete_json(&self, path: &str) -> Result<Value, ApiError> {
        self.respond("DELETE", path, Value::Null).await
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let key = format!("BYTES {url}");
        self.calls.lock().unwrap().push(RecordedCall {
            key: key.clone(),
            body: Value::Null,
        });

        let delay = self.delays.lock().unwrap().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.bytes.lock().unwrap().get(url) {
            Some(result) => result.clone(),
            None => Err(ApiError::Rejected {
                message: format!("no byte stub for {url}"),
            }),
        }
    }
}

/// A balance payload as the ledger returns it.
pub fn balance_json(credits: u64, total_spent: u64) -> Value {
    json!({ "credits": credits, "totalSpent": total_spent, "username": "maya" })
}

/// A user payload as the auth endpoints return it.
pub fn user_json() -> Value {
    json!({ "id": "u-1", "username": "maya", "email": "maya@example.com" })
}

/// A thumbnail payload as the generation endpoints return it.
pub fn thumbnail_json(id: &str) -> Value {
    json!({
        "_id": id,
        "title": "Ten Tips for Better Sleep",
        "imageUrl": format!("https://cdn.example/{id}.png"),
        "style": "Minimalist",
        "aspect_ratio": "16:9",
        "color_scheme": "sunset",
        "prompt_used": "a calm bedroom scene"
    })
}

/// Give spawned tasks room to run.
pub async fn settle_tasks() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

/// Drain whatever effects are currently queued.
pub fn drain_events(rx: &mut UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
