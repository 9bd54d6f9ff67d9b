//! Helpers for driving the full router in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

use crate::auth::AUTH_HEADER;
use crate::config::{Config, StoreBackend};
use crate::routes;
use crate::state::AppState;
use crate::store::{KvStore, ListOptions, ListPage, MemoryStore};

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        auth_password: TEST_SECRET.to_string(),
        backend: StoreBackend::Memory,
        service_port: 3000,
        service_host: "0.0.0.0".to_string(),
        swagger_ui: false,
    }
}

/// Router over the given store, configured with [`TEST_SECRET`].
pub fn test_app(store: Arc<dyn KvStore>) -> Router {
    routes::router(AppState::new(test_config(), store))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub raw: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> JsonValue {
        serde_json::from_slice(&self.raw).unwrap()
    }
}

pub async fn send(
    app: &Router,
    method: Method,
    secret: Option<&str>,
    body: impl Into<Body>,
) -> TestResponse {
    let mut request = Request::builder()
        .method(method)
        .uri("/")
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        request = request.header(AUTH_HEADER, secret);
    }

    let response = app
        .clone()
        .oneshot(request.body(body.into()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let raw = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse { status, headers, raw }
}

/// POST `body` with the correct secret and return the decoded envelope.
pub async fn call(app: &Router, body: JsonValue) -> (StatusCode, JsonValue) {
    let response = send(app, Method::POST, Some(TEST_SECRET), body.to_string()).await;
    (response.status, response.json())
}

/// Memory store that counts calls, optionally failing every operation.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub gets: AtomicUsize,
    pub puts: AtomicUsize,
    pub fail: bool,
}

impl CountingStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            anyhow::bail!("store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, content: &str) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.put(key, content).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn list(&self, options: ListOptions) -> Result<ListPage> {
        self.check()?;
        self.inner.list(options).await
    }
}
