//! Programmable fake backend for integration tests.
#![allow(dead_code)]

use aveo::infrastructure::config::HttpConfig;
use aveo::infrastructure::network::http::create_client;
use aveo::ApiClient;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct Inner {
    routes: HashMap<String, (u16, String)>,
    requests: Vec<Recorded>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<Inner>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .routes
            .insert(format!("{} {}", method, path), (status, body.into()));
    }

    pub fn json(&self, method: &str, path: &str, status: u16, body: Value) {
        self.route(method, path, status, body.to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last(&self, method: &str, path: &str) -> Option<Recorded> {
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
    }

    /// Serve on an ephemeral port and return the base URL.
    pub async fn start(&self) -> String {
        let router = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Start the server and build a client for it.
    pub async fn client(&self) -> Arc<ApiClient> {
        let base = self.start().await;
        let http = create_client(&HttpConfig::default()).unwrap();
        Arc::new(ApiClient::new(http, base))
    }
}

async fn handle(
    State(backend): State<FakeBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let key = format!("{} {}", recorded.method, recorded.path);
    let mut inner = backend.inner.lock().unwrap();
    inner.requests.push(recorded);

    match inner.routes.get(&key) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap(),
            [(header::CONTENT_TYPE, "application/json")],
            body.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"detail":"Not Found"}"#.to_string(),
        )
            .into_response(),
    }
}
