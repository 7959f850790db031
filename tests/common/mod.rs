//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use math_api::audit::{AuditLog, AuditStore, MemoryAuditStore};
use math_api::auth::{CredentialVerifier, StaticCredentials, TokenService};
use math_api::config::AppConfig;
use math_api::observability::MetricsCollector;
use math_api::{AppState, HttpServer, Shutdown};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const TEST_SECRET: &str = "integration-test-secret";

/// A server bound to an ephemeral port on localhost.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub tokens: Arc<TokenService>,
    pub metrics: MetricsCollector,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Log in as the default static user and return the token.
    pub async fn login(&self) -> String {
        let res = self
            .client
            .post(self.url("/login"))
            .json(&json!({"username": "admin", "password": "password"}))
            .send()
            .await
            .expect("server unreachable");
        assert_eq!(res.status(), 200);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// POST `body` to `path`, optionally with a bearer token.
    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (u16, Value) {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await.expect("server unreachable");
        let status = res.status().as_u16();
        let body = res.json().await.unwrap_or(Value::Null);
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server with static admin/password credentials and the given store.
pub async fn spawn_server(store: Arc<dyn AuditStore>) -> TestServer {
    spawn_server_with(store, Arc::new(StaticCredentials::new("admin", "password"))).await
}

pub async fn spawn_server_with(
    store: Arc<dyn AuditStore>,
    credentials: Arc<dyn CredentialVerifier>,
) -> TestServer {
    let metrics = MetricsCollector::new().unwrap();
    let tokens = Arc::new(TokenService::new(TEST_SECRET, Duration::from_secs(86_400)));
    let state = AppState {
        tokens: tokens.clone(),
        credentials,
        audit: AuditLog::new(store, Duration::from_millis(500), metrics.clone()),
        metrics: metrics.clone(),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&AppConfig::default(), state);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap();

    TestServer {
        addr,
        client,
        tokens,
        metrics,
        shutdown,
    }
}

/// Poll until `store` holds at least `expected` records.
pub async fn wait_for_records(store: &MemoryAuditStore, expected: usize) {
    for _ in 0..200 {
        if store.len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} audit records, found {}", expected, store.len());
}
