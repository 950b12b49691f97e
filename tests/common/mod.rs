#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use marketplace_api::app::{self, AppState};
use marketplace_api::config::{AppConfig, StoreBackend};
use marketplace_api::database::MemoryStore;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// The real binary, on its own port, backed by the memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_marketplace-api"));
        cmd.arg("serve")
            .env("APP_ENV", "development")
            .env("STORE_BACKEND", "memory")
            .env("JWT_SECRET", "integration-test-secret")
            .env("MARKETPLACE_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// In-process router over a fresh memory store
pub fn app() -> Router {
    let mut config = AppConfig::development();
    config.database.backend = StoreBackend::Memory;
    config.api.enable_request_logging = false;
    config.security.jwt_secret = "router-test-secret".to_string();

    let state = AppState::new(Arc::new(MemoryStore::new()), &config);
    app::router(state, &config)
}

/// Send one request through the router; returns status and parsed JSON body
/// (`Value::Null` for empty bodies).
pub async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    call_with_token(app, method, uri, body, None).await
}

pub async fn call_with_token(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, uri, Some(body)).await
}

/// Register `name` with password "pw-<name>" and pick `role`; returns the profile id
pub async fn signup(app: &Router, name: &str, role: &str) -> i64 {
    let (status, body) = post(
        app,
        "/api/register",
        json!({"username": name, "email": format!("{}@example.com", name), "password": format!("pw-{}", name)}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {}: {}", name, body);

    let (status, body) = post(app, "/api/set-role", json!({"username": name, "role": role})).await;
    assert_eq!(status, StatusCode::OK, "set-role {}: {}", name, body);
    body["data"]["profile"]["id"].as_i64().unwrap()
}

pub async fn create_project(app: &Router, owner: i64, title: &str) -> i64 {
    let (status, body) = post(
        app,
        "/api/projects",
        json!({"owner": owner, "title": title, "description": "details", "budget": "1500.00", "duration": 30}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create project: {}", body);
    body["data"]["id"].as_i64().unwrap()
}

pub async fn create_proposal(app: &Router, project: i64, freelancer: i64) -> i64 {
    let (status, body) = post(
        app,
        "/api/proposals",
        json!({"project": project, "freelancer": freelancer, "description": "I can do it", "price": "1200.00"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create proposal: {}", body);
    body["data"]["id"].as_i64().unwrap()
}

/// Notifications for `user_name`, newest first
pub async fn inbox(app: &Router, user_name: &str) -> Vec<Value> {
    let (status, body) = get(app, &format!("/api/notifications?user_name={}", user_name)).await;
    assert_eq!(status, StatusCode::OK);
    body["data"].as_array().cloned().unwrap_or_default()
}
