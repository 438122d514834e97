#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;

use workforce_client::config::ClientConfig;
use workforce_client::http::{ApiClient, ChannelNavigator};
use workforce_client::session::{MemorySessionStore, Session, SessionHandle};

pub const VALID_TOKEN: &str = "tok-123";

/// In-process stand-in for the workforce REST backend
pub struct FakeBackend {
    pub port: u16,
    pub base_url: String,
    state: Arc<BackendState>,
}

#[derive(Default)]
struct BackendState {
    authorization: Mutex<Vec<Option<String>>>,
    lookups: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind fake backend")?;

        let state = Arc::new(BackendState::default());
        let app = router(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        })
    }

    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::with_base_url(self.api_url())
    }

    /// Authorization header of every request received, in order
    pub fn authorization_seen(&self) -> Vec<Option<String>> {
        self.state.authorization.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// `field?param=value` of every lookup request received, in order
    pub fn lookups_seen(&self) -> Vec<String> {
        self.state.lookups.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

/// Client wired to a navigable context, with its store and navigation feed
pub struct TestClient {
    pub client: ApiClient,
    pub store: Arc<MemorySessionStore>,
    pub navigations: UnboundedReceiver<String>,
}

impl TestClient {
    pub fn new(backend: &FakeBackend, session: Option<Session>) -> Result<Self> {
        let store = Arc::new(match session {
            Some(s) => MemorySessionStore::with_session(s),
            None => MemorySessionStore::new(),
        });
        let handle = SessionHandle::new(store.clone());
        let (navigator, navigations) = ChannelNavigator::new();
        let client = ApiClient::new(&backend.config(), handle, Arc::new(navigator))?;

        Ok(Self { client, store, navigations })
    }

    pub async fn signed_in(backend: &FakeBackend, token: &str) -> Result<Self> {
        let test_client = Self::new(backend, None)?;
        test_client
            .client
            .session()
            .begin(Session::new(token, "7", "Admin", 1))
            .await?;
        Ok(test_client)
    }

    pub fn drain_navigations(&mut self) -> Vec<String> {
        let mut paths = Vec::new();
        while let Ok(path) = self.navigations.try_recv() {
            paths.push(path);
        }
        paths
    }
}

fn router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/api/Auth/login", post(login))
        .route("/api/Client", get(clients))
        .route("/api/Client/:id", get(client_by_id).delete(delete_client))
        .route("/api/Timesheet", get(timesheets))
        .route("/api/echo", get(echo).post(echo_body))
        .route("/api/expired", get(|| async { unauthorized() }))
        .route("/api/slow-expired", get(slow_unauthorized))
        .route("/api/boom", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "boom" }))) }))
        .route("/api/Lookup/domains", get(domains))
        .route("/api/Lookup/roles", get(roles))
        .route("/api/Lookup/levels", get(levels))
        .layer(middleware::from_fn_with_state(state.clone(), record_authorization))
        .with_state(state)
}

async fn record_authorization(State(state): State<Arc<BackendState>>, request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Ok(mut seen) = state.authorization.lock() {
        seen.push(header);
    }
    next.run(request).await
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Token expired" }))).into_response()
}

// Rejects after a delay, leaving room for a fresh login in the meantime
async fn slow_unauthorized() -> Response {
    tokio::time::sleep(Duration::from_millis(300)).await;
    unauthorized()
}

fn bearer_ok(request_headers: &axum::http::HeaderMap) -> bool {
    request_headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", VALID_TOKEN))
        .unwrap_or(false)
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        Json(json!({ "accessToken": VALID_TOKEN, "userId": 7, "role": "Admin", "roleId": 1 })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" }))).into_response()
    }
}

async fn clients(headers: axum::http::HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    Json(json!({
        "items": [{ "id": 1, "name": "Acme" }, { "id": 2, "name": "Globex" }],
        "totalCount": 2
    }))
    .into_response()
}

async fn client_by_id(headers: axum::http::HeaderMap, Path(id): Path<String>) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    match id.as_str() {
        "1" => Json(json!({ "id": 1, "name": "Acme" })).into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "message": "Client not found" }))).into_response(),
    }
}

async fn delete_client(headers: axum::http::HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn timesheets(headers: axum::http::HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    Json(json!([{ "id": 10, "hours": 8 }])).into_response()
}

async fn echo(headers: axum::http::HeaderMap) -> Json<Value> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    Json(json!({ "authorization": authorization }))
}

async fn echo_body(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "received": body }))
}

async fn domains() -> Json<Value> {
    Json(json!([
        { "id": 1, "name": "Eng", "isActive": true },
        { "id": 2, "name": "Sales", "isActive": true },
        { "id": 3, "name": "Legacy", "isActive": false },
    ]))
}

async fn roles(State(state): State<Arc<BackendState>>, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let domain = params.get("domainId").cloned().unwrap_or_default();
    if let Ok(mut seen) = state.lookups.lock() {
        seen.push(format!("roleId?domainId={}", domain));
    }

    // Engineering roles are slow so a later domain change can overtake them
    if domain == "1" {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    Json(match domain.as_str() {
        "1" => json!([{ "id": 11, "name": "Developer" }, { "id": 12, "name": "Architect" }]),
        "2" => json!([{ "id": 21, "name": "Account Exec" }, { "id": 22, "name": "Retired", "isActive": false }]),
        "5" => json!([{ "id": 12, "name": "Architect" }, { "id": 13, "name": "Tester" }]),
        _ => json!([]),
    })
}

async fn levels(State(state): State<Arc<BackendState>>, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let role = params.get("roleId").cloned().unwrap_or_default();
    if let Ok(mut seen) = state.lookups.lock() {
        seen.push(format!("levelId?roleId={}", role));
    }

    Json(match role.as_str() {
        "12" => json!([{ "id": 3, "name": "Senior" }, { "id": 4, "name": "Principal" }]),
        _ => json!([]),
    })
}
