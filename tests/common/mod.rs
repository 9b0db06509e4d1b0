// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test fixtures: a scriptable stub of the DriverXP backend and
//! helpers to wire a client against it.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use dashmap::DashMap;
use driverxp_client::config::Config;
use driverxp_client::storage::{MemoryStorage, SlotStorage};
use driverxp_client::AppState;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request as the stub saw it.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct StubState {
    responses: DashMap<String, (u16, Value)>,
    delays: DashMap<String, Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Backend stub listening on an ephemeral local port.
pub struct StubBackend {
    pub base_url: String,
    state: Arc<StubState>,
}

fn route_key(method: &str, path: &str) -> String {
    format!("{} {}", method.to_uppercase(), path)
}

#[allow(dead_code)]
impl StubBackend {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend");
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    /// Answer `method path` (path relative to `/api`) with `status` and `body`.
    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.state
            .responses
            .insert(route_key(method, path), (status, body));
    }

    /// Hold the response to `method path` for `delay`.
    pub fn delay(&self, method: &str, path: &str, delay: Duration) {
        self.state.delays.insert(route_key(method, path), delay);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self, method: &str, path: &str) -> Option<RecordedRequest> {
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.method == method.to_uppercase() && r.path == path)
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri
        .path()
        .strip_prefix("/api")
        .unwrap_or(uri.path())
        .to_string();
    let key = route_key(method.as_str(), &path);

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path,
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let delay = state.delays.get(&key).map(|d| *d);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let (status, body) = state
        .responses
        .get(&key)
        .map(|r| r.value().clone())
        .unwrap_or((404, json!({"status": "fail", "message": "Route not found"})));
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

/// Config pointing at `base_url` with a short timeout.
pub fn test_config(base_url: &str) -> Config {
    Config {
        api_url: base_url.to_string(),
        request_timeout: Duration::from_secs(2),
        ..Config::default()
    }
}

/// Client wired against `base_url` over `storage`.
pub fn test_app(base_url: &str, storage: &MemoryStorage) -> AppState {
    AppState::new(test_config(base_url), Arc::new(storage.clone())).expect("app state")
}

/// Identity record as the backend sends it.
#[allow(dead_code)]
pub fn user_json(id: &str, role: &str) -> Value {
    json!({
        "id": id,
        "firstName": "Alex",
        "lastName": "Driver",
        "email": format!("user{}@example.com", id),
        "phone": "555-0100",
        "role": role,
        "isActive": true,
        "createdAt": "2026-01-01T00:00:00.000Z",
        "updatedAt": "2026-01-01T00:00:00.000Z"
    })
}

/// Successful login/register body.
#[allow(dead_code)]
pub fn auth_success(token: &str, user: Value) -> Value {
    json!({
        "status": "success",
        "message": "Login successful",
        "data": {"user": user},
        "token": token
    })
}

/// Persist a valid pair as a previous run would have.
#[allow(dead_code)]
pub fn seed_session(storage: &MemoryStorage, token: &str, user: Value) {
    storage.set("driverxp_token", token).unwrap();
    storage.set("driverxp_user", &user.to_string()).unwrap();
}

/// Wait until the session store reaches a state matching `predicate`.
#[allow(dead_code)]
pub async fn wait_for_state<F>(app: &AppState, predicate: F)
where
    F: FnMut(&driverxp_client::session::SessionState) -> bool,
{
    let mut rx = app.session.subscribe();
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for session state")
        .expect("session store dropped");
}
