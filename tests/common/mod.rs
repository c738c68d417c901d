//! In-memory stand-in for the Apigee management API.
//!
//! Serves the caches and key-value map endpoints under `/v1/o/:org/e/:env`
//! on an ephemeral port, records every request, and can be told to fail
//! the next requests with a given status.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use apigee_provider::client::RetryConfig;
use apigee_provider::{ApigeeClient, Config};

pub const ORGANIZATION: &str = "acme";

type Key = (String, String);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredKvm {
    pub encrypted: bool,
    pub entries: BTreeMap<String, String>,
}

#[derive(Default)]
pub struct MockState {
    pub caches: HashMap<Key, Value>,
    pub kvms: HashMap<Key, StoredKvm>,
    /// "METHOD /path" for every request received
    pub requests: Vec<String>,
    pub fail_next: VecDeque<StatusCode>,
    /// Private installations accept a PUT of the whole map
    pub bulk_replace: bool,
}

#[derive(Clone, Default)]
pub struct MockApigee {
    state: Arc<Mutex<MockState>>,
}

impl MockApigee {
    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn requests(&self) -> Vec<String> {
        self.with(|s| s.requests.clone())
    }

    pub fn clear_requests(&self) {
        self.with(|s| s.requests.clear());
    }

    pub fn fail_next(&self, status: StatusCode) {
        self.with(|s| s.fail_next.push_back(status));
    }

    pub fn cache(&self, env: &str, name: &str) -> Option<Value> {
        self.with(|s| s.caches.get(&key(env, name)).cloned())
    }

    pub fn kvm(&self, env: &str, name: &str) -> Option<StoredKvm> {
        self.with(|s| s.kvms.get(&key(env, name)).cloned())
    }

    pub fn insert_kvm(&self, env: &str, name: &str, kvm: StoredKvm) {
        self.with(|s| s.kvms.insert(key(env, name), kvm));
    }
}

fn key(env: &str, name: &str) -> Key {
    (env.to_string(), name.to_string())
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"code": status.as_u16(), "message": message}))).into_response()
}

// == Middleware ==
async fn record_and_authorize(State(mock): State<MockApigee>, req: Request, next: Next) -> Response {
    let line = format!("{} {}", req.method(), req.uri().path());
    let injected = mock.with(|s| {
        s.requests.push(line);
        s.fail_next.pop_front()
    });
    if let Some(status) = injected {
        return error(status, "injected failure");
    }
    if req.headers().get(AUTHORIZATION).is_none() {
        return error(StatusCode::UNAUTHORIZED, "missing credentials");
    }
    next.run(req).await
}

// == Cache Handlers ==
async fn create_cache(
    State(mock): State<MockApigee>,
    Path((_org, env)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let Some(name) = body["name"].as_str().map(str::to_string) else {
        return error(StatusCode::BAD_REQUEST, "name is required");
    };
    mock.with(|s| {
        if s.caches.contains_key(&key(&env, &name)) {
            return error(StatusCode::CONFLICT, "cache already exists");
        }
        s.caches.insert(key(&env, &name), body.clone());
        (StatusCode::CREATED, Json(body)).into_response()
    })
}

async fn get_cache(
    State(mock): State<MockApigee>,
    Path((_org, env, name)): Path<(String, String, String)>,
) -> Response {
    match mock.cache(&env, &name) {
        None => error(StatusCode::NOT_FOUND, "cache not found"),
        Some(mut body) => {
            // The real API reports the threshold as a string
            if let Some(kb) = body.get("skipCacheIfElementSizeInKBExceeds").cloned() {
                body["skipCacheIfElementSizeInKBExceeds"] = Value::String(kb.to_string());
            }
            Json(body).into_response()
        }
    }
}

async fn update_cache(
    State(mock): State<MockApigee>,
    Path((_org, env, name)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    mock.with(|s| match s.caches.get_mut(&key(&env, &name)) {
        None => error(StatusCode::NOT_FOUND, "cache not found"),
        Some(stored) => {
            *stored = body.clone();
            Json(body).into_response()
        }
    })
}

async fn delete_cache(
    State(mock): State<MockApigee>,
    Path((_org, env, name)): Path<(String, String, String)>,
) -> Response {
    match mock.with(|s| s.caches.remove(&key(&env, &name))) {
        None => error(StatusCode::NOT_FOUND, "cache not found"),
        Some(body) => Json(body).into_response(),
    }
}

// == Key-Value Map Handlers ==
fn parse_entries(body: &Value) -> BTreeMap<String, String> {
    body["entry"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .map(|e| {
                    (
                        e["name"].as_str().unwrap_or_default().to_string(),
                        e["value"].as_str().unwrap_or_default().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn kvm_json(name: &str, kvm: &StoredKvm) -> Value {
    let entries: Vec<Value> = kvm
        .entries
        .iter()
        .map(|(k, v)| json!({"name": k, "value": v}))
        .collect();
    json!({"name": name, "encrypted": kvm.encrypted, "entry": entries})
}

async fn create_kvm(
    State(mock): State<MockApigee>,
    Path((_org, env)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let Some(name) = body["name"].as_str().map(str::to_string) else {
        return error(StatusCode::BAD_REQUEST, "name is required");
    };
    let kvm = StoredKvm {
        encrypted: body["encrypted"].as_bool().unwrap_or(false),
        entries: parse_entries(&body),
    };
    mock.with(|s| {
        if s.kvms.contains_key(&key(&env, &name)) {
            return error(StatusCode::CONFLICT, "map already exists");
        }
        let response = kvm_json(&name, &kvm);
        s.kvms.insert(key(&env, &name), kvm);
        (StatusCode::CREATED, Json(response)).into_response()
    })
}

async fn get_kvm(
    State(mock): State<MockApigee>,
    Path((_org, env, name)): Path<(String, String, String)>,
) -> Response {
    match mock.kvm(&env, &name) {
        None => error(StatusCode::NOT_FOUND, "map not found"),
        Some(kvm) => Json(kvm_json(&name, &kvm)).into_response(),
    }
}

async fn replace_kvm(
    State(mock): State<MockApigee>,
    Path((_org, env, name)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    mock.with(|s| {
        if !s.bulk_replace {
            return error(StatusCode::METHOD_NOT_ALLOWED, "bulk replace not supported");
        }
        match s.kvms.get_mut(&key(&env, &name)) {
            None => error(StatusCode::NOT_FOUND, "map not found"),
            Some(kvm) => {
                kvm.entries = parse_entries(&body);
                Json(kvm_json(&name, kvm)).into_response()
            }
        }
    })
}

async fn delete_kvm(
    State(mock): State<MockApigee>,
    Path((_org, env, name)): Path<(String, String, String)>,
) -> Response {
    match mock.with(|s| s.kvms.remove(&key(&env, &name))) {
        None => error(StatusCode::NOT_FOUND, "map not found"),
        Some(kvm) => Json(kvm_json(&name, &kvm)).into_response(),
    }
}

async fn add_entry(
    State(mock): State<MockApigee>,
    Path((_org, env, name)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let entry_name = body["name"].as_str().unwrap_or_default().to_string();
    let value = body["value"].as_str().unwrap_or_default().to_string();
    mock.with(|s| match s.kvms.get_mut(&key(&env, &name)) {
        None => error(StatusCode::NOT_FOUND, "map not found"),
        Some(kvm) if kvm.entries.contains_key(&entry_name) => {
            error(StatusCode::CONFLICT, "entry already exists")
        }
        Some(kvm) => {
            kvm.entries.insert(entry_name, value);
            (StatusCode::CREATED, Json(body)).into_response()
        }
    })
}

async fn modify_entry(
    State(mock): State<MockApigee>,
    Path((_org, env, name, entry_name)): Path<(String, String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let value = body["value"].as_str().unwrap_or_default().to_string();
    mock.with(|s| {
        let entry = s
            .kvms
            .get_mut(&key(&env, &name))
            .and_then(|kvm| kvm.entries.get_mut(&entry_name));
        match entry {
            None => error(StatusCode::NOT_FOUND, "entry not found"),
            Some(stored) => {
                *stored = value;
                Json(body).into_response()
            }
        }
    })
}

async fn delete_entry(
    State(mock): State<MockApigee>,
    Path((_org, env, name, entry_name)): Path<(String, String, String, String)>,
) -> Response {
    let removed = mock.with(|s| {
        s.kvms
            .get_mut(&key(&env, &name))
            .and_then(|kvm| kvm.entries.remove(&entry_name))
    });
    match removed {
        None => error(StatusCode::NOT_FOUND, "entry not found"),
        Some(value) => Json(json!({"name": entry_name, "value": value})).into_response(),
    }
}

// == Server ==
fn router(mock: MockApigee) -> Router {
    Router::new()
        .route("/v1/o/:org/e/:env/caches", post(create_cache))
        .route(
            "/v1/o/:org/e/:env/caches/:name",
            get(get_cache).put(update_cache).delete(delete_cache),
        )
        .route("/v1/o/:org/e/:env/keyvaluemaps", post(create_kvm))
        .route(
            "/v1/o/:org/e/:env/keyvaluemaps/:name",
            get(get_kvm).put(replace_kvm).delete(delete_kvm),
        )
        .route("/v1/o/:org/e/:env/keyvaluemaps/:name/entries", post(add_entry))
        .route(
            "/v1/o/:org/e/:env/keyvaluemaps/:name/entries/:entry",
            post(modify_entry).delete(delete_entry),
        )
        .layer(middleware::from_fn_with_state(mock.clone(), record_and_authorize))
        .layer(TraceLayer::new_for_http())
        .with_state(mock)
}

/// Fast retries so injected 503s do not slow the suite down.
pub fn test_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(10),
        factor: 2.0,
    }
}

/// Starts a mock server and returns it with a client pointed at it.
///
/// `public` selects the deployment mode; a private server accepts bulk replace.
pub async fn spawn(public: bool) -> (MockApigee, ApigeeClient) {
    let mock = MockApigee::default();
    mock.with(|s| s.bulk_replace = !public);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(mock.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = Config {
        organization: ORGANIZATION.to_string(),
        username: "admin@acme.com".to_string(),
        password: "secret".to_string(),
        base_url: Some(format!("http://{}/v1", addr)),
        ..Config::default()
    };
    let client = ApigeeClient::from_config(&config)
        .unwrap()
        .with_public(public)
        .with_retry(test_retry());
    (mock, client)
}

/// Builds client configuration that sends no credentials.
pub fn anonymous_client(client: &ApigeeClient) -> ApigeeClient {
    let config = Config {
        organization: ORGANIZATION.to_string(),
        base_url: Some(client.base_url().to_string()),
        ..Config::default()
    };
    ApigeeClient::from_config(&config)
        .unwrap()
        .with_retry(RetryConfig::none())
}
