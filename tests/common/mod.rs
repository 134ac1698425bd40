//! Test scaffolding: a stub listing backend plus the app itself, both bound
//! to ephemeral ports and driven over real HTTP.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use serde_json::{json, Value};

use varanda::api::ApiClient;
use varanda::config::Config;
use varanda::routes;
use varanda::session::SessionStore;
use varanda::state::AppState;

/// Canned collections served by the stub backend, using the backend's own
/// wire format.
#[derive(Clone, Default)]
pub struct StubData {
    pub users: Vec<Value>,
    pub neighborhoods: Vec<Value>,
    /// Swapped in for the neighborhoods list once any write lands, so tests
    /// can check that pages re-fetch instead of patching locally.
    pub neighborhoods_after_mutation: Option<Vec<Value>>,
    pub property_types: Vec<Value>,
    pub properties: Vec<Value>,
    pub photos: Vec<Value>,
    /// Every `/api` route answers 500.
    pub fail_api: bool,
    /// Only the single-property GET answers 500; the list stays up.
    pub fail_single_property: bool,
}

#[derive(Clone)]
struct Shared {
    data: Arc<StubData>,
    hits: Arc<Mutex<Vec<String>>>,
    mutated: Arc<AtomicBool>,
}

pub struct StubBackend {
    pub base_url: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl StubBackend {
    /// Every request seen so far, as `METHOD /path`.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    /// Writes against the API surface (login excluded).
    pub fn api_write_count(&self) -> usize {
        self.hits()
            .iter()
            .filter(|hit| hit.contains(" /api/") && !hit.starts_with("GET"))
            .count()
    }
}

pub async fn spawn_backend(data: StubData) -> StubBackend {
    let shared = Shared {
        data: Arc::new(data),
        hits: Arc::new(Mutex::new(Vec::new())),
        mutated: Arc::new(AtomicBool::new(false)),
    };
    let hits = shared.hits.clone();

    let app = Router::new().fallback(handle).with_state(shared);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubBackend {
        base_url: format!("http://{}", addr),
        hits,
    }
}

async fn handle(State(shared): State<Shared>, req: Request) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    shared
        .hits
        .lock()
        .unwrap()
        .push(format!("{} {}", method, path));

    if shared.data.fail_api && path.starts_with("/api") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "backend down").into_response();
    }

    let mutated = shared.mutated.load(Ordering::SeqCst);

    match (method.as_str(), path.as_str()) {
        ("POST", "/login") => {
            let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
                .await
                .unwrap_or_default();
            let credentials: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            let email = credentials["email"].as_str().unwrap_or_default();
            match shared
                .data
                .users
                .iter()
                .find(|u| u["email"].as_str() == Some(email))
            {
                Some(user) => Json(user.clone()).into_response(),
                None => (StatusCode::UNAUTHORIZED, "invalid credentials").into_response(),
            }
        }
        ("GET", "/api/usuarios") => Json(shared.data.users.clone()).into_response(),
        ("GET", "/api/bairros") => {
            let list = if mutated {
                shared
                    .data
                    .neighborhoods_after_mutation
                    .clone()
                    .unwrap_or_else(|| shared.data.neighborhoods.clone())
            } else {
                shared.data.neighborhoods.clone()
            };
            Json(list).into_response()
        }
        ("GET", "/api/tipos-imoveis") => Json(shared.data.property_types.clone()).into_response(),
        ("GET", "/api/imoveis") => Json(shared.data.properties.clone()).into_response(),
        ("GET", "/api/fotos-imoveis") => Json(shared.data.photos.clone()).into_response(),
        ("GET", single) if single.starts_with("/api/imoveis/") => {
            if shared.data.fail_single_property {
                return (StatusCode::INTERNAL_SERVER_ERROR, "single fetch broken").into_response();
            }
            let id: Option<i64> = single
                .trim_start_matches("/api/imoveis/")
                .parse()
                .ok();
            match shared
                .data
                .properties
                .iter()
                .find(|p| p["id"].as_i64() == id)
            {
                Some(property) => Json(property.clone()).into_response(),
                None => (StatusCode::NOT_FOUND, "property not found").into_response(),
            }
        }
        ("POST", _) | ("PUT", _) => {
            shared.mutated.store(true, Ordering::SeqCst);
            Json(json!({})).into_response()
        }
        ("DELETE", _) => {
            shared.mutated.store(true, Ordering::SeqCst);
            // Success with an empty body, like the real backend.
            Response::new(Body::empty())
        }
        _ => (StatusCode::NOT_FOUND, "no such route").into_response(),
    }
}

/// Boot the dashboard against `backend_url` and return its base URL.
pub async fn spawn_app(backend_url: &str) -> String {
    let mut config = Config::default();
    config.backend.base_url = backend_url.to_string();

    let state = AppState {
        api: ApiClient::new(backend_url, Duration::from_secs(5)).unwrap(),
        sessions: SessionStore::in_memory().unwrap(),
        config,
    };

    let app = routes::router().with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn admin_user() -> Value {
    json!({"id": 1, "nome": "Alice", "email": "admin@example.com", "tipo": "administrador"})
}

pub fn broker_user() -> Value {
    json!({"id": 2, "nome": "Bruno", "email": "broker@example.com", "tipo": "corretor"})
}

pub fn client_user() -> Value {
    json!({"id": 3, "nome": "Carla", "email": "client@example.com", "tipo": "cliente"})
}

/// Browser-like client: cookie jar on, redirects followed.
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap()
}

/// Client that reports redirects instead of following them.
pub fn raw_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub async fn sign_in(client: &reqwest::Client, app: &str, email: &str) {
    let response = client
        .post(format!("{}/login", app))
        .form(&[("email", email), ("password", "123456")])
        .send()
        .await
        .unwrap();
    assert!(
        response.status().is_success(),
        "sign-in failed with {}",
        response.status()
    );
}
