//! Adapter semantics against a live stub: status handling, empty bodies,
//! and the multipart upload shape.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, post};
use axum::Router;
use serde_json::json;

use varanda::api::{ApiClient, ApiError, PhotoUpload};
use varanda::models::{Role, User};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn delete_with_empty_success_body_resolves_to_an_empty_object() {
    let app = Router::new().route(
        "/api/fotos-imoveis/{id}",
        delete(|| async { StatusCode::OK }),
    );
    let url = spawn(app).await;

    let value: serde_json::Value = client(&url).delete("/api/fotos-imoveis/9").await.unwrap();
    assert_eq!(value, json!({}));
}

#[tokio::test]
async fn error_responses_surface_the_raw_body_text() {
    let app = Router::new().route(
        "/api/bairros",
        get(|| async { (StatusCode::CONFLICT, "neighborhood still referenced") }),
    );
    let url = spawn(app).await;

    let err = client(&url)
        .get::<serde_json::Value>("/api/bairros")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "neighborhood still referenced");
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
}

#[tokio::test]
async fn error_with_empty_body_falls_back_to_a_generic_message() {
    let app = Router::new().route(
        "/api/imoveis",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let url = spawn(app).await;

    let err = client(&url)
        .get::<serde_json::Value>("/api/imoveis")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "request failed");
}

#[tokio::test]
async fn login_decodes_the_user_record() {
    let app = Router::new().route(
        "/login",
        post(|| async {
            Json(json!({"id": 1, "nome": "Alice", "email": "admin@example.com", "role": "admin"}))
        }),
    );
    let url = spawn(app).await;

    let user: User = client(&url).login("admin@example.com", "123456").await.unwrap();
    assert_eq!(user.role, Role::Administrator);
    assert_eq!(user.name, "Alice");
}

#[tokio::test]
async fn transport_failures_are_not_status_errors() {
    // Nothing is listening on this port.
    let err = client("http://127.0.0.1:9")
        .get::<serde_json::Value>("/api/imoveis")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[derive(Clone, Default)]
struct SeenUpload(Arc<Mutex<Vec<(String, Option<String>, Option<String>, String)>>>);

async fn record_upload(State(seen): State<SeenUpload>, mut multipart: Multipart) -> Json<serde_json::Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let body = String::from_utf8_lossy(&field.bytes().await.unwrap()).to_string();
        seen.0.lock().unwrap().push((name, file_name, content_type, body));
    }
    Json(json!({}))
}

#[tokio::test]
async fn upload_sends_the_fields_the_backend_expects() {
    let seen = SeenUpload::default();
    let app = Router::new()
        .route("/api/fotos-imoveis/upload", post(record_upload))
        .with_state(seen.clone());
    let url = spawn(app).await;

    client(&url)
        .upload_photo(PhotoUpload {
            file_name: "front.jpg".into(),
            data: bytes::Bytes::from_static(b"jpegbytes"),
            property_id: 5,
            is_cover: true,
            order: 2,
        })
        .await
        .unwrap();

    let fields = seen.0.lock().unwrap().clone();
    let by_name = |name: &str| {
        fields
            .iter()
            .find(|(n, _, _, _)| n == name)
            .cloned()
            .unwrap_or_else(|| panic!("missing multipart field {}", name))
    };

    let (_, _, _, property_id) = by_name("imovelId");
    assert_eq!(property_id, "5");
    let (_, _, _, is_cover) = by_name("capa");
    assert_eq!(is_cover, "true");
    let (_, _, _, order) = by_name("ordem");
    assert_eq!(order, "2");
    let (_, file_name, content_type, body) = by_name("file");
    assert_eq!(file_name.as_deref(), Some("front.jpg"));
    assert_eq!(content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(body, "jpegbytes");
}
