use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Failures talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-success status. The message is the raw response body, which is
    /// what the backend uses to describe its errors.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

const EMPTY_BODY_FALLBACK: &str = "request failed";

/// Thin client over the listing backend's REST surface.
///
/// One wrapper per verb plus a multipart upload, all funneled through the
/// same response handling: non-success statuses become [`ApiError::Status`]
/// carrying the body text, successful empty bodies decode as an empty
/// object. No retries and no auth header; the backend is open by design.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::handle(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::handle(response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.put(self.url(path)).json(body).send().await?;
        Self::handle(response).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.delete(self.url(path)).send().await?;
        Self::handle(response).await
    }

    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        let response = self.http.post(self.url(path)).multipart(form).send().await?;
        Self::handle(response).await
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = if text.is_empty() {
                EMPTY_BODY_FALLBACK.to_string()
            } else {
                text
            };
            return Err(ApiError::Status { status, message });
        }

        let value: serde_json::Value = if text.is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&text)?
        };
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http;

    fn response(status: u16, body: &str) -> Response {
        Response::from(
            http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn success_body_is_parsed_as_json() {
        let value: serde_json::Value =
            ApiClient::handle(response(200, r#"[{"id":1}]"#)).await.unwrap();
        assert_eq!(value[0]["id"], 1);
    }

    #[tokio::test]
    async fn empty_success_body_yields_an_empty_object() {
        let value: serde_json::Value = ApiClient::handle(response(200, "")).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn failure_carries_the_raw_body_text() {
        let err = ApiClient::handle::<serde_json::Value>(response(400, "neighborhood in use"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "neighborhood in use");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn failure_with_empty_body_gets_the_fallback_message() {
        let err = ApiClient::handle::<serde_json::Value>(response(500, ""))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), EMPTY_BODY_FALLBACK);
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let err = ApiClient::handle::<serde_json::Value>(response(200, "not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn base_url_loses_its_trailing_slash() {
        let client = ApiClient::new("http://localhost:9000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/api/imoveis"), "http://localhost:9000/api/imoveis");
    }
}
