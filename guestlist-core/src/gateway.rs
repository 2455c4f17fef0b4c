use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::{ApiConfig, REQUEST_TIMEOUT};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// A transport failure, including timeouts. Recovered by user-initiated retry.
    #[error("Network error: {0}")]
    Network(String),
    /// The server refused the request. `detail` carries the server's own
    /// message and is surfaced to the user verbatim when present.
    #[error("Request failed with status {status}")]
    Status { status: u16, detail: Option<String> },
    /// The response body was not the JSON we expected
    #[error("Malformed response: {0}")]
    Parse(String),
    #[error("Invalid base URL: {0}")]
    BaseUrl(String),
}

impl ApiError {
    /// The server-supplied error detail, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Represents a type that can issue requests against the backend API.
/// Paths are relative to the `/api` root and responses are parsed JSON.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, ApiError>;
    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError>;
    async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError>;
    async fn delete(&self, path: &str) -> Result<Value, ApiError>;

    /// Installs or removes the bearer token attached to subsequent requests
    fn set_token(&self, token: Option<String>);
}

/// The concrete gateway, wrapping a [reqwest::Client] with base URL
/// resolution and auth-token attachment. No retries, no circuit breaking;
/// a failure surfaces as a single rejected operation.
pub struct ApiGateway {
    base: String,
    client: Client,
    token: Mutex<Option<String>>,
}

impl ApiGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let host = config.resolve_base_url();
        let base = format!("{}/api", host.trim_end_matches('/'));

        // Validated once here so request paths can be joined by concatenation
        Url::parse(&base).map_err(|e| ApiError::BaseUrl(e.to_string()))?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            base,
            client,
            token: Default::default(),
        })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base, path);
        let mut request = self.client.request(method, &url);

        if let Some(token) = self.token.lock().clone() {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: extract_detail(&text),
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ApiClient for ApiGateway {
    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None).await
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.lock() = token;
    }
}

/// Error responses carry a `detail` string field when the server has
/// something to say about the rejection.
fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("detail")?
        .as_str()
        .map(str::to_string)
}
