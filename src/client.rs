use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::ClientError;
use crate::transport::{HttpRequest, Transport};

/// Async JSON HTTP transport backed by `reqwest`.
///
/// This is the default [`Transport`] used by [`crate::ApiContext`]. It executes
/// fully built [`HttpRequest`] values and does not know about resources.
#[derive(Clone, Debug, Default)]
pub struct ApiClient {
    authorization_token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a transport with a fresh connection pool and no credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport around an existing `reqwest` client.
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self {
            authorization_token: None,
            http,
        }
    }

    /// Returns a new transport with an access token attached to credentialed requests.
    ///
    /// This sets `Authorization: Bearer <token>` on requests built with
    /// credentials enabled (the default for resource clients).
    #[must_use]
    pub fn with_authorization_token(mut self, token: impl Into<String>) -> Self {
        self.authorization_token = Some(token.into());
        self
    }

    /// Sends a request and parses the response as JSON.
    ///
    /// Returns [`Value::Null`] for successful responses with an empty body.
    pub async fn execute(&self, request: HttpRequest) -> Result<Value, ClientError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let carries_body = !matches!(request.method, Method::GET | Method::HEAD);
        let mut builder = self.http.request(request.method, request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let with_credentials = request.with_credentials;
        if let Some(token) = self
            .authorization_token
            .as_ref()
            .filter(|_| with_credentials)
        {
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = request.body.filter(|_| carries_body) {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let payload = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                status,
                body: payload,
            });
        }

        if payload.trim().is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&payload)?)
        }
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn send(&self, request: HttpRequest) -> Result<Value, ClientError> {
        self.execute(request).await
    }
}
