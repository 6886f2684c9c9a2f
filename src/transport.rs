//! Transport boundary between resource clients and the network.
//!
//! Resource clients describe each call as an [`HttpRequest`] and hand it to a
//! [`Transport`]. The default transport is [`crate::ApiClient`]; tests and
//! embedders can supply their own.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::Value;

use crate::ClientError;

/// An HTTP request described as plain data.
///
/// Built by [`crate::request::build_request`]. The URL is already resolved
/// against the API base and carries its query string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body. Absent for methods that do not carry one.
    pub body: Option<String>,
    /// Whether credentials (the configured access token) should be attached.
    pub with_credentials: bool,
}

impl HttpRequest {
    /// Returns the value of the first header matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the decoded query pairs of the request URL.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Executes requests and returns the decoded JSON response.
///
/// Implementations must map non-success statuses and undecodable bodies to
/// errors; successful empty bodies decode to [`Value::Null`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<Value, ClientError>;
}
