//! Request building: URL resolution, query strings and default options.

use reqwest::{Method, Url};
use serde_json::Value;

use crate::ClientError;
use crate::transport::HttpRequest;

/// Media type negotiated with the API.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Per-request transport options.
///
/// Unset fields fall back to [`RequestOptions::defaults`] when a request is
/// built; set fields override them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub with_credentials: Option<bool>,
}

impl RequestOptions {
    /// JSON:API content negotiation with credentials included.
    pub fn defaults() -> Self {
        Self {
            content_type: Some(JSON_API_MEDIA_TYPE.to_owned()),
            accept: Some(JSON_API_MEDIA_TYPE.to_owned()),
            with_credentials: Some(true),
        }
    }

    /// Returns `self` with every option set in `overrides` replaced.
    #[must_use]
    pub fn merged_with(self, overrides: &RequestOptions) -> Self {
        Self {
            content_type: overrides.content_type.clone().or(self.content_type),
            accept: overrides.accept.clone().or(self.accept),
            with_credentials: overrides.with_credentials.or(self.with_credentials),
        }
    }
}

/// Description of one API call before it is resolved against the base URL.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestParams {
    /// Path relative to the API base, e.g. `nodes/abc12/`.
    pub url: String,
    pub query: Vec<(String, String)>,
    /// Request body; serialized as JSON, `{}` when absent.
    pub data: Option<Value>,
    /// Defaults to `GET`.
    pub method: Option<Method>,
    pub options: RequestOptions,
}

impl RequestParams {
    /// A `GET` request for `url` with no query string.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Short `METHOD path` label used in logs and error reports.
    pub fn label(&self) -> String {
        let method = self.method.clone().unwrap_or(Method::GET);
        format!("{method} {}", self.url)
    }
}

/// Builds a transport request from `params`, resolved against `base_url`.
///
/// The JSON body is only attached for methods that carry one; `GET` and `HEAD`
/// requests never have a body.
pub fn build_request(base_url: &Url, params: RequestParams) -> Result<HttpRequest, ClientError> {
    let url = build_url(base_url, &params.url, &params.query)?;
    let method = params.method.unwrap_or(Method::GET);
    let options = RequestOptions::defaults().merged_with(&params.options);

    let body = if matches!(method, Method::GET | Method::HEAD) {
        None
    } else {
        let data = params.data.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        Some(serde_json::to_string(&data)?)
    };

    let mut headers = Vec::with_capacity(2);
    if let Some(accept) = options.accept {
        headers.push((reqwest::header::ACCEPT.as_str().to_owned(), accept));
    }
    if let Some(content_type) = options.content_type {
        headers.push((reqwest::header::CONTENT_TYPE.as_str().to_owned(), content_type));
    }

    Ok(HttpRequest {
        method,
        url,
        headers,
        body,
        with_credentials: options.with_credentials.unwrap_or(false),
    })
}

/// Resolves `path` against `base_url` and appends `query`.
///
/// Leading slashes on `path` are ignored so that paths stay relative to the
/// base (which may itself carry a prefix such as `/v2/`). A path that would
/// resolve outside the base (another origin, or above its prefix) is rejected.
pub fn build_url(base_url: &Url, path: &str, query: &[(String, String)]) -> Result<Url, ClientError> {
    let base_url = ensure_trailing_slash(base_url.clone());
    let relative = path.trim_start_matches('/');
    let mut url = base_url
        .join(relative)
        .map_err(|_| ClientError::InvalidPath(path.to_owned()))?;

    if url.origin() != base_url.origin() || !url.path().starts_with(base_url.path()) {
        return Err(ClientError::InvalidPath(path.to_owned()));
    }

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// Parses and normalizes an API base URL.
pub fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let parsed =
        Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_owned()))?;
    if parsed.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl(base_url.to_owned()));
    }
    Ok(ensure_trailing_slash(parsed))
}

/// Percent-encodes `value` for use as a single path segment.
pub(crate) fn encode_path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let mut path = url.path().to_owned();
        path.push('/');
        url.set_path(&path);
    }
    url
}
