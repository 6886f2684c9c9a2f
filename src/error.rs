use thiserror::Error;

/// Errors returned by resource client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL is not a valid absolute URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// Endpoint path could not be joined to the base URL.
    #[error("invalid endpoint path '{0}'")]
    InvalidPath(String),

    /// A resource client was configured without a model, path segment or name.
    #[error("resource client requires at least one of model, path segment or name")]
    InvalidResource,

    /// The client has no path segment (or name) to address the resource with.
    #[error("resource '{0}' has no path segment to request")]
    MissingPathSegment(String),

    /// HTTP transport-layer request failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body could not be parsed as JSON.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success HTTP status with response payload.
    #[error("server returned status {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Response JSON did not carry the expected `data` member.
    #[error("malformed response envelope: {0}")]
    MalformedEnvelope(String),
}

impl ClientError {
    /// HTTP status code associated with the failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(status.as_u16()),
            Self::Request(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
