use std::fmt;
use std::sync::Arc;

use reqwest::Url;

use crate::hydrate::Hydrator;
use crate::request::parse_base_url;
use crate::resource::{ResourceClient, ResourceConfig};
use crate::telemetry::{ErrorReporter, TracingReporter};
use crate::transport::Transport;
use crate::{ApiClient, ClientError};

/// Default API root.
pub const DEFAULT_API_URL: &str = "https://api.osf.io/v2/";

/// Shared configuration every resource client holds: the API base URL, the
/// transport requests go through and the sink failures are reported to.
///
/// Build one, wrap it in an [`Arc`] and hand it to [`ApiContext::client`].
/// Clients discovered during hydration share the same context.
pub struct ApiContext {
    base_url: Url,
    transport: Arc<dyn Transport>,
    reporter: Arc<dyn ErrorReporter>,
}

impl ApiContext {
    /// Creates a context with the given base URL, the default `reqwest`
    /// transport and a `tracing`-backed reporter.
    ///
    /// The URL is normalized to include a trailing slash, so relative
    /// resource paths join correctly.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: parse_base_url(base_url.as_ref())?,
            transport: Arc::new(ApiClient::new()),
            reporter: Arc::new(TracingReporter),
        })
    }

    /// Creates a context for [`DEFAULT_API_URL`].
    pub fn from_default_url() -> Result<Self, ClientError> {
        Self::new(DEFAULT_API_URL)
    }

    /// Replaces the transport with a default `reqwest` transport that sends
    /// `token` on credentialed requests.
    #[must_use]
    pub fn with_authorization_token(self, token: impl Into<String>) -> Self {
        self.with_transport(ApiClient::new().with_authorization_token(token))
    }

    #[must_use]
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn reporter(&self) -> &dyn ErrorReporter {
        self.reporter.as_ref()
    }

    /// Builds a resource client bound to this context.
    pub fn client(self: &Arc<Self>, config: ResourceConfig) -> Result<ResourceClient, ClientError> {
        ResourceClient::new(Arc::clone(self), config)
    }

    /// Returns a hydrator whose discovered links share this context.
    pub fn hydrator(self: &Arc<Self>) -> Hydrator {
        Hydrator::new(Arc::clone(self))
    }
}

impl fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiContext")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
