//! Generic resource clients for the OSF JSON:API v2.
//!
//! Public API layers:
//! - [`ApiContext`]: base URL, transport and failure reporter shared by all
//!   clients.
//! - [`ResourceClient`]: `list`/`detail` for one resource, configured with a
//!   [`ResourceConfig`] (see [`resources`] for the declared ones).
//! - [`Model`]: one hydrated record. String values shaped like API collection
//!   URLs (`.../v2/<resource>/`) are turned into [`ResourceClient`]s during
//!   hydration, so related collections can be fetched directly.
//! - [`ClientError`]: unified error type used by all clients.

mod attribute;
mod client;
mod context;
mod error;
pub mod hydrate;
mod model;
pub mod request;
mod resource;
pub mod resources;
pub mod telemetry;
pub mod transport;

/// Hydrated attribute values.
pub use attribute::{Attribute, Attributes};
/// Default `reqwest` transport.
pub use client::ApiClient;
pub use context::{ApiContext, DEFAULT_API_URL};
/// Error type returned by all client operations.
pub use error::ClientError;
pub use hydrate::Hydrator;
pub use model::{Model, ModelKind};
pub use resource::{ListOptions, ListResponse, ResourceClient, ResourceConfig};
pub use telemetry::{ErrorReporter, RecordingReporter, ReportContext, TracingReporter};
pub use transport::{HttpRequest, Transport};
