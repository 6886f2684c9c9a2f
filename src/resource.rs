//! Generic resource clients: `list` and `detail` over one API collection.

use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::ClientError;
use crate::context::ApiContext;
use crate::hydrate::Hydrator;
use crate::model::{Model, ModelKind};
use crate::request::{RequestParams, build_request, build_url, encode_path_segment};
use crate::telemetry::{ReportContext, capture};

/// Listing options forwarded as query parameters, with their wire names.
///
/// Anything not in this table is dropped.
const LISTING_QUERY_PARAMS: &[(&str, &str)] = &[("pageSize", "page[size]"), ("page", "page")];

/// Declares one resource: the model it yields, where it lives and what to
/// call it in error messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceConfig {
    pub model: Option<ModelKind>,
    pub path_segment: Option<String>,
    pub name: Option<String>,
}

impl ResourceConfig {
    pub fn new(model: ModelKind, path_segment: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            model: Some(model),
            path_segment: Some(path_segment.into()),
            name: Some(name.into()),
        }
    }

    /// Configuration for a link discovered during hydration: generic model,
    /// with `segment` as both path segment and name.
    pub fn generic(segment: &str) -> Self {
        Self::new(ModelKind::GENERIC, segment, segment)
    }
}

/// Client for one resource collection.
///
/// Cheap to clone; all configuration is fixed at construction.
#[derive(Clone)]
pub struct ResourceClient {
    model: ModelKind,
    path_segment: Option<String>,
    name: Option<String>,
    context: Arc<ApiContext>,
}

impl ResourceClient {
    /// Creates a client from `config`.
    ///
    /// Fails with [`ClientError::InvalidResource`] when the configuration has
    /// neither a model, a path segment nor a name.
    pub fn new(context: Arc<ApiContext>, config: ResourceConfig) -> Result<Self, ClientError> {
        let ResourceConfig {
            model,
            path_segment,
            name,
        } = config;
        let path_segment = path_segment.filter(|segment| !segment.is_empty());
        let name = name.filter(|name| !name.is_empty());
        if model.is_none() && path_segment.is_none() && name.is_none() {
            return Err(ClientError::InvalidResource);
        }
        Ok(Self {
            model: model.unwrap_or_default(),
            path_segment,
            name,
            context,
        })
    }

    /// Builds the client for a link found during hydration.
    pub(crate) fn linked(context: Arc<ApiContext>, config: ResourceConfig) -> Self {
        Self {
            model: config.model.unwrap_or_default(),
            path_segment: config.path_segment,
            name: config.name,
            context,
        }
    }

    pub fn model(&self) -> &ModelKind {
        &self.model
    }

    pub fn path_segment(&self) -> Option<&str> {
        self.path_segment.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn context(&self) -> &Arc<ApiContext> {
        &self.context
    }

    /// Label used in error messages: the name, else the path segment, else
    /// the model label.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.path_segment.as_deref())
            .unwrap_or_else(|| self.model.label())
    }

    /// Absolute URL of the collection, e.g. `https://api.osf.io/v2/nodes/`.
    pub fn collection_url(&self) -> Result<Url, ClientError> {
        build_url(self.context.base_url(), &format!("{}/", self.segment()?), &[])
    }

    /// Fetches one record by id and hydrates it.
    ///
    /// On failure the error is reported as `Could not fetch individual <name>.`
    /// and returned unchanged.
    #[instrument(skip(self), fields(resource = %self.display_name()))]
    pub async fn detail(&self, id: &str) -> Result<Model, ClientError> {
        let message = format!("Could not fetch individual {}.", self.display_name());
        let params = match self.segment() {
            Ok(segment) => RequestParams::get(format!("{segment}/{}/", encode_path_segment(id))),
            Err(error) => return Err(self.capture_error(&message, "", error)),
        };
        let label = params.label();

        let result = self.request(params).await.and_then(|response| {
            debug!(?response, "API returned");
            let record = envelope_record(&response)?;
            Ok(self.model.instantiate(&self.hydrator(), record))
        });
        result.map_err(|error| self.capture_error(&message, &label, error))
    }

    /// Fetches one page of the collection and hydrates every record, in
    /// response order.
    ///
    /// On failure the error is reported as `Could not fetch <name> list.` and
    /// returned unchanged.
    #[instrument(skip(self), fields(resource = %self.display_name()))]
    pub async fn list(&self, options: &ListOptions) -> Result<ListResponse, ClientError> {
        let message = format!("Could not fetch {} list.", self.display_name());
        let params = match self.segment() {
            Ok(segment) => RequestParams::get(format!("{segment}/")).with_query(options.query()),
            Err(error) => return Err(self.capture_error(&message, "", error)),
        };
        let label = params.label();

        let result = self.request(params).await.and_then(|response| {
            debug!(?response, "API returned");
            ListResponse::from_envelope(response, &self.model, &self.hydrator())
        });
        result.map_err(|error| self.capture_error(&message, &label, error))
    }

    /// Builds `params` against the API base and sends it through the transport.
    ///
    /// Errors are returned as-is; only `list` and `detail` report them.
    pub async fn request(&self, params: RequestParams) -> Result<Value, ClientError> {
        let request = build_request(self.context.base_url(), params)?;
        debug!(url = %request.url, "requested");
        self.context.transport().send(request).await
    }

    fn segment(&self) -> Result<&str, ClientError> {
        self.path_segment
            .as_deref()
            .or(self.name.as_deref())
            .ok_or_else(|| ClientError::MissingPathSegment(self.model.label().to_owned()))
    }

    fn hydrator(&self) -> Hydrator {
        self.context.hydrator()
    }

    fn capture_error(&self, message: &str, request: &str, error: ClientError) -> ClientError {
        let context = ReportContext {
            request: request.to_owned(),
            status: error.status(),
            error: error.to_string(),
        };
        capture(self.context.reporter(), message, &context);
        error
    }
}

impl fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("model", &self.model.label())
            .field("path_segment", &self.path_segment)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Clients are equal when they address the same resource the same way.
impl PartialEq for ResourceClient {
    fn eq(&self, other: &Self) -> bool {
        self.model == other.model
            && self.path_segment == other.path_segment
            && self.name == other.name
            && self.context.base_url() == other.context.base_url()
    }
}

/// Options for [`ResourceClient::list`], already translated to query pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    query: Vec<(String, String)>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translates loosely typed options (e.g. parsed from JSON), keeping only
    /// recognized keys. `null` values are treated as unset.
    pub fn from_params(params: &Map<String, Value>) -> Self {
        params
            .iter()
            .fold(Self::default(), |options, (key, value)| match value {
                Value::Null => options,
                Value::String(text) => options.with_option(key, text.clone()),
                other => options.with_option(key, other.to_string()),
            })
    }

    #[must_use]
    pub fn page_size(self, size: u32) -> Self {
        self.with_option("pageSize", size.to_string())
    }

    #[must_use]
    pub fn page(self, page: u32) -> Self {
        self.with_option("page", page.to_string())
    }

    pub fn query(&self) -> Vec<(String, String)> {
        self.query.clone()
    }

    fn with_option(mut self, key: &str, value: String) -> Self {
        let Some((_, wire_name)) = LISTING_QUERY_PARAMS.iter().find(|(name, _)| *name == key)
        else {
            return self;
        };
        match self
            .query
            .iter_mut()
            .find(|(name, _)| name.as_str() == *wire_name)
        {
            Some(slot) => slot.1 = value,
            None => self.query.push(((*wire_name).to_owned(), value)),
        }
        self
    }
}

/// Result of [`ResourceClient::list`]: the response envelope with `data`
/// replaced by hydrated models.
///
/// The other envelope members (`links`, `meta`) are kept as returned.
#[derive(Clone, Debug, PartialEq)]
pub struct ListResponse {
    pub data: Vec<Model>,
    pub envelope: Map<String, Value>,
}

impl ListResponse {
    fn from_envelope(response: Value, kind: &ModelKind, hydrator: &Hydrator) -> Result<Self, ClientError> {
        let Value::Object(mut envelope) = response else {
            return Err(ClientError::MalformedEnvelope(
                "expected a JSON object".to_owned(),
            ));
        };
        let Some(Value::Array(records)) = envelope.shift_remove("data") else {
            return Err(ClientError::MalformedEnvelope(
                "expected `data` to be an array".to_owned(),
            ));
        };
        let data = records
            .iter()
            .map(|record| kind.instantiate(hydrator, record))
            .collect();
        Ok(Self { data, envelope })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Model> {
        self.data.iter()
    }

    pub fn links(&self) -> Option<&Value> {
        self.envelope.get("links")
    }

    pub fn meta(&self) -> Option<&Value> {
        self.envelope.get("meta")
    }

    /// URL of the next page, when the server advertises one.
    pub fn next_page_url(&self) -> Option<&str> {
        self.links()?.get("next")?.as_str()
    }

    /// Drops the envelope and returns only the models.
    pub fn into_models(self) -> Vec<Model> {
        self.data
    }
}

impl IntoIterator for ListResponse {
    type Item = Model;
    type IntoIter = std::vec::IntoIter<Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a> IntoIterator for &'a ListResponse {
    type Item = &'a Model;
    type IntoIter = std::slice::Iter<'a, Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl Serialize for ListResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.envelope.len() + 1))?;
        map.serialize_entry("data", &self.data)?;
        for (key, value) in &self.envelope {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn envelope_record(response: &Value) -> Result<&Value, ClientError> {
    match response.get("data") {
        Some(record @ Value::Object(_)) => Ok(record),
        _ => Err(ClientError::MalformedEnvelope(
            "expected `data` to be an object".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::{Value, json};

    use super::{ListOptions, ResourceClient, ResourceConfig};
    use crate::context::ApiContext;
    use crate::model::ModelKind;
    use crate::telemetry::RecordingReporter;
    use crate::transport::{HttpRequest, Transport};
    use crate::ClientError;

    /// Transport that records requests and replays canned responses.
    #[derive(Clone, Default)]
    struct FakeTransport {
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        responses: Arc<Mutex<VecDeque<Result<Value, ClientError>>>>,
    }

    impl FakeTransport {
        fn respond(&self, response: Result<Value, ClientError>) {
            self.responses.lock().expect("lock").push_back(response);
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: HttpRequest) -> Result<Value, ClientError> {
            self.requests.lock().expect("lock").push(request);
            self.responses
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or(Ok(Value::Null))
        }
    }

    struct Fixture {
        transport: FakeTransport,
        reporter: Arc<RecordingReporter>,
        context: Arc<ApiContext>,
    }

    fn fixture() -> Fixture {
        let transport = FakeTransport::default();
        let reporter = Arc::new(RecordingReporter::new());
        let context = ApiContext::new("http://localhost:8000/v2/")
            .expect("valid url")
            .with_transport(transport.clone())
            .with_reporter(reporter.clone());
        Fixture {
            transport,
            reporter,
            context: Arc::new(context),
        }
    }

    fn nodes(context: &Arc<ApiContext>) -> ResourceClient {
        context
            .client(ResourceConfig::new(ModelKind::new("Node"), "nodes", "node"))
            .expect("valid config")
    }

    fn server_error() -> ClientError {
        ClientError::HttpStatus {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "oops".to_owned(),
        }
    }

    #[test]
    fn rejects_empty_configuration() {
        let fixture = fixture();
        let error = fixture
            .context
            .client(ResourceConfig::default())
            .expect_err("empty config should fail");
        assert!(matches!(error, ClientError::InvalidResource));

        let blank = ResourceConfig {
            path_segment: Some(String::new()),
            ..ResourceConfig::default()
        };
        assert!(fixture.context.client(blank).is_err());
    }

    #[test]
    fn partial_configuration_falls_back_for_path_and_label() {
        let fixture = fixture();
        let client = fixture
            .context
            .client(ResourceConfig {
                name: Some("widgets".to_owned()),
                ..ResourceConfig::default()
            })
            .expect("name alone is enough");
        assert_eq!(client.model(), &ModelKind::GENERIC);
        assert_eq!(client.display_name(), "widgets");
        assert_eq!(
            client.collection_url().expect("url").as_str(),
            "http://localhost:8000/v2/widgets/"
        );
    }

    #[test]
    fn list_options_keep_only_recognized_keys() {
        let params = json!({"pageSize": 50, "bogus": 1, "page": "2"});
        let options = ListOptions::from_params(params.as_object().expect("object"));
        assert_eq!(
            options.query(),
            vec![
                ("page[size]".to_owned(), "50".to_owned()),
                ("page".to_owned(), "2".to_owned())
            ]
        );
        assert_eq!(ListOptions::new().page_size(10).page_size(20).query().len(), 1);
    }

    #[test]
    fn list_options_treat_null_as_unset() {
        let params = json!({"pageSize": null, "page": null});
        let options = ListOptions::from_params(params.as_object().expect("object"));
        assert!(options.query().is_empty());

        let params = json!({"pageSize": 25, "page": null});
        let options = ListOptions::from_params(params.as_object().expect("object"));
        assert_eq!(options.query(), vec![("page[size]".to_owned(), "25".to_owned())]);
    }

    #[tokio::test]
    async fn detail_requests_record_path_and_hydrates_model() {
        let fixture = fixture();
        fixture.transport.respond(Ok(json!({
            "data": {"id": "abc12", "title": "Node", "children": "http://localhost:8000/v2/nodes/abc12/children/"}
        })));

        let node = nodes(&fixture.context).detail("abc12").await.expect("detail succeeds");

        let requests = fixture.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.as_str(), "http://localhost:8000/v2/nodes/abc12/");
        assert_eq!(node.describe(), "[Node abc12]");
        assert_eq!(
            node.link("children").and_then(ResourceClient::path_segment),
            Some("nodes/abc12/children")
        );
        assert!(fixture.reporter.reports().is_empty());
    }

    #[tokio::test]
    async fn detail_failure_is_reported_once_and_returned() {
        let fixture = fixture();
        fixture.transport.respond(Err(server_error()));

        let error = nodes(&fixture.context)
            .detail("abc12")
            .await
            .expect_err("detail should fail");

        assert!(matches!(error, ClientError::HttpStatus { .. }));
        let reports = fixture.reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message, "Could not fetch individual node.");
        assert_eq!(reports[0].context.status, Some(500));
        assert_eq!(reports[0].context.request, "GET nodes/abc12/");
    }

    #[tokio::test]
    async fn list_forwards_page_size_and_ignores_unknown_options() {
        let fixture = fixture();
        fixture.transport.respond(Ok(json!({"data": []})));
        fixture.transport.respond(Ok(json!({"data": []})));
        let client = nodes(&fixture.context);

        client
            .list(&ListOptions::new().page_size(50))
            .await
            .expect("list succeeds");
        let bogus = json!({"bogus": 1});
        client
            .list(&ListOptions::from_params(bogus.as_object().expect("object")))
            .await
            .expect("list succeeds");

        let requests = fixture.transport.requests();
        assert_eq!(
            requests[0].query_pairs(),
            vec![("page[size]".to_owned(), "50".to_owned())]
        );
        assert_eq!(requests[1].url.as_str(), "http://localhost:8000/v2/nodes/");
        assert!(requests[1].query_pairs().is_empty());
    }

    #[tokio::test]
    async fn list_preserves_record_order_and_envelope() {
        let fixture = fixture();
        fixture.transport.respond(Ok(json!({
            "data": [{"id": "1", "title": "A"}, {"id": "2", "title": "B"}],
            "links": {"next": "http://localhost:8000/v2/nodes/?page=2"},
            "meta": {"total": 4}
        })));

        let response = nodes(&fixture.context)
            .list(&ListOptions::new())
            .await
            .expect("list succeeds");

        let titles: Vec<_> = response.iter().filter_map(|node| node.get_str("title")).collect();
        assert_eq!(titles, ["A", "B"]);
        assert_eq!(response.next_page_url(), Some("http://localhost:8000/v2/nodes/?page=2"));
        assert_eq!(response.meta(), Some(&json!({"total": 4})));
        assert!(response.envelope.get("data").is_none());
    }

    #[tokio::test]
    async fn list_failure_reports_resource_name() {
        let fixture = fixture();
        fixture.transport.respond(Err(server_error()));

        let result = nodes(&fixture.context).list(&ListOptions::new()).await;

        assert!(result.is_err());
        let reports = fixture.reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message, "Could not fetch node list.");
    }

    #[tokio::test]
    async fn malformed_envelope_fails_the_call() {
        let fixture = fixture();
        fixture.transport.respond(Ok(json!({"data": {"id": "1"}})));
        fixture.transport.respond(Ok(json!({"errors": []})));
        let client = nodes(&fixture.context);

        let list = client.list(&ListOptions::new()).await;
        let detail = client.detail("1").await;

        assert!(matches!(list, Err(ClientError::MalformedEnvelope(_))));
        assert!(matches!(detail, Err(ClientError::MalformedEnvelope(_))));
        assert_eq!(fixture.reporter.reports().len(), 2);
    }

    #[tokio::test]
    async fn hydrated_links_are_usable_clients() {
        let fixture = fixture();
        fixture.transport.respond(Ok(json!({
            "data": {"id": "u1", "nodes": "http://localhost:8000/v2/users/u1/nodes/"}
        })));
        fixture.transport.respond(Ok(json!({"data": [{"id": "n1"}]})));

        let user = fixture
            .context
            .client(ResourceConfig::new(ModelKind::new("User"), "users", "user"))
            .expect("valid config")
            .detail("u1")
            .await
            .expect("detail succeeds");
        let linked = user.link("nodes").expect("hydrated link");
        let page = linked.list(&ListOptions::new()).await.expect("list succeeds");

        assert_eq!(page.len(), 1);
        assert_eq!(page.data[0].describe(), "[Resource n1]");
        assert_eq!(
            fixture.transport.requests()[1].url.as_str(),
            "http://localhost:8000/v2/users/u1/nodes/"
        );
    }

    #[tokio::test]
    async fn detail_encodes_identifier() {
        let fixture = fixture();
        fixture.transport.respond(Ok(json!({"data": {"id": "a b"}})));

        nodes(&fixture.context).detail("a b").await.expect("detail succeeds");

        assert_eq!(
            fixture.transport.requests()[0].url.as_str(),
            "http://localhost:8000/v2/nodes/a%20b/"
        );
    }

    #[tokio::test]
    async fn segments_escaping_the_base_fail_without_sending() {
        let fixture = fixture();
        let client = fixture
            .context
            .client(ResourceConfig {
                path_segment: Some("http://evil.example/v2/nodes".to_owned()),
                ..ResourceConfig::default()
            })
            .expect("segment is configured");

        let error = client
            .list(&ListOptions::new())
            .await
            .expect_err("list should fail");

        assert!(matches!(error, ClientError::InvalidPath(_)));
        assert!(client.collection_url().is_err());
        assert!(fixture.transport.requests().is_empty());
        assert_eq!(fixture.reporter.reports().len(), 1);
    }
}
