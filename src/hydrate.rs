//! Recursive merge of server payloads into attribute bags.
//!
//! Hydration is a recursive deep merge of JSON objects and arrays with
//! one addition: any non-empty string shaped like an API collection URL
//! (`http://host/v2/<resource>/`) is replaced by a [`ResourceClient`] for that
//! resource, so callers can navigate to related collections.
//!
//! Containers are always merged into copies, never shared with the source
//! payload or with a value already present on the target.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::attribute::{Attribute, Attributes};
use crate::context::ApiContext;
use crate::resource::{ResourceClient, ResourceConfig};

static COLLECTION_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://.*/v2/(.+)/").expect("valid regex"));

/// Returns the resource path named by a collection URL, if `value` is one.
///
/// The capture is greedy: `http://host/v2/nodes/abc12/children/` names
/// `nodes/abc12/children`. Captures carrying a scheme or a `..` component are
/// not relative resource paths and are not recognized.
pub fn collection_segment(value: &str) -> Option<&str> {
    COLLECTION_URL
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map(|segment| segment.as_str())
        .filter(|segment| !segment.contains(':') && !segment.split('/').any(|part| part == ".."))
}

/// Merges payloads into attribute bags, turning embedded API URLs into clients.
///
/// Hydrated clients share the hydrator's [`ApiContext`]. Hydration itself
/// performs no I/O.
#[derive(Clone, Debug)]
pub struct Hydrator {
    context: Arc<ApiContext>,
}

impl Hydrator {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self { context }
    }

    /// Merges every field of `sources` into `target` and returns it.
    ///
    /// Sources are applied in order, so later sources win. Sources that are
    /// not JSON objects are skipped. With `deep` set, nested objects and
    /// arrays are merged recursively into copies; otherwise they are copied
    /// verbatim. A key absent from a source never touches the target.
    ///
    /// A source can never alias `target` (it is borrowed immutably and has a
    /// different type), so no self-reference check is needed.
    pub fn extend<'a>(
        &self,
        deep: bool,
        target: &'a mut Attributes,
        sources: &[&Value],
    ) -> &'a mut Attributes {
        for source in sources {
            let Value::Object(fields) = source else {
                continue;
            };
            for (name, copy) in fields {
                let merged = self.merge_value(deep, name, target.get(name), copy);
                target.insert(name.as_str(), merged);
            }
        }
        target
    }

    /// Hydrates `sources` into `target`, coercing a missing or non-mapping
    /// target to an empty bag.
    pub fn hydrate(&self, deep: bool, target: Option<Attribute>, sources: &[&Value]) -> Attributes {
        let mut target = match target {
            Some(Attribute::Mapping(fields)) => fields,
            _ => Attributes::new(),
        };
        self.extend(deep, &mut target, sources);
        target
    }

    fn merge_value(&self, deep: bool, name: &str, existing: Option<&Attribute>, copy: &Value) -> Attribute {
        match copy {
            Value::Object(fields) if deep => {
                let mut clone = match existing {
                    Some(Attribute::Mapping(current)) => current.clone(),
                    _ => Attributes::new(),
                };
                for (key, value) in fields {
                    let merged = self.merge_value(deep, key, clone.get(key), value);
                    clone.insert(key.as_str(), merged);
                }
                Attribute::Mapping(clone)
            }
            Value::Array(items) if deep => {
                let mut clone = match existing {
                    Some(Attribute::Sequence(current)) => current.clone(),
                    _ => Vec::with_capacity(items.len()),
                };
                for (index, item) in items.iter().enumerate() {
                    let merged = self.merge_value(deep, name, clone.get(index), item);
                    match clone.get_mut(index) {
                        Some(slot) => *slot = merged,
                        None => clone.push(merged),
                    }
                }
                Attribute::Sequence(clone)
            }
            Value::String(text) if !text.is_empty() => match collection_segment(text) {
                Some(segment) => {
                    debug!(field = name, url = %text, segment, "hydrated api url");
                    Attribute::Client {
                        url: text.clone(),
                        client: self.link(segment),
                    }
                }
                None => Attribute::String(text.clone()),
            },
            other => Attribute::from(other.clone()),
        }
    }

    fn link(&self, segment: &str) -> ResourceClient {
        ResourceClient::linked(Arc::clone(&self.context), ResourceConfig::generic(segment))
    }
}
