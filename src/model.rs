use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::attribute::{Attribute, Attributes};
use crate::hydrate::Hydrator;
use crate::resource::ResourceClient;

/// The kind of model a resource client instantiates, e.g. `User`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelKind {
    label: Cow<'static, str>,
}

impl ModelKind {
    /// Kind used for clients discovered through hydrated links.
    pub const GENERIC: ModelKind = ModelKind::new("Resource");

    pub const fn new(label: &'static str) -> Self {
        Self {
            label: Cow::Borrowed(label),
        }
    }

    pub fn named(label: impl Into<String>) -> Self {
        Self {
            label: Cow::Owned(label.into()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Hydrates one raw record into a model of this kind.
    pub fn instantiate(&self, hydrator: &Hydrator, record: &Value) -> Model {
        Model::construct(self.clone(), hydrator, record)
    }
}

impl Default for ModelKind {
    fn default() -> Self {
        Self::GENERIC
    }
}

/// One fetched record.
///
/// Every key of the raw record becomes an attribute, with embedded API
/// collection URLs replaced by [`ResourceClient`]s. Models are read-only once
/// constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    kind: ModelKind,
    attributes: Attributes,
}

impl Model {
    /// Builds a model by deep-hydrating `record`.
    pub fn construct(kind: ModelKind, hydrator: &Hydrator, record: &Value) -> Self {
        let mut attributes = Attributes::new();
        hydrator.extend(true, &mut attributes, &[record]);
        Self { kind, attributes }
    }

    pub fn kind(&self) -> &str {
        self.kind.label()
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Attribute::as_str)
    }

    /// Returns the resource client hydrated from the URL stored under `name`.
    pub fn link(&self, name: &str) -> Option<&ResourceClient> {
        self.get(name).and_then(Attribute::as_client)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Short `[<kind> <id>]` label for logs.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.kind(), self.id().unwrap_or("?"))
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}
