//! Open-ended attribute values carried by hydrated models.

use indexmap::IndexMap;
use indexmap::map::Iter;
use serde::ser::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::hydrate::Hydrator;
use crate::resource::ResourceClient;

/// One hydrated attribute value.
///
/// Mirrors the JSON data model, plus [`Attribute::Client`] for string values
/// that were recognized as API collection URLs during hydration.
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Attribute>),
    Mapping(Attributes),
    /// A hydrated link, with the string it was recognized in.
    Client { url: String, client: ResourceClient },
}

impl Attribute {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(value) => value.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => value.as_f64(),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Attribute]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Attributes> {
        match self {
            Self::Mapping(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the embedded resource client if this value was a hydrated link.
    pub fn as_client(&self) -> Option<&ResourceClient> {
        match self {
            Self::Client { client, .. } => Some(client),
            _ => None,
        }
    }

    /// Returns the string value, or the original string of a hydrated link.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::String(value) | Self::Client { url: value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Converts decoded JSON verbatim, without link discovery.
impl From<Value> for Attribute {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(value) => Self::Number(value),
            Value::String(value) => Self::String(value),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(fields) => Self::Mapping(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Number(value) => value.serialize(serializer),
            Self::String(value) => serializer.serialize_str(value),
            Self::Sequence(items) => serializer.collect_seq(items),
            Self::Mapping(fields) => fields.serialize(serializer),
            Self::Client { url, .. } => serializer.serialize_str(url),
        }
    }
}

/// Insertion-ordered map of attribute names to values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes(IndexMap<String, Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Sets `name`, keeping its position if it was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: Attribute) -> Option<Attribute> {
        self.0.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, Attribute> {
        self.0.iter()
    }

    /// Merges `sources` into `self` and returns `self` for chaining.
    ///
    /// Self-extend form of [`Hydrator::extend`].
    pub fn smart_extend(&mut self, hydrator: &Hydrator, deep: bool, sources: &[&Value]) -> &mut Self {
        hydrator.extend(deep, self, sources)
    }
}

impl FromIterator<(String, Attribute)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, Attribute)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Attribute);
    type IntoIter = Iter<'a, String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.0)
    }
}
