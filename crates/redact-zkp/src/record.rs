//! # Record Model
//!
//! An item's authoritative data: an ordered list of named attributes, each
//! committed to the field as a `(data, kind)` [`Metadata`] pair.
//!
//! | Value | `data` | `kind` |
//! |---|---|---|
//! | `Text(s)` | `hash_text(s)` | `hash_text("string")` |
//! | `Number(n)` | `n` | `hash_text("number")` |
//! | `Map(r)` | `hash_fields(r.root())` | `hash_text("map")` |
//!
//! Attribute names become map keys through `hash_text(name)`. Insertion
//! order is kept for presentation only; the committed root does not depend
//! on it.

use serde::{Deserialize, Serialize};

use redact_core::{FieldElement, Metadata};
use redact_crypto::{hash_fields, hash_text, MetadataMap};

/// Semantic type tag of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Number,
    Map,
}

impl AttributeKind {
    pub fn tag(self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Number => "number",
            AttributeKind::Map => "map",
        }
    }

    /// The kind tag committed to the field.
    pub fn field(self) -> FieldElement {
        hash_text(self.tag())
    }
}

/// An attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AttributeValue {
    #[serde(rename = "string")]
    Text(String),
    Number(u64),
    Map(Record),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Text(_) => AttributeKind::String,
            AttributeValue::Number(_) => AttributeKind::Number,
            AttributeValue::Map(_) => AttributeKind::Map,
        }
    }

    /// Field commitment to the value alone.
    pub fn commitment(&self) -> FieldElement {
        match self {
            AttributeValue::Text(s) => hash_text(s),
            AttributeValue::Number(n) => FieldElement::from_u64(*n),
            AttributeValue::Map(record) => hash_fields(&record.root().to_fields()),
        }
    }

    pub fn metadata(&self) -> Metadata {
        Metadata::new(self.commitment(), self.kind().field())
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<u64> for AttributeValue {
    fn from(n: u64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<Record> for AttributeValue {
    fn from(r: Record) -> Self {
        AttributeValue::Map(r)
    }
}

/// One named attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

/// Ordered set of named attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    attributes: Vec<Attribute>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set `name`, replacing an existing value in place.
    pub fn insert(&mut self, name: &str, value: impl Into<AttributeValue>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Map key of an attribute name.
    pub fn key_for(name: &str) -> FieldElement {
        hash_text(name)
    }

    /// Commit every attribute into a fresh [`MetadataMap`].
    pub fn to_map(&self) -> MetadataMap {
        let mut map = MetadataMap::new();
        for attr in &self.attributes {
            map.set(Self::key_for(&attr.name), attr.value.metadata());
        }
        map
    }

    /// Root pair of [`to_map`](Self::to_map).
    pub fn root(&self) -> Metadata {
        self.to_map().root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::new().with("twitter", "@x").with("age", 12u64)
    }

    #[test]
    fn kinds_and_commitments() {
        let r = sample();
        let twitter = r.get("twitter").unwrap();
        assert_eq!(twitter.kind(), AttributeKind::String);
        assert_eq!(twitter.metadata(), Metadata::new(hash_text("@x"), hash_text("string")));
        let age = r.get("age").unwrap();
        assert_eq!(age.metadata().data, FieldElement::from_u64(12));
        assert_eq!(age.metadata().kind, hash_text("number"));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut r = sample();
        r.insert("twitter", "@y");
        assert_eq!(r.len(), 2);
        assert_eq!(r.names().collect::<Vec<_>>(), vec!["twitter", "age"]);
        assert_eq!(r.get("twitter"), Some(&AttributeValue::from("@y")));
    }

    #[test]
    fn root_ignores_insertion_order() {
        let reversed = Record::new().with("age", 12u64).with("twitter", "@x");
        assert_eq!(sample().root(), reversed.root());
    }

    #[test]
    fn nested_record_commits_by_root() {
        let inner = Record::new().with("city", "Lisbon");
        let outer = Record::new().with("address", inner.clone());
        let value = outer.get("address").unwrap();
        assert_eq!(value.kind(), AttributeKind::Map);
        assert_eq!(value.commitment(), hash_fields(&inner.root().to_fields()));

        let changed = Record::new().with("address", Record::new().with("city", "Porto"));
        assert_ne!(outer.root(), changed.root());
    }

    #[test]
    fn map_lookup_matches_attributes() {
        let r = sample();
        let map = r.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(&Record::key_for("age")),
            Some(r.get("age").unwrap().metadata())
        );
        assert_eq!(map.get(&Record::key_for("email")), None);
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"name": "twitter", "value": {"kind": "string", "value": "@x"}},
                {"name": "age", "value": {"kind": "number", "value": 12}}
            ])
        );
        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }
}
