//! Collection Payloads
//!
//! Typed model of the JSON a server returns for a single collection.
//! Objects keep the key order they arrived in, so a collection renders
//! the same way the server wrote it.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::HashMap;
use std::fmt;

/// A JSON value returned for one collection
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CollectionPayload {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<CollectionPayload>),
    /// Object members in document order. Keys are unique.
    Map(Vec<(String, CollectionPayload)>),
}

impl CollectionPayload {
    /// Parse a payload from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Parse a payload from a JSON string
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Short name of the variant, used in status lines
    pub fn kind(&self) -> &'static str {
        match self {
            CollectionPayload::Null => "null",
            CollectionPayload::Bool(_) => "bool",
            CollectionPayload::Number(_) => "number",
            CollectionPayload::String(_) => "string",
            CollectionPayload::List(_) => "list",
            CollectionPayload::Map(_) => "map",
        }
    }

    /// Number of direct children (items or members); scalars have none
    pub fn len(&self) -> usize {
        match self {
            CollectionPayload::List(items) => items.len(),
            CollectionPayload::Map(members) => members.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up an object member by key
    pub fn get(&self, key: &str) -> Option<&CollectionPayload> {
        match self {
            CollectionPayload::Map(members) => members
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Render as indented JSON
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for CollectionPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CollectionPayload::Null => serializer.serialize_unit(),
            CollectionPayload::Bool(b) => serializer.serialize_bool(*b),
            CollectionPayload::Number(n) => n.serialize(serializer),
            CollectionPayload::String(s) => serializer.serialize_str(s),
            CollectionPayload::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            CollectionPayload::Map(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (key, value) in members {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for CollectionPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PayloadVisitor)
    }
}

struct PayloadVisitor;

impl<'de> Visitor<'de> for PayloadVisitor {
    type Value = CollectionPayload;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(CollectionPayload::Null)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(CollectionPayload::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(CollectionPayload::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(CollectionPayload::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(CollectionPayload::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Number::from_f64(v)
            .map(CollectionPayload::Number)
            .ok_or_else(|| E::custom("non-finite number"))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
        Ok(CollectionPayload::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
        Ok(CollectionPayload::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(CollectionPayload::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let capacity = map.size_hint().unwrap_or(0).min(4096);
        let mut members: Vec<(String, CollectionPayload)> = Vec::with_capacity(capacity);
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(capacity);
        while let Some((key, value)) = map.next_entry::<String, CollectionPayload>()? {
            // Repeated keys: last one wins, first position is kept
            match positions.get(&key) {
                Some(&index) => members[index].1 = value,
                None => {
                    positions.insert(key.clone(), members.len());
                    members.push((key, value));
                }
            }
        }
        Ok(CollectionPayload::Map(members))
    }
}
