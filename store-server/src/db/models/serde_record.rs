//! Serde helpers for SurrealDB RecordId fields
//!
//! Record links are exposed to the API as `"table:key"` strings while the
//! database hands back native RecordId values; these helpers accept both on
//! the way in and always emit the string form on the way out.
//!
//! Usage: `#[serde(with = "serde_record")]` for required links,
//! `serde_record::option` / `serde_record::vec` for optional and list links.

use serde::{Deserialize, Deserializer, Serializer, de};
use std::fmt;
use surrealdb::RecordId;

struct RecordIdVisitor;

impl<'de> de::Visitor<'de> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a record id or a string like 'table:key'")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        v.parse::<RecordId>()
            .map_err(|_| de::Error::custom(format!("invalid record id: {}", v)))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        self.visit_str(&v)
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        // Native SurrealDB format - delegate to the default deserializer
        RecordId::deserialize(de::value::MapAccessDeserializer::new(map))
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        RecordId::deserialize(deserializer)
    }
}

/// RecordId that deserializes from either the string or the native format
struct FlexibleId(RecordId);

impl<'de> Deserialize<'de> for FlexibleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RecordIdVisitor).map(FlexibleId)
    }
}

/// Deserialize a RecordId from either `"table:key"` or the native format
pub fn deserialize<'de, D>(deserializer: D) -> Result<RecordId, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(RecordIdVisitor)
}

/// Serialize a RecordId as a `"table:key"` string
pub fn serialize<S>(id: &RecordId, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&id.to_string())
}

pub mod option {
    use super::*;

    pub fn serialize<S>(id: &Option<RecordId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(id) => serializer.serialize_some(&id.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<FlexibleId>::deserialize(deserializer).map(|opt| opt.map(|f| f.0))
    }
}

pub mod vec {
    use super::*;

    pub fn serialize<S>(ids: &[RecordId], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(ids.len()))?;
        for id in ids {
            seq.serialize_element(&id.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<FlexibleId>::deserialize(deserializer)
            .map(|ids| ids.into_iter().map(|f| f.0).collect())
    }
}

pub mod vec_option {
    use super::*;

    pub fn serialize<S>(ids: &Option<Vec<RecordId>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ids {
            Some(ids) => {
                let strings: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                serializer.serialize_some(&strings)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<RecordId>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Vec<FlexibleId>>::deserialize(deserializer)
            .map(|opt| opt.map(|ids| ids.into_iter().map(|f| f.0).collect()))
    }
}
