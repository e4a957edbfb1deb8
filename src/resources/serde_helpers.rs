//! Deserialization helpers for quirks of the AllDebrid payloads.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serializer};
use std::collections::BTreeMap;

/// Epoch seconds where `0` (or `null`, or absent with `#[serde(default)]`)
/// means "no date".
pub mod epoch_seconds {
    use super::*;
    use serde::de::Error as _;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<i64>::deserialize(deserializer)? {
            None | Some(0) => Ok(None),
            Some(secs) => Utc
                .timestamp_opt(secs, 0)
                .single()
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("timestamp {secs} is out of range"))),
        }
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.map(|dt| dt.timestamp()).unwrap_or(0))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrMap<T> {
    List(Vec<T>),
    Map(BTreeMap<String, T>),
}

/// Accept either a JSON array or an object keyed by id.
///
/// Map values come back ordered by key.
pub fn list_or_map<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match ListOrMap::deserialize(deserializer)? {
        ListOrMap::List(items) => Ok(items),
        ListOrMap::Map(items) => Ok(items.into_values().collect()),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrList<T> {
    List(Vec<T>),
    One(T),
}

/// Accept a single object or a non-empty array, keeping the first element.
pub fn one_or_first<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match OneOrList::deserialize(deserializer)? {
        OneOrList::One(item) => Ok(item),
        OneOrList::List(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| D::Error::custom("expected at least one element")),
    }
}
