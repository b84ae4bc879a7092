//! API models
//!
//! Rust structs mirroring the JSON bodies of the scheduling API.
//! All models use serde; field names match the wire format.

pub mod auth;
pub mod class;
pub mod schedule;
pub mod staff;
pub mod student;
pub mod week;

pub use auth::*;
pub use class::*;
pub use schedule::*;
pub use staff::*;
pub use student::*;
pub use week::*;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Server timestamps. The API emits naive ISO-8601 values; offsets are
/// accepted and normalised to UTC.
pub type Timestamp = NaiveDateTime;

/// Deserialize a timestamp that may or may not carry an offset.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn parse_timestamp(raw: &str) -> Result<Timestamp, String> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

/// Keeps "field absent" and "field is null" apart for partial updates:
/// absent stays `None`, null becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
