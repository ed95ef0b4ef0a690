//! Datetime serialization/deserialization helpers.
//!
//! Timestamps are stored and serialized as RFC3339 strings. Deserialization also
//! accepts Unix timestamps (seconds or milliseconds), which is what the health
//! checker and older exports send.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::{CoreError, CoreResult};

#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampOrString {
    String(String),
    I64(i64),
}

impl TimestampOrString {
    fn into_datetime(self) -> Result<DateTime<Utc>, String> {
        match self {
            Self::String(s) => parse_rfc3339(&s).map_err(|e| e.to_string()),
            Self::I64(ts) => parse_unix_timestamp(ts).ok_or_else(|| "Invalid Unix timestamp".into()),
        }
    }
}

/// Serializes `DateTime<Utc>` as an RFC3339 string.
pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

/// Deserializes `DateTime<Utc>` from RFC3339 or Unix timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    TimestampOrString::deserialize(deserializer)?
        .into_datetime()
        .map_err(serde::de::Error::custom)
}

/// `Option<DateTime<Utc>>` serializer/deserializer helpers.
pub mod option {
    use super::{DateTime, Deserialize, Deserializer, Serializer, TimestampOrString, Utc};

    /// Serializes `Option<DateTime<Utc>>` as RFC3339 or `null`.
    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes `Option<DateTime<Utc>>` from RFC3339, Unix timestamp, or `null`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<TimestampOrString>::deserialize(deserializer)?
            .map(TimestampOrString::into_datetime)
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}

/// Parse a stored RFC3339 column value.
pub fn parse_rfc3339(value: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::SerializationError(format!("Invalid timestamp '{value}': {e}")))
}

/// Parse an optional stored RFC3339 column value.
pub fn parse_rfc3339_opt(value: Option<&str>) -> CoreResult<Option<DateTime<Utc>>> {
    value.map(parse_rfc3339).transpose()
}

/// Parses a Unix timestamp with second/millisecond auto-detection.
fn parse_unix_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    // Values larger than 10^11 are interpreted as milliseconds.
    if ts > 100_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}
