//! DNS record type definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Record types a domain owner may create
///
/// Serialized as uppercase strings (`"A"`, `"AAAA"`, `"CNAME"`, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Alias,
    Mx,
    Txt,
    Srv,
    Caa,
}

impl RecordType {
    pub const ALL: [Self; 8] = [
        Self::A,
        Self::Aaaa,
        Self::Cname,
        Self::Alias,
        Self::Mx,
        Self::Txt,
        Self::Srv,
        Self::Caa,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Alias => "ALIAS",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "Record type '{s}' is not allowed. Must be one of: {}",
                    Self::ALL.map(Self::as_str).join(", ")
                ))
            })
    }
}

/// A DNS record attached to a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: i64,
    pub domain_id: i64,
    pub label: String,
    /// `None` falls back to the zone default
    pub ttl: Option<u32>,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub value: String,
    /// Onion address extracted from an `onion=<address>` TXT value
    pub is_onion_mapping: Option<String>,
    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
    pub dirty: bool,
}

impl Record {
    #[must_use]
    pub fn effective_ttl(&self, default_ttl: u32) -> u32 {
        self.ttl.unwrap_or(default_ttl)
    }

    /// Whether this record is a TXT mapping for the given onion address
    #[must_use]
    pub fn maps_onion(&self, onion_address: &str) -> bool {
        self.record_type == RecordType::Txt
            && self.is_onion_mapping.as_deref() == Some(onion_address)
    }
}

/// Create record request (raw, unvalidated)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    pub label: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    #[serde(default)]
    pub ttl: Option<u32>,
}

/// Validated row for a new record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub label: String,
    pub ttl: Option<u32>,
    pub record_type: RecordType,
    pub value: String,
    pub is_onion_mapping: Option<String>,
}

/// Outcome of an atomic record deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDeletion {
    pub record: Record,
    /// The parent domain's `onion_address` was cleared in the same unit
    pub onion_cleared: bool,
}

/// Decide whether deleting `record` must clear the parent's onion address.
///
/// `matching_txt_records` counts the domain's TXT records (including `record`) that
/// map the domain's current onion address.
#[must_use]
pub fn clears_onion_address(
    domain_onion: Option<&str>,
    record: &Record,
    matching_txt_records: usize,
) -> bool {
    match domain_onion {
        Some(onion) => record.maps_onion(onion) && matching_txt_records <= 1,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txt(id: i64, onion: Option<&str>) -> Record {
        Record {
            id,
            domain_id: 1,
            label: "_onion".into(),
            ttl: None,
            record_type: RecordType::Txt,
            value: format!("onion={}", onion.unwrap_or("x")),
            is_onion_mapping: onion.map(String::from),
            created_at: Utc::now(),
            dirty: true,
        }
    }

    #[test]
    fn record_type_parse_case_insensitive() {
        assert_eq!("txt".parse::<RecordType>().unwrap(), RecordType::Txt);
        assert_eq!("AAAA".parse::<RecordType>().unwrap(), RecordType::Aaaa);
        assert_eq!(" alias ".parse::<RecordType>().unwrap(), RecordType::Alias);
        assert!(matches!(
            "SOA".parse::<RecordType>(),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn record_type_serde_uppercase() {
        assert_eq!(serde_json::to_string(&RecordType::Aaaa).unwrap(), "\"AAAA\"");
        assert_eq!(RecordType::Cname.to_string(), "CNAME");
    }

    #[test]
    fn effective_ttl_falls_back() {
        let mut r = txt(1, None);
        assert_eq!(r.effective_ttl(3600), 3600);
        r.ttl = Some(60);
        assert_eq!(r.effective_ttl(3600), 60);
    }

    #[test]
    fn clears_only_last_matching_mapping() {
        let onion = "abcdefghijklmnop.onion";
        let r = txt(1, Some(onion));
        assert!(clears_onion_address(Some(onion), &r, 1));
        assert!(!clears_onion_address(Some(onion), &r, 2));
        assert!(!clears_onion_address(None, &r, 1));
        assert!(!clears_onion_address(Some("bbbbbbbbbbbbbbbb.onion"), &r, 1));

        let mut not_txt = txt(2, Some(onion));
        not_txt.record_type = RecordType::Cname;
        assert!(!clears_onion_address(Some(onion), &not_txt, 1));
    }
}
