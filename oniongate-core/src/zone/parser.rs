//! Zone-file text parsing on top of the hickory master-file parser

use hickory_proto::rr::{Name, RecordType};
use hickory_proto::serialize::txt::Parser;
use thiserror::Error;

use super::records::{RecordData, RecordSet, ResourceRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneParseError {
    #[error("invalid zone name {name}: {message}")]
    Origin { name: String, message: String },

    #[error("{0}")]
    Syntax(String),

    #[error("unsupported record type {record_type} at {owner}")]
    Unsupported {
        owner: String,
        record_type: RecordType,
    },
}

/// Absolute, lowercase name of `zone`
pub fn zone_origin(zone: &str) -> Result<Name, ZoneParseError> {
    let trimmed = zone.trim().trim_end_matches('.').to_lowercase();
    Name::from_ascii(format!("{trimmed}."))
        .map(|name| name.to_lowercase())
        .map_err(|e| ZoneParseError::Origin {
            name: zone.to_string(),
            message: e.to_string(),
        })
}

/// Parse zone-file text into a record set; relative names resolve against `zone`.
pub fn parse_zone_text(text: &str, zone: &str) -> Result<RecordSet, ZoneParseError> {
    let origin = zone_origin(zone)?;
    let (_, rrsets) = Parser::new(text, None, Some(origin))
        .parse()
        .map_err(|e| ZoneParseError::Syntax(e.to_string()))?;

    let mut set = RecordSet::new();
    for rrset in rrsets.values() {
        for record in rrset.records_without_rrsigs() {
            let data = RecordData::try_from(record.data().clone()).map_err(|record_type| {
                ZoneParseError::Unsupported {
                    owner: record.name().to_string(),
                    record_type,
                }
            })?;
            set.push(ResourceRecord::new(
                record.name().to_lowercase(),
                record.ttl(),
                data,
            ));
        }
    }
    Ok(set)
}
