//! Zone snapshot and publication types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::Domain;
use super::proxy::Proxy;

/// Consistent read of everything a zone synthesis needs
#[derive(Debug, Clone)]
pub struct ZoneSnapshot {
    pub zone: String,
    /// Non-deleted domains of the zone, primary key ascending
    pub domains: Vec<Domain>,
    /// Online proxies, primary key ascending
    pub online_proxies: Vec<Proxy>,
    /// Serial of the zone's last recorded publish
    pub last_serial: Option<u32>,
    pub taken_at: DateTime<Utc>,
}

/// Result of publishing every zone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub published: Vec<PublishedZone>,
    pub failures: Vec<PublishFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedZone {
    pub zone: String,
    pub serial: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishFailure {
    pub zone: String,
    /// Machine-readable error code
    pub code: String,
    pub reason: String,
}
