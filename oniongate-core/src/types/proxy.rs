//! Entry proxy type definitions

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// IP protocol version of a proxy address (serialized as `4` / `6`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    #[must_use]
    pub fn of(address: &IpAddr) -> Self {
        match address {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }
}

impl From<IpVersion> for u8 {
    fn from(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => 4,
            IpVersion::V6 => 6,
        }
    }
}

impl TryFrom<u8> for IpVersion {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::V4),
            6 => Ok(Self::V6),
            other => Err(CoreError::SerializationError(format!(
                "Invalid IP version: {other}"
            ))),
        }
    }
}

/// A public relay host forwarding traffic toward the onion network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    pub id: i64,
    /// Canonical textual address
    pub ip_address: String,
    pub ip_type: IpVersion,
    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::utils::datetime::option")]
    pub last_checked: Option<DateTime<Utc>>,
    #[serde(with = "crate::utils::datetime::option")]
    pub last_successful_check: Option<DateTime<Utc>>,
    /// Offline until a health check proves otherwise
    pub online: bool,
    pub dirty: bool,
}

impl Proxy {
    /// Apply a health-check result
    pub fn record_check(&mut self, reachable: bool, now: DateTime<Utc>) {
        self.last_checked = Some(now);
        if reachable {
            self.last_successful_check = Some(now);
        }
        if self.online != reachable {
            self.online = reachable;
            self.dirty = true;
        }
    }
}

/// Validated row for a new proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProxy {
    pub ip_address: String,
    pub ip_type: IpVersion,
}

/// Result of classifying a raw IP address string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedIp {
    pub address: IpAddr,
    pub version: IpVersion,
}

impl ClassifiedIp {
    /// Canonical textual form
    #[must_use]
    pub fn canonical(&self) -> String {
        self.address.to_string()
    }
}

/// Register proxy request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProxyRequest {
    pub ip_address: String,
}

/// Sort proxies online first, then by creation time.
pub fn sort_for_listing(proxies: &mut [Proxy]) {
    proxies.sort_by(|a, b| {
        b.online
            .cmp(&a.online)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn proxy(id: i64, online: bool, age_secs: i64) -> Proxy {
        Proxy {
            id,
            ip_address: format!("8.8.8.{id}"),
            ip_type: IpVersion::V4,
            created_at: Utc::now() - Duration::seconds(age_secs),
            last_checked: None,
            last_successful_check: None,
            online,
            dirty: false,
        }
    }

    #[test]
    fn ip_version_serializes_as_number() {
        assert_eq!(serde_json::to_string(&IpVersion::V6).unwrap(), "6");
        let v: IpVersion = serde_json::from_str("4").unwrap();
        assert_eq!(v, IpVersion::V4);
        assert!(serde_json::from_str::<IpVersion>("5").is_err());
    }

    #[test]
    fn listing_order_online_first_then_oldest() {
        let mut proxies = vec![proxy(1, false, 300), proxy(2, true, 10), proxy(3, true, 200)];
        sort_for_listing(&mut proxies);
        let ids: Vec<i64> = proxies.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn health_check_flips_status_and_marks_dirty() {
        let mut p = proxy(1, false, 0);
        let now = Utc::now();
        p.record_check(true, now);
        assert!(p.online);
        assert!(p.dirty);
        assert_eq!(p.last_successful_check, Some(now));

        p.dirty = false;
        p.record_check(true, now);
        assert!(!p.dirty);

        p.record_check(false, now);
        assert!(!p.online);
        assert!(p.dirty);
        assert_eq!(p.last_checked, Some(now));
    }
}
