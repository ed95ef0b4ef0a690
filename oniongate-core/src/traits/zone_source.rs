//! Zone snapshot and publication abstract Traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::types::ZoneSnapshot;
use crate::zone::ZoneFile;

/// Consistent reads for zone synthesis
#[async_trait]
pub trait ZoneSnapshotSource: Send + Sync {
    /// Distinct zones of the non-deleted domains
    async fn list_domain_zones(&self) -> CoreResult<Vec<String>>;

    /// Read the zone's non-deleted domains and the online proxies in one consistent view
    async fn zone_snapshot(&self, zone: &str) -> CoreResult<ZoneSnapshot>;

    /// Clear `dirty` on rows published by a snapshot taken at `published_at` and
    /// record `serial` as the zone's last published serial
    ///
    /// Only rows not modified after `published_at` are cleared. Proxies are cleared only
    /// when `include_proxies` is set (the zone carries the proxy records). A stored
    /// serial never moves backwards.
    async fn mark_published(
        &self,
        zone: &str,
        published_at: DateTime<Utc>,
        include_proxies: bool,
        serial: u32,
    ) -> CoreResult<()>;
}

/// Destination of generated zone files
#[async_trait]
pub trait ZoneWriter: Send + Sync {
    async fn write_zone(&self, zone: &ZoneFile) -> CoreResult<()>;
}
