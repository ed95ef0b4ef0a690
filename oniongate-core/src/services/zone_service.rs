//! Zone generation and publishing service

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::join_all;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::ZoneWriter;
use crate::types::{PublishFailure, PublishResult, PublishedZone, ZoneSnapshot};
use crate::zone::{proxy_label, render_seed, ZoneFile};

/// Zone generation service
pub struct ZoneService {
    ctx: Arc<ServiceContext>,
}

impl ZoneService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    fn normalize_zone(zone: &str) -> CoreResult<String> {
        let zone = zone.trim().trim_end_matches('.').to_lowercase();
        if zone.is_empty() {
            return Err(CoreError::ValidationError(
                "Zone name cannot be empty".to_string(),
            ));
        }
        Ok(zone)
    }

    /// Zones to publish: the subdomain host plus every zone holding a domain
    pub async fn list_zones(&self) -> CoreResult<Vec<String>> {
        let mut zones: BTreeSet<String> = self
            .ctx
            .zone_source
            .list_domain_zones()
            .await?
            .into_iter()
            .collect();
        zones.insert(
            self.ctx
                .config
                .subdomain_host
                .trim_end_matches('.')
                .to_lowercase(),
        );
        Ok(zones.into_iter().collect())
    }

    async fn build(&self, zone: &str) -> CoreResult<(ZoneSnapshot, ZoneFile)> {
        let seed = render_seed(self.ctx.template_loader.as_ref(), zone).await?;
        let snapshot = self.ctx.zone_source.zone_snapshot(zone).await?;
        let file = self.ctx.synthesizer.synthesize(&snapshot, &seed)?;
        Ok((snapshot, file))
    }

    /// Generate the zone file text for one zone
    pub async fn generate_zone(&self, zone: &str) -> CoreResult<ZoneFile> {
        let zone = Self::normalize_zone(zone)?;
        let (_, file) = self.build(&zone).await?;
        Ok(file)
    }

    /// Generate one zone, hand it to `writer` and clear the published rows' dirty flags
    pub async fn publish_zone(&self, zone: &str, writer: &dyn ZoneWriter) -> CoreResult<ZoneFile> {
        let zone = Self::normalize_zone(zone)?;
        let (snapshot, file) = self.build(&zone).await?;
        writer.write_zone(&file).await?;

        let carries_proxies = proxy_label(&self.ctx.config.proxy_zone, &zone).is_some();
        self.ctx
            .zone_source
            .mark_published(&zone, snapshot.taken_at, carries_proxies, file.serial)
            .await?;
        Ok(file)
    }

    /// Publish every zone concurrently; a failing zone never stops the others
    pub async fn publish_all(&self, writer: &dyn ZoneWriter) -> CoreResult<PublishResult> {
        let zones = self.list_zones().await?;
        let outcomes = join_all(
            zones
                .iter()
                .map(|zone| async move { (zone, self.publish_zone(zone, writer).await) }),
        )
        .await;

        let mut result = PublishResult::default();
        for (zone, outcome) in outcomes {
            match outcome {
                Ok(file) => {
                    log::info!("Published zone {zone} (serial {})", file.serial);
                    result.published.push(PublishedZone {
                        zone: zone.clone(),
                        serial: file.serial,
                    });
                }
                Err(e) => {
                    if e.is_expected() {
                        log::warn!("Failed to publish zone {zone}: {e}");
                    } else {
                        log::error!("Failed to publish zone {zone}: {e}");
                    }
                    result.failures.push(PublishFailure {
                        zone: zone.clone(),
                        code: e.kind().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        result.success_count = result.published.len();
        result.failed_count = result.failures.len();
        Ok(result)
    }
}
