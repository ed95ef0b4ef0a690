//! Entry proxy pool service

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;

use crate::error::{CoreError, CoreResult};
use crate::services::{log_failure, ServiceContext};
use crate::types::{sort_for_listing, NewProxy, Proxy};
use crate::validation::classify_ip_address;

/// Proxy pool service
pub struct ProxyService {
    ctx: Arc<ServiceContext>,
}

impl ProxyService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Canonical text of an address used for lookups (no public-range check)
    fn canonical_address(raw: &str) -> CoreResult<String> {
        raw.trim()
            .parse::<IpAddr>()
            .map(|ip| ip.to_string())
            .map_err(|_| {
                CoreError::ValidationError(format!("{} is not a valid IP address", raw.trim()))
            })
    }

    /// Register a public proxy; it starts offline until a health check succeeds
    pub async fn register_proxy(&self, raw_ip: &str) -> CoreResult<Proxy> {
        let classified = classify_ip_address(raw_ip)?;
        let proxy = self
            .ctx
            .proxy_repository
            .insert_proxy(NewProxy {
                ip_address: classified.canonical(),
                ip_type: classified.version,
            })
            .await
            .inspect_err(|e| log_failure("Proxy registration", e))?;
        log::info!("Registered proxy {}", proxy.ip_address);
        Ok(proxy)
    }

    /// All proxies, online first, then by creation time
    pub async fn list_proxies(&self) -> CoreResult<Vec<Proxy>> {
        let mut proxies = self.ctx.proxy_repository.list_proxies().await?;
        sort_for_listing(&mut proxies);
        Ok(proxies)
    }

    pub async fn get_proxy(&self, raw_ip: &str) -> CoreResult<Proxy> {
        let address = Self::canonical_address(raw_ip)?;
        self.ctx
            .proxy_repository
            .find_proxy(&address)
            .await?
            .ok_or(CoreError::ProxyNotFound(address))
    }

    /// Record a health-check result (external health checker hook)
    pub async fn record_proxy_check(&self, raw_ip: &str, reachable: bool) -> CoreResult<Proxy> {
        let address = Self::canonical_address(raw_ip)?;
        let proxy = self
            .ctx
            .proxy_repository
            .record_proxy_check(&address, reachable, Utc::now())
            .await?;
        log::debug!(
            "Health check for proxy {}: {}",
            proxy.ip_address,
            if proxy.online { "online" } else { "offline" }
        );
        Ok(proxy)
    }
}
