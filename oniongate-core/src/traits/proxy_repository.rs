//! Entry proxy persistence abstract Trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::types::{NewProxy, Proxy};

/// Proxy pool storage
#[async_trait]
pub trait ProxyRepository: Send + Sync {
    /// Insert a proxy; `Conflict` when the address is already registered
    async fn insert_proxy(&self, proxy: NewProxy) -> CoreResult<Proxy>;

    /// Find a proxy by its canonical address
    async fn find_proxy(&self, ip_address: &str) -> CoreResult<Option<Proxy>>;

    /// All proxies, primary key ascending
    async fn list_proxies(&self) -> CoreResult<Vec<Proxy>>;

    /// Apply a health-check result (see `Proxy::record_check`)
    ///
    /// Fails with `ProxyNotFound` for an unknown address.
    async fn record_proxy_check(
        &self,
        ip_address: &str,
        reachable: bool,
        checked_at: DateTime<Utc>,
    ) -> CoreResult<Proxy>;
}
