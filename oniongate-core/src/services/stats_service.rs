//! Resolver statistics service

use std::sync::Arc;

use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::types::{fraction, ResolverStats};

/// Home-page statistics
pub struct StatsService {
    ctx: Arc<ServiceContext>,
}

impl StatsService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Resolver statistics with the `recent` most recently created public domains
    pub async fn stats(&self, recent: usize) -> CoreResult<ResolverStats> {
        let domains = self.ctx.domain_repository.list_domains().await?;
        let proxies = self.ctx.proxy_repository.list_proxies().await?;

        let online_domains = domains.iter().filter(|d| d.service_online).count();
        let online_proxies = proxies.iter().filter(|p| p.online).count();

        let mut recent_domains: Vec<_> = domains.iter().filter(|d| d.public).cloned().collect();
        recent_domains.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        recent_domains.truncate(recent);

        Ok(ResolverStats {
            num_domains_issued: domains.len(),
            percent_online_domains: fraction(online_domains, domains.len()),
            num_entry_proxies: proxies.len(),
            percent_online_proxies: fraction(online_proxies, proxies.len()),
            recent_domains,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{DomainService, ProxyService};
    use crate::test_utils::create_test_context;
    use crate::types::RegisterDomainRequest;

    #[tokio::test]
    async fn stats_count_live_rows() {
        let ctx = create_test_context();
        let domains = DomainService::new(Arc::clone(&ctx));
        for name in ["alpha", "bravo", "charlie", "delta"] {
            domains
                .register_domain(&RegisterDomainRequest {
                    domain_name: name.into(),
                    onion_address: None,
                    public: name != "delta",
                })
                .await
                .unwrap();
        }
        domains.record_service_check("alpha", false).await.unwrap();

        let proxies = ProxyService::new(Arc::clone(&ctx));
        proxies.register_proxy("8.8.8.8").await.unwrap();
        proxies.register_proxy("1.1.1.1").await.unwrap();
        proxies.record_proxy_check("1.1.1.1", true).await.unwrap();

        let stats = StatsService::new(ctx).stats(2).await.unwrap();
        assert_eq!(stats.num_domains_issued, 4);
        assert!((stats.percent_online_domains - 0.75).abs() < f64::EPSILON);
        assert_eq!(stats.num_entry_proxies, 2);
        assert!((stats.percent_online_proxies - 0.5).abs() < f64::EPSILON);

        let recent: Vec<&str> = stats
            .recent_domains
            .iter()
            .map(|d| d.domain_name.as_str())
            .collect();
        assert_eq!(recent, vec!["charlie.oniongate.com", "bravo.oniongate.com"]);
    }

    #[tokio::test]
    async fn empty_registry_has_zero_fractions() {
        let stats = StatsService::new(create_test_context()).stats(5).await.unwrap();
        assert_eq!(stats.num_domains_issued, 0);
        assert!(stats.percent_online_domains.abs() < f64::EPSILON);
        assert!(stats.recent_domains.is_empty());
    }
}
