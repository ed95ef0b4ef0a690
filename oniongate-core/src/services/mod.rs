//! Business logic service layer

mod domain_service;
mod proxy_service;
mod record_service;
mod stats_service;
mod zone_service;

pub use domain_service::DomainService;
pub use proxy_service::ProxyService;
pub use record_service::RecordService;
pub use stats_service::StatsService;
pub use zone_service::ZoneService;

use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::config::ResolverConfig;
use crate::error::{CoreError, CoreResult};
use crate::traits::{DomainRepository, ProxyRepository, RecordRepository, ZoneSnapshotSource};
use crate::types::Domain;
use crate::zone::{ZoneSynthesizer, ZoneTemplateLoader};

/// Service context - holds all dependencies
///
/// The platform layer creates this context and injects its storage implementation.
pub struct ServiceContext {
    /// Immutable resolver settings
    pub config: Arc<ResolverConfig>,
    /// Ownership token signer
    pub signer: Arc<TokenSigner>,
    pub domain_repository: Arc<dyn DomainRepository>,
    pub record_repository: Arc<dyn RecordRepository>,
    pub proxy_repository: Arc<dyn ProxyRepository>,
    /// Consistent reads for zone synthesis
    pub zone_source: Arc<dyn ZoneSnapshotSource>,
    /// Seed template source
    pub template_loader: Arc<dyn ZoneTemplateLoader>,
    /// Shared so SOA serials keep increasing across services
    pub synthesizer: ZoneSynthesizer,
}

impl ServiceContext {
    /// Create service context
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<ResolverConfig>,
        signer: Arc<TokenSigner>,
        domain_repository: Arc<dyn DomainRepository>,
        record_repository: Arc<dyn RecordRepository>,
        proxy_repository: Arc<dyn ProxyRepository>,
        zone_source: Arc<dyn ZoneSnapshotSource>,
        template_loader: Arc<dyn ZoneTemplateLoader>,
    ) -> Self {
        let synthesizer = ZoneSynthesizer::new(Arc::clone(&config));
        Self {
            config,
            signer,
            domain_repository,
            record_repository,
            proxy_repository,
            zone_source,
            template_loader,
            synthesizer,
        }
    }

    /// Normalize a user-supplied domain name for lookup
    ///
    /// Lowercases and strips a trailing dot; a bare label is taken to live under the
    /// subdomain host.
    #[must_use]
    pub fn canonical_domain_name(&self, raw: &str) -> String {
        let name = raw.trim().trim_end_matches('.').to_lowercase();
        if name.contains('.') {
            name
        } else {
            format!(
                "{name}.{}",
                self.config.subdomain_host.trim_end_matches('.').to_lowercase()
            )
        }
    }

    /// Find a non-deleted domain or fail with `DomainNotFound`
    pub async fn require_domain(&self, raw_name: &str) -> CoreResult<Domain> {
        let name = self.canonical_domain_name(raw_name);
        self.domain_repository
            .find_domain(&name)
            .await?
            .ok_or(CoreError::DomainNotFound(name))
    }

    /// Find a domain and check the caller's ownership token against it
    pub async fn authorized_domain(&self, raw_name: &str, token: Option<&str>) -> CoreResult<Domain> {
        let domain = self.require_domain(raw_name).await?;
        self.signer.authorize_for(token, &domain.domain_name)?;
        Ok(domain)
    }
}

/// Log a failed operation at a level matching its kind
pub(crate) fn log_failure(operation: &str, err: &CoreError) {
    if err.is_expected() {
        log::warn!("{operation} rejected: {err}");
    } else {
        log::error!("{operation} failed: {err}");
    }
}
