//! Domain management service

use std::sync::Arc;

use chrono::Utc;

use crate::error::CoreResult;
use crate::services::{log_failure, ServiceContext};
use crate::types::{
    Domain, DomainDetails, DomainUpdate, NewDomain, RegisterDomainRequest, RegisteredDomain,
    UpdateDomainRequest,
};
use crate::validation::{classify_domain_name, classify_domain_onion};

/// Domain management service
pub struct DomainService {
    ctx: Arc<ServiceContext>,
}

impl DomainService {
    /// Create domain service instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Validate an optional raw onion address; blank input means "no mapping".
    fn optional_onion(&self, raw: Option<&str>) -> CoreResult<Option<String>> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => classify_domain_onion(raw, &self.ctx.config).map(Some),
            None => Ok(None),
        }
    }

    /// Register a domain and hand out its one-time ownership token
    pub async fn register_domain(
        &self,
        request: &RegisterDomainRequest,
    ) -> CoreResult<RegisteredDomain> {
        let classified = classify_domain_name(&request.domain_name, &self.ctx.config)?;
        let onion_address = self.optional_onion(request.onion_address.as_deref())?;

        let domain = self
            .ctx
            .domain_repository
            .insert_domain(NewDomain {
                domain_name: classified.domain_name(),
                zone: classified.zone,
                onion_address,
                public: request.public,
            })
            .await
            .inspect_err(|e| log_failure("Domain registration", e))?;

        let update_token = self.ctx.signer.issue(&domain.domain_name)?;
        log::info!("Registered domain {}", domain.domain_name);

        Ok(RegisteredDomain {
            domain,
            update_token,
        })
    }

    /// Update the onion mapping and/or public flag of an owned domain
    pub async fn update_domain(
        &self,
        domain_name: &str,
        token: Option<&str>,
        request: &UpdateDomainRequest,
    ) -> CoreResult<Domain> {
        let domain = self.ctx.authorized_domain(domain_name, token).await?;

        let onion_address = match &request.onion_address {
            Some(raw) => Some(self.optional_onion(raw.as_deref())?),
            None => None,
        };
        let update = DomainUpdate {
            onion_address,
            public: request.public,
        };

        let updated = self
            .ctx
            .domain_repository
            .update_domain(domain.id, &update)
            .await?;
        log::info!(
            "Updated domain {} (onion: {})",
            updated.domain_name,
            updated.onion_address.as_deref().unwrap_or("-")
        );
        Ok(updated)
    }

    /// Soft-delete an owned domain
    pub async fn delete_domain(&self, domain_name: &str, token: Option<&str>) -> CoreResult<Domain> {
        let domain = self.ctx.authorized_domain(domain_name, token).await?;
        let deleted = self
            .ctx
            .domain_repository
            .soft_delete_domain(domain.id)
            .await?;
        log::info!("Deleted domain {}", deleted.domain_name);
        Ok(deleted)
    }

    /// Get one domain with its records
    pub async fn get_domain(&self, domain_name: &str) -> CoreResult<DomainDetails> {
        let domain = self.ctx.require_domain(domain_name).await?;
        let records = self.ctx.record_repository.list_records(domain.id).await?;
        Ok(DomainDetails { domain, records })
    }

    /// Public domain index
    pub async fn list_public_domains(&self) -> CoreResult<Vec<Domain>> {
        self.ctx.domain_repository.list_public_domains().await
    }

    /// Record an onion-service liveness scan result (external health checker hook)
    pub async fn record_service_check(&self, domain_name: &str, online: bool) -> CoreResult<Domain> {
        let domain = self.ctx.require_domain(domain_name).await?;
        let checked = self
            .ctx
            .domain_repository
            .record_service_check(domain.id, online, Utc::now())
            .await?;
        log::debug!(
            "Service check for {}: {}",
            checked.domain_name,
            if online { "online" } else { "offline" }
        );
        Ok(checked)
    }
}
