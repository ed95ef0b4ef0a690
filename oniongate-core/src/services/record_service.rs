//! DNS record management service

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::services::{log_failure, ServiceContext};
use crate::types::{CreateRecordRequest, Record, RecordDeletion};
use crate::validation::validate_new_record;

/// Record management service
pub struct RecordService {
    ctx: Arc<ServiceContext>,
}

impl RecordService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// List the records of a domain
    pub async fn list_records(&self, domain_name: &str) -> CoreResult<Vec<Record>> {
        let domain = self.ctx.require_domain(domain_name).await?;
        self.ctx.record_repository.list_records(domain.id).await
    }

    pub async fn get_record(&self, domain_name: &str, record_id: i64) -> CoreResult<Record> {
        let domain = self.ctx.require_domain(domain_name).await?;
        self.ctx
            .record_repository
            .find_record(domain.id, record_id)
            .await?
            .ok_or_else(|| CoreError::RecordNotFound(record_id.to_string()))
    }

    /// Create a record on an owned domain
    ///
    /// A TXT `onion=<address>` record also becomes the domain's onion address.
    pub async fn create_record(
        &self,
        domain_name: &str,
        token: Option<&str>,
        request: &CreateRecordRequest,
    ) -> CoreResult<Record> {
        let domain = self.ctx.authorized_domain(domain_name, token).await?;
        let new_record = validate_new_record(request, &self.ctx.config)?;

        let record = self
            .ctx
            .record_repository
            .insert_record(domain.id, new_record, self.ctx.config.max_records)
            .await
            .inspect_err(|e| log_failure("Record creation", e))?;

        log::info!(
            "Created {} record {} on {}",
            record.record_type,
            record.id,
            domain.domain_name
        );
        Ok(record)
    }

    /// Delete a record of an owned domain
    pub async fn delete_record(
        &self,
        domain_name: &str,
        token: Option<&str>,
        record_id: i64,
    ) -> CoreResult<RecordDeletion> {
        let domain = self.ctx.authorized_domain(domain_name, token).await?;
        let deletion = self
            .ctx
            .record_repository
            .delete_record(domain.id, record_id)
            .await?;

        if deletion.onion_cleared {
            log::info!(
                "Removed last onion mapping of {}, onion address cleared",
                domain.domain_name
            );
        }
        Ok(deletion)
    }
}
