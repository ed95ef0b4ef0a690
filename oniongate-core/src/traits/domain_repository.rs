//! Domain and record persistence abstract Trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::types::{Domain, DomainUpdate, NewDomain, NewRecord, Record, RecordDeletion};

/// Domain storage
///
/// Platform implementation:
/// - Tests / embedded: `InMemoryRegistry`
/// - Application: `SqliteStore` (`SeaORM`)
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// Insert a new domain atomically
    ///
    /// Fails with `Conflict` when a non-deleted domain already has the same name.
    async fn insert_domain(&self, domain: NewDomain) -> CoreResult<Domain>;

    /// Find a non-deleted domain by its full lowercase name
    async fn find_domain(&self, domain_name: &str) -> CoreResult<Option<Domain>>;

    /// Apply a partial update, marking the domain dirty
    ///
    /// Fails with `DomainNotFound` if the domain is absent or deleted.
    async fn update_domain(&self, id: i64, update: &DomainUpdate) -> CoreResult<Domain>;

    /// Soft-delete a domain (the row is kept with `deleted = true`)
    async fn soft_delete_domain(&self, id: i64) -> CoreResult<Domain>;

    /// All non-deleted domains, primary key ascending
    async fn list_domains(&self) -> CoreResult<Vec<Domain>>;

    /// Non-deleted public domains, primary key ascending
    async fn list_public_domains(&self) -> CoreResult<Vec<Domain>>;

    /// Record the outcome of an onion-service liveness scan
    ///
    /// # Arguments
    /// * `id` - Domain ID
    /// * `online` - whether the service answered
    /// * `checked_at` - scan time, stored as `service_last_online` when online
    async fn record_service_check(
        &self,
        id: i64,
        online: bool,
        checked_at: DateTime<Utc>,
    ) -> CoreResult<Domain>;
}

/// Record storage
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Records of a domain, primary key ascending
    async fn list_records(&self, domain_id: i64) -> CoreResult<Vec<Record>>;

    async fn find_record(&self, domain_id: i64, record_id: i64) -> CoreResult<Option<Record>>;

    /// Insert a record in one atomic unit with its side effects
    ///
    /// Fails with `DomainNotFound` for a missing or deleted domain and with
    /// `QuotaExceeded` once the domain holds `max_records` records. A record carrying
    /// an onion mapping copies the address onto the domain.
    async fn insert_record(
        &self,
        domain_id: i64,
        record: NewRecord,
        max_records: usize,
    ) -> CoreResult<Record>;

    /// Delete a record in one atomic unit with its side effects
    ///
    /// When the record was the last TXT mapping of the domain's current onion address,
    /// the address is cleared (see `clears_onion_address`).
    async fn delete_record(&self, domain_id: i64, record_id: i64) -> CoreResult<RecordDeletion>;
}
