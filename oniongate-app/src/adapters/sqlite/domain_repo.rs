//! `DomainRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use oniongate_core::error::{CoreError, CoreResult};
use oniongate_core::traits::DomainRepository;
use oniongate_core::types::{Domain, DomainUpdate, NewDomain};
use oniongate_core::utils::datetime::{parse_rfc3339, parse_rfc3339_opt};

use super::entity::domain;
use super::{db_err, flag, storage_err, to_flag, SqliteStore};

impl domain::Model {
    /// Convert a `SeaORM` row model into a core `Domain`.
    pub(super) fn into_domain(self) -> CoreResult<Domain> {
        Ok(Domain {
            id: self.id,
            created_at: parse_rfc3339(&self.created_at)?,
            updated_at: parse_rfc3339(&self.updated_at)?,
            service_last_online: parse_rfc3339_opt(self.service_last_online.as_deref())?,
            domain_name: self.domain_name,
            zone: self.zone,
            onion_address: self.onion_address,
            public: flag(self.public),
            dirty: flag(self.dirty),
            service_online: flag(self.service_online),
            deleted: flag(self.deleted),
        })
    }
}

/// Convert a core `Domain` into a fully-set active model for update.
fn domain_to_active_model(domain: &Domain) -> domain::ActiveModel {
    domain::ActiveModel {
        id: Set(domain.id),
        domain_name: Set(domain.domain_name.clone()),
        zone: Set(domain.zone.clone()),
        onion_address: Set(domain.onion_address.clone()),
        public: Set(to_flag(domain.public)),
        created_at: Set(domain.created_at.to_rfc3339()),
        updated_at: Set(domain.updated_at.to_rfc3339()),
        dirty: Set(to_flag(domain.dirty)),
        service_last_online: Set(domain.service_last_online.map(|t| t.to_rfc3339())),
        service_online: Set(to_flag(domain.service_online)),
        deleted: Set(to_flag(domain.deleted)),
    }
}

/// Load a non-deleted domain by id on any connection or transaction.
pub(super) async fn find_active_domain<C: ConnectionTrait>(conn: &C, id: i64) -> CoreResult<Domain> {
    domain::Entity::find_by_id(id)
        .filter(domain::Column::Deleted.eq(0))
        .one(conn)
        .await
        .map_err(db_err("Failed to query domain"))?
        .ok_or_else(|| CoreError::DomainNotFound(format!("id {id}")))?
        .into_domain()
}

/// Persist every column of an already-loaded domain.
pub(super) async fn save_domain<C: ConnectionTrait>(conn: &C, domain: &Domain) -> CoreResult<()> {
    domain_to_active_model(domain)
        .update(conn)
        .await
        .map_err(db_err("Failed to update domain"))?;
    Ok(())
}

impl SqliteStore {
    /// Load, modify and store one domain inside a transaction.
    async fn modify_domain<F>(&self, id: i64, modify: F) -> CoreResult<Domain>
    where
        F: FnOnce(&mut Domain) + Send,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let mut domain = find_active_domain(&txn, id).await?;
        modify(&mut domain);
        save_domain(&txn, &domain).await?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;
        Ok(domain)
    }

    async fn query_domains(&self, public_only: bool) -> CoreResult<Vec<Domain>> {
        let mut query = domain::Entity::find().filter(domain::Column::Deleted.eq(0));
        if public_only {
            query = query.filter(domain::Column::Public.eq(1));
        }
        let rows = query
            .order_by_asc(domain::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query domains"))?;

        rows.into_iter().map(domain::Model::into_domain).collect()
    }
}

#[async_trait]
impl DomainRepository for SqliteStore {
    async fn insert_domain(&self, domain: NewDomain) -> CoreResult<Domain> {
        let now = Utc::now().to_rfc3339();
        let name = domain.domain_name.clone();
        let active_model = domain::ActiveModel {
            id: NotSet,
            domain_name: Set(domain.domain_name),
            zone: Set(domain.zone),
            onion_address: Set(domain.onion_address),
            public: Set(to_flag(domain.public)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            dirty: Set(1),
            service_last_online: Set(None),
            service_online: Set(1),
            deleted: Set(0),
        };

        let row = active_model.insert(&self.db).await.map_err(|e| {
            storage_err(
                "Failed to insert domain",
                || format!("{name} is already registered"),
                &e,
            )
        })?;
        row.into_domain()
    }

    async fn find_domain(&self, domain_name: &str) -> CoreResult<Option<Domain>> {
        let row = domain::Entity::find()
            .filter(domain::Column::DomainName.eq(domain_name))
            .filter(domain::Column::Deleted.eq(0))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query domain"))?;

        row.map(domain::Model::into_domain).transpose()
    }

    async fn update_domain(&self, id: i64, update: &DomainUpdate) -> CoreResult<Domain> {
        let update = update.clone();
        self.modify_domain(id, move |domain| update.apply_to(domain, Utc::now()))
            .await
    }

    async fn soft_delete_domain(&self, id: i64) -> CoreResult<Domain> {
        self.modify_domain(id, |domain| {
            domain.deleted = true;
            domain.dirty = true;
            domain.updated_at = Utc::now();
        })
        .await
    }

    async fn list_domains(&self) -> CoreResult<Vec<Domain>> {
        self.query_domains(false).await
    }

    async fn list_public_domains(&self) -> CoreResult<Vec<Domain>> {
        self.query_domains(true).await
    }

    async fn record_service_check(
        &self,
        id: i64,
        online: bool,
        checked_at: DateTime<Utc>,
    ) -> CoreResult<Domain> {
        self.modify_domain(id, move |domain| {
            domain.service_online = online;
            if online {
                domain.service_last_online = Some(checked_at);
            }
        })
        .await
    }
}
