//! `RecordRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use oniongate_core::error::{CoreError, CoreResult};
use oniongate_core::traits::RecordRepository;
use oniongate_core::types::{clears_onion_address, NewRecord, Record, RecordDeletion, RecordType};
use oniongate_core::utils::datetime::parse_rfc3339;

use super::domain_repo::{find_active_domain, save_domain};
use super::entity::record;
use super::{db_err, flag, SqliteStore};

impl record::Model {
    /// Convert a `SeaORM` row model into a core `Record`.
    fn into_record(self) -> CoreResult<Record> {
        let ttl = self
            .ttl
            .map(u32::try_from)
            .transpose()
            .map_err(|e| CoreError::SerializationError(format!("Invalid ttl: {e}")))?;

        Ok(Record {
            id: self.id,
            domain_id: self.domain_id,
            label: self.label,
            ttl,
            record_type: self.record_type.parse()?,
            value: self.value,
            is_onion_mapping: self.is_onion_mapping,
            created_at: parse_rfc3339(&self.created_at)?,
            dirty: flag(self.dirty),
        })
    }
}

#[async_trait]
impl RecordRepository for SqliteStore {
    async fn list_records(&self, domain_id: i64) -> CoreResult<Vec<Record>> {
        let rows = record::Entity::find()
            .filter(record::Column::DomainId.eq(domain_id))
            .order_by_asc(record::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query records"))?;

        rows.into_iter().map(record::Model::into_record).collect()
    }

    async fn find_record(&self, domain_id: i64, record_id: i64) -> CoreResult<Option<Record>> {
        let row = record::Entity::find_by_id(record_id)
            .filter(record::Column::DomainId.eq(domain_id))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query record"))?;

        row.map(record::Model::into_record).transpose()
    }

    async fn insert_record(
        &self,
        domain_id: i64,
        new_record: NewRecord,
        max_records: usize,
    ) -> CoreResult<Record> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let mut domain = find_active_domain(&txn, domain_id).await?;

        let count = record::Entity::find()
            .filter(record::Column::DomainId.eq(domain_id))
            .count(&txn)
            .await
            .map_err(db_err("Failed to count records"))?;
        if usize::try_from(count).unwrap_or(usize::MAX) >= max_records {
            return Err(CoreError::QuotaExceeded(format!(
                "{} already holds {count} records (limit {max_records})",
                domain.domain_name
            )));
        }

        let now = Utc::now();
        let active_model = record::ActiveModel {
            id: NotSet,
            domain_id: Set(domain_id),
            label: Set(new_record.label),
            ttl: Set(new_record.ttl.map(i64::from)),
            record_type: Set(new_record.record_type.as_str().to_string()),
            value: Set(new_record.value),
            is_onion_mapping: Set(new_record.is_onion_mapping.clone()),
            created_at: Set(now.to_rfc3339()),
            dirty: Set(1),
        };
        let created = active_model
            .insert(&txn)
            .await
            .map_err(db_err("Failed to insert record"))?
            .into_record()?;

        if let Some(onion) = new_record.is_onion_mapping {
            domain.onion_address = Some(onion);
            domain.dirty = true;
            domain.updated_at = now;
            save_domain(&txn, &domain).await?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;
        Ok(created)
    }

    async fn delete_record(&self, domain_id: i64, record_id: i64) -> CoreResult<RecordDeletion> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let mut domain = find_active_domain(&txn, domain_id).await?;

        let row = record::Entity::find_by_id(record_id)
            .filter(record::Column::DomainId.eq(domain_id))
            .one(&txn)
            .await
            .map_err(db_err("Failed to query record"))?
            .ok_or_else(|| CoreError::RecordNotFound(record_id.to_string()))?;
        let record = row.clone().into_record()?;

        let matching = match domain.onion_address.as_deref() {
            Some(onion) => record::Entity::find()
                .filter(record::Column::DomainId.eq(domain_id))
                .filter(record::Column::RecordType.eq(RecordType::Txt.as_str()))
                .filter(record::Column::IsOnionMapping.eq(onion))
                .count(&txn)
                .await
                .map_err(db_err("Failed to count onion mappings"))?,
            None => 0,
        };
        let onion_cleared = clears_onion_address(
            domain.onion_address.as_deref(),
            &record,
            usize::try_from(matching).unwrap_or(usize::MAX),
        );

        row.delete(&txn)
            .await
            .map_err(db_err("Failed to delete record"))?;

        if onion_cleared {
            domain.onion_address = None;
            domain.dirty = true;
            domain.updated_at = Utc::now();
            save_domain(&txn, &domain).await?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;
        Ok(RecordDeletion {
            record,
            onion_cleared,
        })
    }
}
