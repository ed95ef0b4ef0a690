//! `ZoneSnapshotSource` implementation for `SqliteStore`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

use oniongate_core::error::{CoreError, CoreResult};
use oniongate_core::traits::ZoneSnapshotSource;
use oniongate_core::types::ZoneSnapshot;
use oniongate_core::utils::datetime::parse_rfc3339;

use super::entity::{domain, proxy, record, zone_serial};
use super::{db_err, SqliteStore};

async fn stored_serial<C: ConnectionTrait>(conn: &C, zone: &str) -> CoreResult<Option<u32>> {
    let Some(row) = zone_serial::Entity::find_by_id(zone.to_string())
        .one(conn)
        .await
        .map_err(db_err("Failed to query zone serial"))?
    else {
        return Ok(None);
    };
    u32::try_from(row.serial).map(Some).map_err(|_| {
        CoreError::StorageError(format!("Stored serial {} of {zone} is out of range", row.serial))
    })
}

/// Record `serial` for `zone` unless a higher one is already stored.
async fn save_serial<C: ConnectionTrait>(
    conn: &C,
    zone: &str,
    serial: u32,
    published_at: DateTime<Utc>,
) -> CoreResult<()> {
    let previous = stored_serial(conn, zone).await?;
    if previous.is_some_and(|previous| previous >= serial) {
        return Ok(());
    }

    let row = zone_serial::ActiveModel {
        zone: Set(zone.to_string()),
        serial: Set(i64::from(serial)),
        published_at: Set(published_at.to_rfc3339()),
    };
    if previous.is_some() {
        row.update(conn)
            .await
            .map_err(db_err("Failed to update zone serial"))?;
    } else {
        row.insert(conn)
            .await
            .map_err(db_err("Failed to insert zone serial"))?;
    }
    Ok(())
}

#[async_trait]
impl ZoneSnapshotSource for SqliteStore {
    async fn list_domain_zones(&self) -> CoreResult<Vec<String>> {
        let zones: Vec<String> = domain::Entity::find()
            .select_only()
            .column(domain::Column::Zone)
            .distinct()
            .filter(domain::Column::Deleted.eq(0))
            .order_by_asc(domain::Column::Zone)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query zones"))?;

        Ok(zones)
    }

    async fn zone_snapshot(&self, zone: &str) -> CoreResult<ZoneSnapshot> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let domains = domain::Entity::find()
            .filter(domain::Column::Zone.eq(zone))
            .filter(domain::Column::Deleted.eq(0))
            .order_by_asc(domain::Column::Id)
            .all(&txn)
            .await
            .map_err(db_err("Failed to query zone domains"))?;
        let proxies = proxy::Entity::find()
            .filter(proxy::Column::Online.eq(1))
            .order_by_asc(proxy::Column::Id)
            .all(&txn)
            .await
            .map_err(db_err("Failed to query online proxies"))?;
        let last_serial = stored_serial(&txn, zone).await?;
        let taken_at = Utc::now();

        txn.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;

        Ok(ZoneSnapshot {
            zone: zone.to_string(),
            domains: domains
                .into_iter()
                .map(domain::Model::into_domain)
                .collect::<CoreResult<_>>()?,
            online_proxies: proxies
                .into_iter()
                .map(proxy::Model::into_proxy)
                .collect::<CoreResult<_>>()?,
            last_serial,
            taken_at,
        })
    }

    async fn mark_published(
        &self,
        zone: &str,
        published_at: DateTime<Utc>,
        include_proxies: bool,
        serial: u32,
    ) -> CoreResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        // Timestamps are compared after parsing; RFC3339 text does not order reliably.
        let mut domain_ids = BTreeSet::new();
        for row in domain::Entity::find()
            .filter(domain::Column::Zone.eq(zone))
            .all(&txn)
            .await
            .map_err(db_err("Failed to query zone domains"))?
        {
            if parse_rfc3339(&row.updated_at)? <= published_at {
                domain_ids.insert(row.id);
            }
        }

        let mut record_ids = Vec::new();
        if !domain_ids.is_empty() {
            for row in record::Entity::find()
                .filter(record::Column::DomainId.is_in(domain_ids.iter().copied()))
                .filter(record::Column::Dirty.eq(1))
                .all(&txn)
                .await
                .map_err(db_err("Failed to query dirty records"))?
            {
                if parse_rfc3339(&row.created_at)? <= published_at {
                    record_ids.push(row.id);
                }
            }
        }

        let mut proxy_ids = Vec::new();
        if include_proxies {
            for row in proxy::Entity::find()
                .filter(proxy::Column::Dirty.eq(1))
                .all(&txn)
                .await
                .map_err(db_err("Failed to query dirty proxies"))?
            {
                let touched = row.last_checked.as_deref().unwrap_or(&row.created_at);
                if parse_rfc3339(touched)? <= published_at {
                    proxy_ids.push(row.id);
                }
            }
        }

        if !domain_ids.is_empty() {
            domain::Entity::update_many()
                .col_expr(domain::Column::Dirty, Expr::value(0))
                .filter(domain::Column::Id.is_in(domain_ids))
                .exec(&txn)
                .await
                .map_err(db_err("Failed to clear domain dirty flags"))?;
        }
        if !record_ids.is_empty() {
            record::Entity::update_many()
                .col_expr(record::Column::Dirty, Expr::value(0))
                .filter(record::Column::Id.is_in(record_ids))
                .exec(&txn)
                .await
                .map_err(db_err("Failed to clear record dirty flags"))?;
        }
        if !proxy_ids.is_empty() {
            proxy::Entity::update_many()
                .col_expr(proxy::Column::Dirty, Expr::value(0))
                .filter(proxy::Column::Id.is_in(proxy_ids))
                .exec(&txn)
                .await
                .map_err(db_err("Failed to clear proxy dirty flags"))?;
        }
        save_serial(&txn, zone, serial, published_at).await?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;
        Ok(())
    }
}
