//! `ProxyRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};

use oniongate_core::error::{CoreError, CoreResult};
use oniongate_core::traits::ProxyRepository;
use oniongate_core::types::{IpVersion, NewProxy, Proxy};
use oniongate_core::utils::datetime::{parse_rfc3339, parse_rfc3339_opt};

use super::entity::proxy;
use super::{db_err, flag, storage_err, to_flag, SqliteStore};

impl proxy::Model {
    /// Convert a `SeaORM` row model into a core `Proxy`.
    pub(super) fn into_proxy(self) -> CoreResult<Proxy> {
        let version = u8::try_from(self.ip_type)
            .map_err(|e| CoreError::SerializationError(format!("Invalid ip_type: {e}")))?;

        Ok(Proxy {
            id: self.id,
            ip_type: IpVersion::try_from(version)?,
            created_at: parse_rfc3339(&self.created_at)?,
            last_checked: parse_rfc3339_opt(self.last_checked.as_deref())?,
            last_successful_check: parse_rfc3339_opt(self.last_successful_check.as_deref())?,
            ip_address: self.ip_address,
            online: flag(self.online),
            dirty: flag(self.dirty),
        })
    }
}

#[async_trait]
impl ProxyRepository for SqliteStore {
    async fn insert_proxy(&self, new_proxy: NewProxy) -> CoreResult<Proxy> {
        let address = new_proxy.ip_address.clone();
        let active_model = proxy::ActiveModel {
            id: NotSet,
            ip_address: Set(new_proxy.ip_address),
            ip_type: Set(i32::from(u8::from(new_proxy.ip_type))),
            created_at: Set(Utc::now().to_rfc3339()),
            last_checked: Set(None),
            last_successful_check: Set(None),
            online: Set(0),
            dirty: Set(1),
        };

        let row = active_model.insert(&self.db).await.map_err(|e| {
            storage_err(
                "Failed to insert proxy",
                || format!("Proxy {address} is already registered"),
                &e,
            )
        })?;
        row.into_proxy()
    }

    async fn find_proxy(&self, ip_address: &str) -> CoreResult<Option<Proxy>> {
        let row = proxy::Entity::find()
            .filter(proxy::Column::IpAddress.eq(ip_address))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query proxy"))?;

        row.map(proxy::Model::into_proxy).transpose()
    }

    async fn list_proxies(&self) -> CoreResult<Vec<Proxy>> {
        let rows = proxy::Entity::find()
            .order_by_asc(proxy::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query proxies"))?;

        rows.into_iter().map(proxy::Model::into_proxy).collect()
    }

    async fn record_proxy_check(
        &self,
        ip_address: &str,
        reachable: bool,
        checked_at: DateTime<Utc>,
    ) -> CoreResult<Proxy> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let mut checked = proxy::Entity::find()
            .filter(proxy::Column::IpAddress.eq(ip_address))
            .one(&txn)
            .await
            .map_err(db_err("Failed to query proxy"))?
            .ok_or_else(|| CoreError::ProxyNotFound(ip_address.to_string()))?
            .into_proxy()?;
        checked.record_check(reachable, checked_at);

        proxy::ActiveModel {
            id: Set(checked.id),
            last_checked: Set(checked.last_checked.map(|t| t.to_rfc3339())),
            last_successful_check: Set(checked.last_successful_check.map(|t| t.to_rfc3339())),
            online: Set(to_flag(checked.online)),
            dirty: Set(to_flag(checked.dirty)),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err("Failed to update proxy"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;
        Ok(checked)
    }
}
