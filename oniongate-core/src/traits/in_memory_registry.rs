//! In-memory registry
//!
//! Implements every storage trait over one `RwLock`, so each mutation is atomic and
//! each snapshot is consistent.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{DomainRepository, ProxyRepository, RecordRepository, ZoneSnapshotSource};
use crate::error::{CoreError, CoreResult};
use crate::types::{
    clears_onion_address, Domain, DomainUpdate, NewDomain, NewProxy, NewRecord, Proxy, Record,
    RecordDeletion, RecordType, ZoneSnapshot,
};

#[derive(Default)]
struct RegistryState {
    domains: BTreeMap<i64, Domain>,
    records: BTreeMap<i64, Record>,
    proxies: BTreeMap<i64, Proxy>,
    serials: BTreeMap<String, u32>,
    last_id: i64,
}

impl RegistryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn active_domain_mut(&mut self, id: i64) -> CoreResult<&mut Domain> {
        self.domains
            .get_mut(&id)
            .filter(|d| !d.deleted)
            .ok_or_else(|| CoreError::DomainNotFound(format!("id {id}")))
    }
}

/// Registry held entirely in memory
///
/// Default implementation, used by tests and embedders without a database.
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl InMemoryRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DomainRepository for InMemoryRegistry {
    async fn insert_domain(&self, domain: NewDomain) -> CoreResult<Domain> {
        let mut state = self.state.write().await;
        if state
            .domains
            .values()
            .any(|d| !d.deleted && d.domain_name == domain.domain_name)
        {
            return Err(CoreError::Conflict(format!(
                "{} is already registered",
                domain.domain_name
            )));
        }

        let now = Utc::now();
        let id = state.next_id();
        let created = Domain {
            id,
            domain_name: domain.domain_name,
            zone: domain.zone,
            onion_address: domain.onion_address,
            public: domain.public,
            created_at: now,
            updated_at: now,
            dirty: true,
            service_last_online: None,
            service_online: true,
            deleted: false,
        };
        state.domains.insert(id, created.clone());
        Ok(created)
    }

    async fn find_domain(&self, domain_name: &str) -> CoreResult<Option<Domain>> {
        Ok(self
            .state
            .read()
            .await
            .domains
            .values()
            .find(|d| !d.deleted && d.domain_name == domain_name)
            .cloned())
    }

    async fn update_domain(&self, id: i64, update: &DomainUpdate) -> CoreResult<Domain> {
        let mut state = self.state.write().await;
        let domain = state.active_domain_mut(id)?;
        update.apply_to(domain, Utc::now());
        Ok(domain.clone())
    }

    async fn soft_delete_domain(&self, id: i64) -> CoreResult<Domain> {
        let mut state = self.state.write().await;
        let domain = state.active_domain_mut(id)?;
        domain.deleted = true;
        domain.dirty = true;
        domain.updated_at = Utc::now();
        Ok(domain.clone())
    }

    async fn list_domains(&self) -> CoreResult<Vec<Domain>> {
        Ok(self
            .state
            .read()
            .await
            .domains
            .values()
            .filter(|d| !d.deleted)
            .cloned()
            .collect())
    }

    async fn list_public_domains(&self) -> CoreResult<Vec<Domain>> {
        Ok(self
            .state
            .read()
            .await
            .domains
            .values()
            .filter(|d| !d.deleted && d.public)
            .cloned()
            .collect())
    }

    async fn record_service_check(
        &self,
        id: i64,
        online: bool,
        checked_at: DateTime<Utc>,
    ) -> CoreResult<Domain> {
        let mut state = self.state.write().await;
        let domain = state.active_domain_mut(id)?;
        domain.service_online = online;
        if online {
            domain.service_last_online = Some(checked_at);
        }
        Ok(domain.clone())
    }
}

#[async_trait]
impl RecordRepository for InMemoryRegistry {
    async fn list_records(&self, domain_id: i64) -> CoreResult<Vec<Record>> {
        Ok(self
            .state
            .read()
            .await
            .records
            .values()
            .filter(|r| r.domain_id == domain_id)
            .cloned()
            .collect())
    }

    async fn find_record(&self, domain_id: i64, record_id: i64) -> CoreResult<Option<Record>> {
        Ok(self
            .state
            .read()
            .await
            .records
            .get(&record_id)
            .filter(|r| r.domain_id == domain_id)
            .cloned())
    }

    async fn insert_record(
        &self,
        domain_id: i64,
        record: NewRecord,
        max_records: usize,
    ) -> CoreResult<Record> {
        let mut state = self.state.write().await;
        let domain_name = state.active_domain_mut(domain_id)?.domain_name.clone();

        let count = state
            .records
            .values()
            .filter(|r| r.domain_id == domain_id)
            .count();
        if count >= max_records {
            return Err(CoreError::QuotaExceeded(format!(
                "{domain_name} already holds {count} records (limit {max_records})"
            )));
        }

        let now = Utc::now();
        let id = state.next_id();
        let created = Record {
            id,
            domain_id,
            label: record.label,
            ttl: record.ttl,
            record_type: record.record_type,
            value: record.value,
            is_onion_mapping: record.is_onion_mapping,
            created_at: now,
            dirty: true,
        };
        state.records.insert(id, created.clone());

        if let Some(ref onion) = created.is_onion_mapping {
            let domain = state.active_domain_mut(domain_id)?;
            domain.onion_address = Some(onion.clone());
            domain.dirty = true;
            domain.updated_at = now;
        }
        Ok(created)
    }

    async fn delete_record(&self, domain_id: i64, record_id: i64) -> CoreResult<RecordDeletion> {
        let mut state = self.state.write().await;
        let domain_onion = state.active_domain_mut(domain_id)?.onion_address.clone();

        let record = state
            .records
            .get(&record_id)
            .filter(|r| r.domain_id == domain_id)
            .cloned()
            .ok_or_else(|| CoreError::RecordNotFound(record_id.to_string()))?;

        let matching = domain_onion.as_deref().map_or(0, |onion| {
            state
                .records
                .values()
                .filter(|r| {
                    r.domain_id == domain_id
                        && r.record_type == RecordType::Txt
                        && r.maps_onion(onion)
                })
                .count()
        });
        let onion_cleared = clears_onion_address(domain_onion.as_deref(), &record, matching);

        state.records.remove(&record_id);
        if onion_cleared {
            let domain = state.active_domain_mut(domain_id)?;
            domain.onion_address = None;
            domain.dirty = true;
            domain.updated_at = Utc::now();
        }
        Ok(RecordDeletion {
            record,
            onion_cleared,
        })
    }
}

#[async_trait]
impl ProxyRepository for InMemoryRegistry {
    async fn insert_proxy(&self, proxy: NewProxy) -> CoreResult<Proxy> {
        let mut state = self.state.write().await;
        if state
            .proxies
            .values()
            .any(|p| p.ip_address == proxy.ip_address)
        {
            return Err(CoreError::Conflict(format!(
                "Proxy {} is already registered",
                proxy.ip_address
            )));
        }

        let id = state.next_id();
        let created = Proxy {
            id,
            ip_address: proxy.ip_address,
            ip_type: proxy.ip_type,
            created_at: Utc::now(),
            last_checked: None,
            last_successful_check: None,
            online: false,
            dirty: true,
        };
        state.proxies.insert(id, created.clone());
        Ok(created)
    }

    async fn find_proxy(&self, ip_address: &str) -> CoreResult<Option<Proxy>> {
        Ok(self
            .state
            .read()
            .await
            .proxies
            .values()
            .find(|p| p.ip_address == ip_address)
            .cloned())
    }

    async fn list_proxies(&self) -> CoreResult<Vec<Proxy>> {
        Ok(self.state.read().await.proxies.values().cloned().collect())
    }

    async fn record_proxy_check(
        &self,
        ip_address: &str,
        reachable: bool,
        checked_at: DateTime<Utc>,
    ) -> CoreResult<Proxy> {
        let mut state = self.state.write().await;
        let proxy = state
            .proxies
            .values_mut()
            .find(|p| p.ip_address == ip_address)
            .ok_or_else(|| CoreError::ProxyNotFound(ip_address.to_string()))?;
        proxy.record_check(reachable, checked_at);
        Ok(proxy.clone())
    }
}

#[async_trait]
impl ZoneSnapshotSource for InMemoryRegistry {
    async fn list_domain_zones(&self) -> CoreResult<Vec<String>> {
        let zones: BTreeSet<String> = self
            .state
            .read()
            .await
            .domains
            .values()
            .filter(|d| !d.deleted)
            .map(|d| d.zone.clone())
            .collect();
        Ok(zones.into_iter().collect())
    }

    async fn zone_snapshot(&self, zone: &str) -> CoreResult<ZoneSnapshot> {
        let state = self.state.read().await;
        Ok(ZoneSnapshot {
            zone: zone.to_string(),
            domains: state
                .domains
                .values()
                .filter(|d| !d.deleted && d.zone == zone)
                .cloned()
                .collect(),
            online_proxies: state.proxies.values().filter(|p| p.online).cloned().collect(),
            last_serial: state.serials.get(zone).copied(),
            taken_at: Utc::now(),
        })
    }

    async fn mark_published(
        &self,
        zone: &str,
        published_at: DateTime<Utc>,
        include_proxies: bool,
        serial: u32,
    ) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let RegistryState {
            domains,
            records,
            proxies,
            serials,
            ..
        } = &mut *state;

        let stored = serials.entry(zone.to_string()).or_insert(serial);
        *stored = (*stored).max(serial);

        let mut published_ids = BTreeSet::new();
        for domain in domains
            .values_mut()
            .filter(|d| d.zone == zone && d.updated_at <= published_at)
        {
            domain.dirty = false;
            published_ids.insert(domain.id);
        }
        for record in records
            .values_mut()
            .filter(|r| published_ids.contains(&r.domain_id) && r.created_at <= published_at)
        {
            record.dirty = false;
        }
        if include_proxies {
            for proxy in proxies.values_mut() {
                let touched = proxy.last_checked.unwrap_or(proxy.created_at);
                if touched <= published_at {
                    proxy.dirty = false;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IpVersion;

    fn new_domain(name: &str) -> NewDomain {
        NewDomain {
            domain_name: format!("{name}.oniongate.com"),
            zone: "oniongate.com".into(),
            onion_address: None,
            public: true,
        }
    }

    fn txt_mapping(onion: &str) -> NewRecord {
        NewRecord {
            label: "_onion".into(),
            ttl: None,
            record_type: RecordType::Txt,
            value: format!("onion={onion}"),
            is_onion_mapping: Some(onion.into()),
        }
    }

    #[tokio::test]
    async fn duplicate_domain_conflicts_until_deleted() {
        let registry = InMemoryRegistry::new();
        let first = registry.insert_domain(new_domain("hello")).await.unwrap();
        assert!(matches!(
            registry.insert_domain(new_domain("hello")).await,
            Err(CoreError::Conflict(_))
        ));

        registry.soft_delete_domain(first.id).await.unwrap();
        assert!(registry
            .find_domain("hello.oniongate.com")
            .await
            .unwrap()
            .is_none());
        let again = registry.insert_domain(new_domain("hello")).await.unwrap();
        assert_ne!(again.id, first.id);
    }

    #[tokio::test]
    async fn quota_and_deleted_domain() {
        let registry = InMemoryRegistry::new();
        let domain = registry.insert_domain(new_domain("hello")).await.unwrap();
        registry
            .insert_record(domain.id, txt_mapping("abcdefghijklmnop.onion"), 1)
            .await
            .unwrap();
        assert!(matches!(
            registry
                .insert_record(domain.id, txt_mapping("bbbbbbbbbbbbbbbb.onion"), 1)
                .await,
            Err(CoreError::QuotaExceeded(_))
        ));
        assert_eq!(registry.list_records(domain.id).await.unwrap().len(), 1);

        registry.soft_delete_domain(domain.id).await.unwrap();
        assert!(matches!(
            registry
                .insert_record(domain.id, txt_mapping("abcdefghijklmnop.onion"), 10)
                .await,
            Err(CoreError::DomainNotFound(_))
        ));
    }

    #[tokio::test]
    async fn onion_cleared_with_last_mapping_only() {
        let registry = InMemoryRegistry::new();
        let domain = registry.insert_domain(new_domain("hello")).await.unwrap();
        let onion = "abcdefghijklmnop.onion";
        let a = registry
            .insert_record(domain.id, txt_mapping(onion), 10)
            .await
            .unwrap();
        let b = registry
            .insert_record(domain.id, txt_mapping(onion), 10)
            .await
            .unwrap();
        let current = registry.find_domain(&domain.domain_name).await.unwrap().unwrap();
        assert_eq!(current.onion_address.as_deref(), Some(onion));

        let first = registry.delete_record(domain.id, a.id).await.unwrap();
        assert!(!first.onion_cleared);
        let second = registry.delete_record(domain.id, b.id).await.unwrap();
        assert!(second.onion_cleared);

        let current = registry.find_domain(&domain.domain_name).await.unwrap().unwrap();
        assert!(current.onion_address.is_none());
        assert!(matches!(
            registry.delete_record(domain.id, b.id).await,
            Err(CoreError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn snapshot_and_mark_published() {
        let registry = InMemoryRegistry::new();
        let domain = registry.insert_domain(new_domain("hello")).await.unwrap();
        let proxy = registry
            .insert_proxy(NewProxy {
                ip_address: "8.8.8.8".into(),
                ip_type: IpVersion::V4,
            })
            .await
            .unwrap();
        assert!(registry
            .zone_snapshot("oniongate.com")
            .await
            .unwrap()
            .online_proxies
            .is_empty());

        registry
            .record_proxy_check(&proxy.ip_address, true, Utc::now())
            .await
            .unwrap();
        let snapshot = registry.zone_snapshot("oniongate.com").await.unwrap();
        assert_eq!(snapshot.domains.len(), 1);
        assert_eq!(snapshot.online_proxies.len(), 1);

        assert_eq!(snapshot.last_serial, None);

        registry
            .mark_published("oniongate.com", snapshot.taken_at, true, 2_000_000_000)
            .await
            .unwrap();
        let domain = registry.find_domain(&domain.domain_name).await.unwrap().unwrap();
        assert!(!domain.dirty);
        let proxy = registry.find_proxy("8.8.8.8").await.unwrap().unwrap();
        assert!(!proxy.dirty);

        // a lower serial never replaces the stored one
        registry
            .mark_published("oniongate.com", Utc::now(), true, 5)
            .await
            .unwrap();
        let snapshot = registry.zone_snapshot("oniongate.com").await.unwrap();
        assert_eq!(snapshot.last_serial, Some(2_000_000_000));
        let other = registry.zone_snapshot("example.org").await.unwrap();
        assert_eq!(other.last_serial, None);
    }

    #[tokio::test]
    async fn duplicate_proxy_conflicts() {
        let registry = InMemoryRegistry::new();
        let proxy = NewProxy {
            ip_address: "8.8.8.8".into(),
            ip_type: IpVersion::V4,
        };
        registry.insert_proxy(proxy.clone()).await.unwrap();
        assert!(matches!(
            registry.insert_proxy(proxy).await,
            Err(CoreError::Conflict(_))
        ));
        assert!(matches!(
            registry.record_proxy_check("1.1.1.1", true, Utc::now()).await,
            Err(CoreError::ProxyNotFound(_))
        ));
    }

    #[tokio::test]
    async fn zones_are_distinct_and_skip_deleted() {
        let registry = InMemoryRegistry::new();
        registry.insert_domain(new_domain("hello")).await.unwrap();
        registry.insert_domain(new_domain("world")).await.unwrap();
        let gone = registry
            .insert_domain(NewDomain {
                domain_name: "example.org".into(),
                zone: "example.org".into(),
                onion_address: None,
                public: false,
            })
            .await
            .unwrap();
        registry.soft_delete_domain(gone.id).await.unwrap();
        assert_eq!(
            registry.list_domain_zones().await.unwrap(),
            vec!["oniongate.com".to_string()]
        );
        assert_eq!(registry.list_public_domains().await.unwrap().len(), 2);
    }
}
