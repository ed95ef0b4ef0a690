//! Zone synthesis
//!
//! Seed records from the rendered templates, then the proxy pool, then one pointer
//! and one TXT mapping per domain, with a fresh SOA serial.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, TXT};
use hickory_proto::rr::Name;
use serde::Serialize;

use super::parser::{parse_zone_text, zone_origin};
use super::records::{RecordData, RecordSet, ResourceRecord};
use super::writer::write_zone_text;
use crate::config::{ResolverConfig, SerialPolicy};
use crate::error::{CoreError, CoreResult};
use crate::types::ZoneSnapshot;

/// A generated zone file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneFile {
    pub zone: String,
    pub serial: u32,
    pub text: String,
}

/// Per-zone high-water mark of issued SOA serials
#[derive(Debug, Default)]
pub struct SerialClock {
    issued: Mutex<HashMap<String, u32>>,
}

impl SerialClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serial for `zone` at `now` under `policy`
    ///
    /// `persisted` is the last serial the registry recorded as published; under
    /// `Increasing` the result is above both it and anything issued by this clock.
    pub fn next(
        &self,
        zone: &str,
        policy: SerialPolicy,
        now: DateTime<Utc>,
        persisted: Option<u32>,
    ) -> u32 {
        let timestamp = u32::try_from(now.timestamp()).unwrap_or(u32::MAX);
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = issued.get(zone).copied().max(persisted);
        let serial = match (policy, previous) {
            (SerialPolicy::Increasing, Some(previous)) => {
                timestamp.max(previous.saturating_add(1))
            }
            _ => timestamp,
        };
        issued.insert(zone.to_string(), serial);
        serial
    }
}

/// Label of the proxy-facing name inside `zone`, `None` when it lies outside the zone
#[must_use]
pub fn proxy_label(proxy_zone: &str, zone: &str) -> Option<String> {
    let proxy = proxy_zone.trim().trim_end_matches('.').to_lowercase();
    let zone = zone.trim().trim_end_matches('.').to_lowercase();
    if proxy == zone {
        return Some(String::new());
    }
    proxy
        .strip_suffix(zone.as_str())
        .and_then(|prefix| prefix.strip_suffix('.'))
        .map(|label| label.trim_matches('.').to_string())
}

/// Absolute name of `label` under `origin`; the empty label is the apex
fn owner_name(label: &str, origin: &Name) -> CoreResult<Name> {
    if label.is_empty() {
        return Ok(origin.clone());
    }
    Name::from_ascii(label)
        .and_then(|relative| relative.append_domain(origin))
        .map_err(|e| CoreError::SerializationError(format!("Invalid owner name {label}: {e}")))
}

/// Builds zone files from registry snapshots
pub struct ZoneSynthesizer {
    config: Arc<ResolverConfig>,
    serials: SerialClock,
}

impl ZoneSynthesizer {
    #[must_use]
    pub fn new(config: Arc<ResolverConfig>) -> Self {
        Self {
            config,
            serials: SerialClock::new(),
        }
    }

    /// Synthesize the zone of `snapshot` on top of the rendered `seed` text.
    pub fn synthesize(&self, snapshot: &ZoneSnapshot, seed: &str) -> CoreResult<ZoneFile> {
        self.synthesize_at(snapshot, seed, Utc::now())
    }

    pub fn synthesize_at(
        &self,
        snapshot: &ZoneSnapshot,
        seed: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<ZoneFile> {
        let zone = snapshot.zone.as_str();
        let template_error = |message: String| CoreError::TemplateParseError {
            zone: zone.to_string(),
            message,
        };

        let origin = zone_origin(zone).map_err(|e| template_error(e.to_string()))?;
        let mut records =
            parse_zone_text(seed, zone).map_err(|e| template_error(e.to_string()))?;
        if records.soa().is_none() {
            return Err(template_error(
                "the seed must define an SOA record".to_string(),
            ));
        }

        self.append_proxies(&mut records, snapshot, &origin)?;
        self.append_domains(&mut records, snapshot, &origin)?;

        let serial = self.serials.next(
            zone,
            self.config.serial_policy,
            now,
            snapshot.last_serial,
        );
        records.set_soa_serial(serial);

        Ok(ZoneFile {
            zone: zone.to_string(),
            serial,
            text: write_zone_text(&records, &origin),
        })
    }

    fn append_proxies(
        &self,
        records: &mut RecordSet,
        snapshot: &ZoneSnapshot,
        origin: &Name,
    ) -> CoreResult<()> {
        let Some(label) = proxy_label(&self.config.proxy_zone, &snapshot.zone) else {
            return Ok(());
        };
        let owner = owner_name(&label, origin)?;

        for proxy in snapshot.online_proxies.iter().filter(|p| p.online) {
            let data = match proxy.ip_address.parse::<IpAddr>() {
                Ok(IpAddr::V4(ip)) => RecordData::A(A::from(ip)),
                Ok(IpAddr::V6(ip)) => RecordData::Aaaa(AAAA::from(ip)),
                Err(e) => {
                    log::warn!(
                        "Skipping proxy {} with unparsable address {}: {e}",
                        proxy.id,
                        proxy.ip_address
                    );
                    continue;
                }
            };
            records.push(ResourceRecord::new(
                owner.clone(),
                self.config.a_record_ttl,
                data,
            ));
        }
        Ok(())
    }

    fn append_domains(
        &self,
        records: &mut RecordSet,
        snapshot: &ZoneSnapshot,
        origin: &Name,
    ) -> CoreResult<()> {
        let target = Name::from_ascii(self.config.proxy_target()).map_err(|e| {
            CoreError::ConfigError(format!(
                "Invalid proxy zone {}: {e}",
                self.config.proxy_zone
            ))
        })?;
        let alias_mode = self.config.use_alias_records;

        for domain in snapshot.domains.iter().filter(|d| !d.deleted) {
            let pointer = if alias_mode {
                RecordData::Alias(target.clone())
            } else {
                RecordData::Cname(CNAME(target.clone()))
            };
            records.push(ResourceRecord::new(
                owner_name(&domain.subdomain(), origin)?,
                self.config.a_record_ttl,
                pointer,
            ));
            records.push(ResourceRecord::new(
                owner_name(&domain.txt_label(alias_mode), origin)?,
                self.config.txt_record_ttl,
                RecordData::Txt(TXT::new(vec![domain.onion_mapping()])),
            ));
        }
        Ok(())
    }
}
