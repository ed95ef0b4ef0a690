//! Resolver configuration
//!
//! An immutable value built once at startup and passed explicitly into validation
//! and zone synthesis. Defaults mirror the public oniongate.com deployment.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// How the SOA serial is chosen on each synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SerialPolicy {
    /// `max(now, previous + 1)` against the last serial issued for the zone in this process.
    #[default]
    Increasing,
    /// Current Unix time in seconds, nothing else.
    Timestamp,
}

/// Resolver-wide settings for validation and zone synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// The domain under which subdomains are issued.
    pub subdomain_host: String,
    pub min_subdomain_length: usize,
    pub a_record_ttl: u32,
    pub txt_record_ttl: u32,
    /// Emit ALIAS instead of CNAME pointer records (TXT then lives at the subdomain itself).
    pub use_alias_records: bool,
    /// Name holding the A/AAAA records of the online proxies.
    pub proxy_zone: String,
    /// Domains and labels which cannot be registered.
    pub domain_blacklist: Vec<String>,
    /// Onion addresses which cannot be mapped.
    pub restricted_onions: Vec<String>,
    pub fqdn_registration_closed: bool,
    /// Maximum number of records per domain.
    pub max_records: usize,
    pub serial_policy: SerialPolicy,
}

const DEFAULT_SUBDOMAIN_HOST: &str = "oniongate.com";

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            subdomain_host: DEFAULT_SUBDOMAIN_HOST.to_string(),
            min_subdomain_length: 5,
            a_record_ttl: 120,
            txt_record_ttl: 3600,
            use_alias_records: false,
            proxy_zone: format!("proxy.{DEFAULT_SUBDOMAIN_HOST}"),
            domain_blacklist: vec![
                DEFAULT_SUBDOMAIN_HOST.to_string(),
                "proxy".to_string(),
                "_onion".to_string(),
            ],
            restricted_onions: Vec::new(),
            fqdn_registration_closed: true,
            max_records: 20,
            serial_policy: SerialPolicy::Increasing,
        }
    }
}

impl ResolverConfig {
    /// Check the configuration for values that would make synthesis or validation meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        if self.subdomain_host.trim_matches('.').is_empty() {
            return Err(CoreError::ConfigError(
                "subdomain_host cannot be empty".to_string(),
            ));
        }
        if self.proxy_zone.trim_matches('.').is_empty() {
            return Err(CoreError::ConfigError(
                "proxy_zone cannot be empty".to_string(),
            ));
        }
        if self.a_record_ttl == 0 || self.txt_record_ttl == 0 {
            return Err(CoreError::ConfigError(
                "record TTLs must be greater than zero".to_string(),
            ));
        }
        if self.max_records == 0 {
            return Err(CoreError::ConfigError(
                "max_records must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a name is on the blacklist (case-insensitive).
    #[must_use]
    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.domain_blacklist
            .iter()
            .any(|entry| entry.eq_ignore_ascii_case(name))
    }

    /// Whether an onion address is restricted (case-insensitive).
    #[must_use]
    pub fn is_restricted_onion(&self, onion_address: &str) -> bool {
        self.restricted_onions
            .iter()
            .any(|entry| entry.eq_ignore_ascii_case(onion_address))
    }

    /// Proxy-facing domain as an absolute name (`proxy.oniongate.com.`).
    #[must_use]
    pub fn proxy_target(&self) -> String {
        format!("{}.", self.proxy_zone.trim_end_matches('.').to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ResolverConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_blacklisted("proxy"));
        assert!(config.is_blacklisted("OnionGate.com"));
        assert_eq!(config.proxy_target(), "proxy.oniongate.com.");
    }

    #[test]
    fn zero_ttl_rejected() {
        let config = ResolverConfig {
            a_record_ttl: 0,
            ..ResolverConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::ConfigError(_))));
    }

    #[test]
    fn partial_toml_style_json_uses_defaults() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{"use_alias_records": true, "serial_policy": "timestamp"}"#)
                .unwrap();
        assert!(config.use_alias_records);
        assert_eq!(config.serial_policy, SerialPolicy::Timestamp);
        assert_eq!(config.subdomain_host, "oniongate.com");
        assert_eq!(config.max_records, 20);
    }
}
