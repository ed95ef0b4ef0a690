//! Domain type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::Record;

/// A registered mapping of a domain name to an onion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: i64,
    /// Full lowercase domain name (`label.zone`, or the zone itself for a full domain)
    pub domain_name: String,
    /// DNS zone the domain is published in
    pub zone: String,
    /// Convenience copy of the current onion mapping
    pub onion_address: Option<String>,
    /// Listed in the public index
    pub public: bool,
    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::utils::datetime")]
    pub updated_at: DateTime<Utc>,
    /// Changed since the zone was last published
    pub dirty: bool,
    #[serde(with = "crate::utils::datetime::option")]
    pub service_last_online: Option<DateTime<Utc>>,
    /// Assumed online until a scan proves otherwise
    pub service_online: bool,
    /// Soft-delete flag
    pub deleted: bool,
}

impl Domain {
    /// Subdomain label without the zone name (empty for a domain at the zone apex)
    #[must_use]
    pub fn subdomain(&self) -> String {
        self.domain_name
            .strip_suffix(self.zone.as_str())
            .unwrap_or(&self.domain_name)
            .trim_matches('.')
            .to_string()
    }

    /// Label holding the onion TXT record
    ///
    /// `_onion.<subdomain>` normally; the subdomain itself in alias-record mode.
    #[must_use]
    pub fn txt_label(&self, use_alias_records: bool) -> String {
        let subdomain = self.subdomain();
        if use_alias_records {
            subdomain
        } else if subdomain.is_empty() {
            "_onion".to_string()
        } else {
            format!("_onion.{subdomain}")
        }
    }

    /// TXT record value published for this domain (`onion=` when no address is mapped)
    #[must_use]
    pub fn onion_mapping(&self) -> String {
        format!("onion={}", self.onion_address.as_deref().unwrap_or_default())
    }
}

/// Validated row for a new domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDomain {
    pub domain_name: String,
    pub zone: String,
    pub onion_address: Option<String>,
    pub public: bool,
}

/// Result of classifying a raw domain-name string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedDomainName {
    /// Subdomain label, `None` for a full domain at the root of its zone
    pub label: Option<String>,
    pub zone: String,
}

impl ClassifiedDomainName {
    /// Full domain name this classification stands for
    #[must_use]
    pub fn domain_name(&self) -> String {
        match &self.label {
            Some(label) => format!("{label}.{}", self.zone),
            None => self.zone.clone(),
        }
    }
}

/// Register domain request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDomainRequest {
    pub domain_name: String,
    #[serde(default)]
    pub onion_address: Option<String>,
    #[serde(default = "default_public")]
    pub public: bool,
}

fn default_public() -> bool {
    true
}

/// Update domain request (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDomainRequest {
    /// `Some(None)` clears the mapping, `None` leaves it untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onion_address: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

/// Validated partial update applied by the registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainUpdate {
    pub onion_address: Option<Option<String>>,
    pub public: Option<bool>,
}

impl DomainUpdate {
    /// Apply the update, marking the domain dirty and refreshing `updated_at`
    pub fn apply_to(&self, domain: &mut Domain, now: DateTime<Utc>) {
        if let Some(ref onion) = self.onion_address {
            domain.onion_address.clone_from(onion);
        }
        if let Some(public) = self.public {
            domain.public = public;
        }
        domain.dirty = true;
        domain.updated_at = now;
    }
}

/// A freshly registered domain together with its one-time ownership token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredDomain {
    #[serde(flatten)]
    pub domain: Domain,
    pub update_token: String,
}

/// A domain with its records (single-domain lookups)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainDetails {
    #[serde(flatten)]
    pub domain: Domain,
    pub records: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(name: &str, zone: &str) -> Domain {
        let now = Utc::now();
        Domain {
            id: 1,
            domain_name: name.to_string(),
            zone: zone.to_string(),
            onion_address: None,
            public: true,
            created_at: now,
            updated_at: now,
            dirty: true,
            service_last_online: None,
            service_online: true,
            deleted: false,
        }
    }

    #[test]
    fn subdomain_strips_zone() {
        assert_eq!(domain("hello.oniongate.com", "oniongate.com").subdomain(), "hello");
        assert_eq!(domain("a.b.example.org", "example.org").subdomain(), "a.b");
        assert_eq!(domain("example.org", "example.org").subdomain(), "");
    }

    #[test]
    fn txt_label_depends_on_alias_mode() {
        let d = domain("hello.oniongate.com", "oniongate.com");
        assert_eq!(d.txt_label(false), "_onion.hello");
        assert_eq!(d.txt_label(true), "hello");

        let apex = domain("example.org", "example.org");
        assert_eq!(apex.txt_label(false), "_onion");
        assert_eq!(apex.txt_label(true), "");
    }

    #[test]
    fn onion_mapping_empty_when_unset() {
        let mut d = domain("hello.oniongate.com", "oniongate.com");
        assert_eq!(d.onion_mapping(), "onion=");
        d.onion_address = Some("abcdefghijklmnop.onion".into());
        assert_eq!(d.onion_mapping(), "onion=abcdefghijklmnop.onion");
    }

    #[test]
    fn update_apply_partial() {
        let mut d = domain("hello.oniongate.com", "oniongate.com");
        d.dirty = false;
        d.onion_address = Some("abcdefghijklmnop.onion".into());
        let now = Utc::now();

        DomainUpdate {
            onion_address: None,
            public: Some(false),
        }
        .apply_to(&mut d, now);
        assert!(!d.public);
        assert!(d.dirty);
        assert_eq!(d.onion_address.as_deref(), Some("abcdefghijklmnop.onion"));

        DomainUpdate {
            onion_address: Some(None),
            public: None,
        }
        .apply_to(&mut d, now);
        assert!(d.onion_address.is_none());
        assert!(!d.public);
    }

    #[test]
    fn classified_domain_name() {
        let sub = ClassifiedDomainName {
            label: Some("hello".into()),
            zone: "oniongate.com".into(),
        };
        assert_eq!(sub.domain_name(), "hello.oniongate.com");
        let full = ClassifiedDomainName {
            label: None,
            zone: "example.org".into(),
        };
        assert_eq!(full.domain_name(), "example.org");
    }

    #[test]
    fn register_request_defaults_public() {
        let req: RegisterDomainRequest =
            serde_json::from_str(r#"{"domainName": "hello"}"#).unwrap();
        assert!(req.public);
        assert!(req.onion_address.is_none());
    }
}
