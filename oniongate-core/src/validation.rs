//! Input validation
//!
//! Pure classification functions. Each returns a normalized value or a
//! `CoreError::ValidationError` carrying a message fit for the caller.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::config::ResolverConfig;
use crate::error::{CoreError, CoreResult};
use crate::types::{
    ClassifiedDomainName, ClassifiedIp, CreateRecordRequest, IpVersion, NewRecord, RecordType,
};

const ONION_SUFFIX: &str = ".onion";
const ONION_ID_LEN: usize = 16;
const MAX_HOSTNAME_LEN: usize = 255;
const MAX_SEGMENT_LEN: usize = 63;
const MAX_RECORD_VALUE_LEN: usize = 65_000;
const MAX_TTL: u32 = 2_147_483_647;

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::ValidationError(message.into())
}

/// Check hostname syntax.
///
/// At most 255 characters, not made only of digits and dots, and every dot-separated
/// segment 1-63 alphanumeric or hyphen characters without a leading or trailing hyphen.
#[must_use]
pub fn is_valid_hostname(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    if hostname.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }
    hostname
        .split('.')
        .all(|segment| is_valid_segment(segment, |c| c.is_ascii_alphanumeric() || c == '-'))
}

fn is_valid_segment(segment: &str, allowed: impl Fn(char) -> bool) -> bool {
    !segment.is_empty()
        && segment.len() <= MAX_SEGMENT_LEN
        && !segment.starts_with('-')
        && !segment.ends_with('-')
        && segment.chars().all(allowed)
}

/// Classify a raw domain name as a subdomain request or a full-domain request.
///
/// A bare label becomes `{label, zone: subdomain_host}`; anything containing a dot is
/// a full domain at the root of its own zone (`label: None`).
pub fn classify_domain_name(
    raw: &str,
    config: &ResolverConfig,
) -> CoreResult<ClassifiedDomainName> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(invalid("You must specify a domain name"));
    }

    let is_subdomain = !raw.contains('.');
    let name = raw.strip_suffix('.').unwrap_or(raw);
    let is_valid = is_valid_hostname(name);

    if is_subdomain {
        if !is_valid {
            return Err(invalid(format!("{name} is not a valid sub-domain name")));
        }
        if name.len() < config.min_subdomain_length {
            return Err(invalid(format!(
                "The subdomain must be at least {} characters long",
                config.min_subdomain_length
            )));
        }
        if config.is_blacklisted(name) {
            return Err(invalid("This subdomain is not allowed"));
        }
        return Ok(ClassifiedDomainName {
            label: Some(name.to_lowercase()),
            zone: config
                .subdomain_host
                .trim_end_matches('.')
                .to_lowercase(),
        });
    }

    if !is_valid || !name.contains('.') {
        return Err(invalid(format!("{name} is not a valid domain name")));
    }
    let lowered = name.to_lowercase();
    if lowered.starts_with("www.") {
        return Err(invalid("The domain name should not include the www. label"));
    }
    if config.fqdn_registration_closed {
        return Err(invalid(
            "It is not possible to register a full domain at the present time. \
             Please choose a sub-domain or contact the administrators",
        ));
    }
    if config.is_blacklisted(&lowered) {
        return Err(invalid("The domain is not allowed"));
    }

    Ok(ClassifiedDomainName {
        label: None,
        zone: lowered,
    })
}

/// Normalize an onion address to `<16 base32 chars>.onion`.
pub fn classify_onion_address(raw: &str) -> CoreResult<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(invalid("You must specify an onion address"));
    }

    let address = if raw.ends_with(ONION_SUFFIX) {
        raw.to_string()
    } else {
        format!("{raw}{ONION_SUFFIX}")
    };

    let id = &address[..address.len() - ONION_SUFFIX.len()];
    let is_base32 = id.len() == ONION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || ('2'..='7').contains(&c));

    if is_base32 {
        Ok(address)
    } else {
        Err(invalid(format!("{address} is not a valid onion address")))
    }
}

/// Classify an onion address supplied for a domain, rejecting restricted services.
pub fn classify_domain_onion(raw: &str, config: &ResolverConfig) -> CoreResult<String> {
    let address = classify_onion_address(raw)?;
    if config.is_restricted_onion(&address) {
        return Err(invalid(format!("{address} cannot be mapped")));
    }
    Ok(address)
}

/// Parse a public IPv4 or IPv6 address.
pub fn classify_ip_address(raw: &str) -> CoreResult<ClassifiedIp> {
    let address: IpAddr = raw
        .trim()
        .parse()
        .map_err(|_| invalid(format!("{} is not a valid IP address", raw.trim())))?;

    if !is_public_ip(&address) {
        return Err(invalid("Only public IP addresses are valid"));
    }

    Ok(ClassifiedIp {
        address,
        version: IpVersion::of(&address),
    })
}

fn is_public_ip(address: &IpAddr) -> bool {
    match address {
        IpAddr::V4(v4) => is_public_v4(*v4),
        IpAddr::V6(v6) => is_public_v6(v6),
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    let reserved = a == 0
        || (a == 100 && (64..128).contains(&b)) // shared address space
        || (a == 192 && b == 0 && c == 0) // IETF protocol assignments
        || (a == 198 && (b == 18 || b == 19)) // benchmarking
        || a >= 240;
    !(reserved
        || ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_multicast())
}

fn is_public_v6(ip: &Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_public_v4(mapped);
    }
    let segments = ip.segments();
    let reserved = (segments[0] & 0xfe00) == 0xfc00 // unique local
        || (segments[0] & 0xffc0) == 0xfe80 // link local
        || (segments[0] == 0x2001 && segments[1] == 0x0db8) // documentation
        || (segments[0] == 0x2001 && segments[1] < 0x0200) // IETF protocol assignments
        || (segments[0] == 0x0100 && segments[1..4] == [0, 0, 0]); // discard-only
    !(reserved || ip.is_loopback() || ip.is_unspecified() || ip.is_multicast())
}

/// Extract the onion address from an `onion=<address>` record value.
///
/// The key must be exactly `onion` (any case) with no surrounding whitespace on either
/// side of the `=`; `None` when the value is not a mapping.
#[must_use]
pub fn extract_onion_mapping(record_value: &str) -> Option<String> {
    let lowered = record_value.to_lowercase();
    let (key, value) = lowered.split_once('=')?;
    if key != "onion" || value.is_empty() || value.trim() != value {
        return None;
    }
    classify_onion_address(value).ok()
}

/// Validate a record label: `@` or hostname-like segments which may carry underscores.
pub fn validate_record_label(raw: &str) -> CoreResult<String> {
    let label = raw.trim().trim_end_matches('.');
    if label == "@" {
        return Ok(label.to_string());
    }
    let valid = !label.is_empty()
        && label.len() <= MAX_HOSTNAME_LEN
        && label.split('.').all(|segment| {
            is_valid_segment(segment, |c| {
                c.is_ascii_alphanumeric() || c == '-' || c == '_'
            })
        });
    if valid {
        Ok(label.to_lowercase())
    } else {
        Err(invalid(format!("{} is not a valid record label", raw.trim())))
    }
}

/// Validate a record value: non-empty and bounded.
pub fn validate_record_value(raw: &str) -> CoreResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid("Record value cannot be empty"));
    }
    if value.len() > MAX_RECORD_VALUE_LEN {
        return Err(invalid(format!(
            "Record value cannot be longer than {MAX_RECORD_VALUE_LEN} bytes"
        )));
    }
    Ok(value.to_string())
}

pub fn validate_ttl(ttl: Option<u32>) -> CoreResult<Option<u32>> {
    match ttl {
        Some(t) if t == 0 || t > MAX_TTL => Err(invalid(format!(
            "TTL must be between 1 and {MAX_TTL}, got {t}"
        ))),
        other => Ok(other),
    }
}

/// Validate a record creation request into an insertable row.
///
/// TXT records holding a valid `onion=<address>` value get the address cached in
/// `is_onion_mapping`.
pub fn validate_new_record(
    request: &CreateRecordRequest,
    config: &ResolverConfig,
) -> CoreResult<NewRecord> {
    let label = validate_record_label(&request.label)?;
    let record_type: RecordType = request.record_type.parse()?;
    let value = validate_record_value(&request.value)?;
    let ttl = validate_ttl(request.ttl)?;

    let is_onion_mapping = match record_type {
        RecordType::Txt => extract_onion_mapping(&value),
        _ => None,
    };
    if let Some(ref onion) = is_onion_mapping {
        if config.is_restricted_onion(onion) {
            return Err(invalid(format!("{onion} cannot be mapped")));
        }
    }

    Ok(NewRecord {
        label,
        ttl,
        record_type,
        value,
        is_onion_mapping,
    })
}
