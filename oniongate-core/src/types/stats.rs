//! Resolver statistics shown on the landing page

use serde::{Deserialize, Serialize};

use super::domain::Domain;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverStats {
    pub num_domains_issued: usize,
    /// Fraction (0.0..=1.0) of issued domains whose onion service is online
    pub percent_online_domains: f64,
    pub num_entry_proxies: usize,
    /// Fraction (0.0..=1.0) of proxies currently online
    pub percent_online_proxies: f64,
    pub recent_domains: Vec<Domain>,
}

/// Ratio helper returning 0 for an empty population.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fraction(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_of_empty_is_zero() {
        assert!(fraction(0, 0).abs() < f64::EPSILON);
        assert!((fraction(1, 4) - 0.25).abs() < f64::EPSILON);
    }
}
