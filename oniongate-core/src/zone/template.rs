//! Seed templates for zone synthesis
//!
//! A zone is seeded from a resolver-wide base template plus an optional per-zone
//! override. Both are plain zone-file text where `{{ origin }}` stands for the zone name.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::CoreResult;

/// Placeholder substituted with the zone name
#[allow(clippy::expect_used)]
static ORIGIN_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*origin\s*\}\}").expect("origin placeholder pattern is valid")
});

/// Base template written by `init` when none exists
pub const DEFAULT_BASE_TEMPLATE: &str = "\
$TTL 3600
@ IN SOA ns1.{{ origin }}. hostmaster.{{ origin }}. (
    1        ; serial, replaced on every publish
    7200     ; refresh
    3600     ; retry
    1209600  ; expire
    300 )    ; minimum
@ IN NS ns1.{{ origin }}.
";

/// Which fragment of the seed is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Shared by every zone
    Base,
    /// Appended after the base for one zone
    Zone,
}

/// Source of raw template text
#[async_trait]
pub trait ZoneTemplateLoader: Send + Sync {
    /// Raw template text, `None` when the fragment does not exist
    async fn load(&self, zone: &str, kind: TemplateKind) -> CoreResult<Option<String>>;
}

/// In-memory templates
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateLoader {
    base: Option<String>,
    zones: HashMap<String, String>,
}

impl StaticTemplateLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base(mut self, text: impl Into<String>) -> Self {
        self.base = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: &str, text: impl Into<String>) -> Self {
        self.zones.insert(zone.to_lowercase(), text.into());
        self
    }
}

#[async_trait]
impl ZoneTemplateLoader for StaticTemplateLoader {
    async fn load(&self, zone: &str, kind: TemplateKind) -> CoreResult<Option<String>> {
        Ok(match kind {
            TemplateKind::Base => self.base.clone(),
            TemplateKind::Zone => self.zones.get(&zone.to_lowercase()).cloned(),
        })
    }
}

/// Substitute `{{ origin }}` placeholders with the zone name.
#[must_use]
pub fn render_template(template: &str, zone: &str) -> String {
    ORIGIN_PLACEHOLDER
        .replace_all(template, regex::NoExpand(zone))
        .into_owned()
}

/// Load base and override fragments for `zone`, concatenate them (override second)
/// and render the result.
pub async fn render_seed(loader: &dyn ZoneTemplateLoader, zone: &str) -> CoreResult<String> {
    let mut fragments = Vec::new();
    for kind in [TemplateKind::Base, TemplateKind::Zone] {
        match loader.load(zone, kind).await? {
            Some(text) if !text.trim().is_empty() => fragments.push(text.trim().to_string()),
            _ => log::debug!("No {kind:?} template for zone {zone}"),
        }
    }
    Ok(render_template(&fragments.join("\n"), zone))
}
