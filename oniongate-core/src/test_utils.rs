//! Test helper module
//!
//! Provides a ready service context over the in-memory registry and a capturing
//! zone writer.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::auth::TokenSigner;
use crate::config::ResolverConfig;
use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::traits::{InMemoryRegistry, ZoneWriter};
use crate::zone::{StaticTemplateLoader, ZoneFile, DEFAULT_BASE_TEMPLATE};

pub const TEST_SECRET: &str = "unit-test-secret";
pub const TEST_BASE_TEMPLATE: &str = DEFAULT_BASE_TEMPLATE;

// ===== MemoryZoneWriter =====

#[derive(Default)]
pub struct MemoryZoneWriter {
    written: RwLock<BTreeMap<String, ZoneFile>>,
}

impl MemoryZoneWriter {
    pub async fn zones(&self) -> Vec<String> {
        self.written.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ZoneWriter for MemoryZoneWriter {
    async fn write_zone(&self, zone: &ZoneFile) -> CoreResult<()> {
        self.written
            .write()
            .await
            .insert(zone.zone.clone(), zone.clone());
        Ok(())
    }
}

// ===== Factory methods =====

pub fn create_test_context_with_templates(
    config: ResolverConfig,
    templates: StaticTemplateLoader,
) -> Arc<ServiceContext> {
    create_test_context_on(&InMemoryRegistry::new(), config, templates)
}

/// Context over an existing registry, as a separate process would build it
pub fn create_test_context_on(
    registry: &InMemoryRegistry,
    config: ResolverConfig,
    templates: StaticTemplateLoader,
) -> Arc<ServiceContext> {
    let registry = Arc::new(registry.clone());
    Arc::new(ServiceContext::new(
        Arc::new(config),
        Arc::new(TokenSigner::new(TEST_SECRET).unwrap()),
        registry.clone(),
        registry.clone(),
        registry.clone(),
        registry,
        Arc::new(templates),
    ))
}

pub fn create_test_context_with(config: ResolverConfig) -> Arc<ServiceContext> {
    create_test_context_with_templates(
        config,
        StaticTemplateLoader::new().with_base(TEST_BASE_TEMPLATE),
    )
}

pub fn create_test_context() -> Arc<ServiceContext> {
    create_test_context_with(ResolverConfig::default())
}
