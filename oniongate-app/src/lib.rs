//! Platform-agnostic application bootstrap for OnionGate.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (adapter injection),
//! `AppConfig` (TOML settings) and the storage / filesystem adapters.

pub mod adapters;
pub mod config;

use std::sync::Arc;

use oniongate_core::auth::TokenSigner;
use oniongate_core::config::ResolverConfig;
use oniongate_core::error::{CoreError, CoreResult};
use oniongate_core::services::{
    DomainService, ProxyService, RecordService, ServiceContext, StatsService, ZoneService,
};
use oniongate_core::traits::{
    DomainRepository, InMemoryRegistry, ProxyRepository, RecordRepository, ZoneSnapshotSource,
};
use oniongate_core::zone::{StaticTemplateLoader, ZoneTemplateLoader, DEFAULT_BASE_TEMPLATE};

pub use config::AppConfig;

/// Platform-agnostic application state.
///
/// Holds all services and the `ServiceContext`. Every frontend constructs this
/// once at startup via `AppStateBuilder` (or `AppState::open`).
pub struct AppState {
    /// Service context (holds all storage adapters)
    pub ctx: Arc<ServiceContext>,
    /// Domain registration and ownership
    pub domain_service: DomainService,
    /// Records of a domain
    pub record_service: RecordService,
    /// Entry proxy pool
    pub proxy_service: ProxyService,
    /// Zone generation and publication
    pub zone_service: ZoneService,
    /// Home-page figures
    pub stats_service: StatsService,
}

#[cfg(feature = "sqlite-store")]
impl AppState {
    /// Build the state from a loaded `AppConfig`: `SQLite` registry at `database_path`,
    /// templates from `template_dir`.
    ///
    /// # Errors
    /// Returns `CoreError::ConfigError` for an invalid configuration and
    /// `CoreError::StorageError` if the database cannot be opened.
    pub async fn open(config: &AppConfig) -> CoreResult<Self> {
        config.validate()?;
        let store = Arc::new(adapters::SqliteStore::new(&config.database_path).await?);

        AppStateBuilder::new()
            .config(config.resolver.clone())
            .secret_key(config.secret_key()?)
            .registry(store)
            .template_loader(Arc::new(adapters::FsTemplateLoader::new(
                config.template_dir.clone(),
            )))
            .build()
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required
/// - `secret_key` or `signer`: ownership token key
///
/// # Optional
/// - `config`: defaults to `ResolverConfig::default()`
/// - storage (`registry` or the individual repositories): defaults to one shared
///   `InMemoryRegistry`
/// - `template_loader`: defaults to the built-in base template
pub struct AppStateBuilder {
    config: Option<ResolverConfig>,
    signer: Option<CoreResult<TokenSigner>>,
    domain_repository: Option<Arc<dyn DomainRepository>>,
    record_repository: Option<Arc<dyn RecordRepository>>,
    proxy_repository: Option<Arc<dyn ProxyRepository>>,
    zone_source: Option<Arc<dyn ZoneSnapshotSource>>,
    template_loader: Option<Arc<dyn ZoneTemplateLoader>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            signer: None,
            domain_repository: None,
            record_repository: None,
            proxy_repository: None,
            zone_source: None,
            template_loader: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn secret_key(mut self, secret: &str) -> Self {
        self.signer = Some(TokenSigner::new(secret));
        self
    }

    #[must_use]
    pub fn signer(mut self, signer: TokenSigner) -> Self {
        self.signer = Some(Ok(signer));
        self
    }

    /// Use one store for every storage slot.
    #[must_use]
    pub fn registry<R>(self, registry: Arc<R>) -> Self
    where
        R: DomainRepository + RecordRepository + ProxyRepository + ZoneSnapshotSource + 'static,
    {
        self.domain_repository(registry.clone())
            .record_repository(registry.clone())
            .proxy_repository(registry.clone())
            .zone_source(registry)
    }

    #[must_use]
    pub fn domain_repository(mut self, repo: Arc<dyn DomainRepository>) -> Self {
        self.domain_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn record_repository(mut self, repo: Arc<dyn RecordRepository>) -> Self {
        self.record_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn proxy_repository(mut self, repo: Arc<dyn ProxyRepository>) -> Self {
        self.proxy_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn zone_source(mut self, source: Arc<dyn ZoneSnapshotSource>) -> Self {
        self.zone_source = Some(source);
        self
    }

    #[must_use]
    pub fn template_loader(mut self, loader: Arc<dyn ZoneTemplateLoader>) -> Self {
        self.template_loader = Some(loader);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ConfigError` if no signing key was given or the resolver
    /// configuration is invalid.
    pub fn build(self) -> CoreResult<AppState> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let signer = self
            .signer
            .ok_or_else(|| CoreError::ConfigError("secret_key is required".to_string()))??;

        let fallback = Arc::new(InMemoryRegistry::new());
        let domain_repository = self
            .domain_repository
            .unwrap_or_else(|| fallback.clone() as Arc<dyn DomainRepository>);
        let record_repository = self
            .record_repository
            .unwrap_or_else(|| fallback.clone() as Arc<dyn RecordRepository>);
        let proxy_repository = self
            .proxy_repository
            .unwrap_or_else(|| fallback.clone() as Arc<dyn ProxyRepository>);
        let zone_source = self.zone_source.unwrap_or(fallback);
        let template_loader = self.template_loader.unwrap_or_else(|| {
            Arc::new(StaticTemplateLoader::new().with_base(DEFAULT_BASE_TEMPLATE))
                as Arc<dyn ZoneTemplateLoader>
        });

        let ctx = Arc::new(ServiceContext::new(
            Arc::new(config),
            Arc::new(signer),
            domain_repository,
            record_repository,
            proxy_repository,
            zone_source,
            template_loader,
        ));

        Ok(AppState {
            domain_service: DomainService::new(Arc::clone(&ctx)),
            record_service: RecordService::new(Arc::clone(&ctx)),
            proxy_service: ProxyService::new(Arc::clone(&ctx)),
            zone_service: ZoneService::new(Arc::clone(&ctx)),
            stats_service: StatsService::new(Arc::clone(&ctx)),
            ctx,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
