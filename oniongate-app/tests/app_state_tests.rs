#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `AppState`: builder wiring and the end-to-end
//! register → record → publish flow over `SQLite` and the filesystem.

use std::sync::Arc;

use oniongate_app::adapters::{FsTemplateLoader, FsZoneWriter, SqliteStore, BASE_TEMPLATE_FILE};
use oniongate_app::{AppConfig, AppState, AppStateBuilder};
use oniongate_core::config::ResolverConfig;
use oniongate_core::error::CoreError;
use oniongate_core::types::{CreateRecordRequest, RegisterDomainRequest, UpdateDomainRequest};
use oniongate_core::zone::DEFAULT_BASE_TEMPLATE;

const SECRET: &str = "integration-test-secret";
const ONION: &str = "abcdefghijklmnop.onion";

fn register(name: &str) -> RegisterDomainRequest {
    RegisterDomainRequest {
        domain_name: name.to_string(),
        onion_address: None,
        public: true,
    }
}

fn onion_record() -> CreateRecordRequest {
    CreateRecordRequest {
        label: "_onion".to_string(),
        record_type: "TXT".to_string(),
        value: format!("onion={ONION}"),
        ttl: None,
    }
}

async fn sqlite_state(tmp: &tempfile::TempDir) -> AppState {
    let template_dir = tmp.path().join("templates");
    std::fs::create_dir_all(&template_dir).unwrap();
    std::fs::write(template_dir.join(BASE_TEMPLATE_FILE), DEFAULT_BASE_TEMPLATE).unwrap();

    let config = AppConfig {
        database_path: tmp.path().join("oniongate.db"),
        zone_dir: tmp.path().join("zones"),
        template_dir,
        secret_key: Some(SECRET.to_string()),
        resolver: ResolverConfig::default(),
    };
    AppState::open(&config).await.unwrap()
}

// ===== Builder =====

#[test]
fn test_builder_requires_secret() {
    let err = AppStateBuilder::new().build().err().unwrap();
    assert!(matches!(err, CoreError::ConfigError(_)));

    let err = AppStateBuilder::new().secret_key("").build().err().unwrap();
    assert!(matches!(err, CoreError::ConfigError(_)));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let err = AppStateBuilder::new()
        .secret_key(SECRET)
        .config(ResolverConfig {
            max_records: 0,
            ..ResolverConfig::default()
        })
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, CoreError::ConfigError(_)));
}

#[tokio::test]
async fn test_builder_defaults_to_in_memory_registry() {
    let state = AppStateBuilder::new().secret_key(SECRET).build().unwrap();

    let registered = state
        .domain_service
        .register_domain(&register("hello"))
        .await
        .unwrap();
    assert_eq!(registered.domain.domain_name, "hello.oniongate.com");

    let zone = state.zone_service.generate_zone("oniongate.com").await.unwrap();
    assert!(zone.text.contains("CNAME"));
    assert!(zone.text.contains("proxy.oniongate.com."));
}

#[tokio::test]
async fn test_open_requires_secret() {
    let tmp = tempfile::tempdir().unwrap();
    let config = AppConfig {
        database_path: tmp.path().join("oniongate.db"),
        ..AppConfig::default()
    };
    let err = AppState::open(&config).await.err().unwrap();
    assert!(matches!(err, CoreError::ConfigError(_)));
}

// ===== End to end =====

#[tokio::test]
async fn test_register_record_publish() {
    let tmp = tempfile::tempdir().unwrap();
    let state = sqlite_state(&tmp).await;

    let registered = state
        .domain_service
        .register_domain(&register("hello"))
        .await
        .unwrap();
    let token = registered.update_token.clone();

    state
        .record_service
        .create_record("hello", Some(&token), &onion_record())
        .await
        .unwrap();
    let details = state.domain_service.get_domain("hello").await.unwrap();
    assert_eq!(details.domain.onion_address.as_deref(), Some(ONION));
    assert_eq!(details.records.len(), 1);

    state.proxy_service.register_proxy("8.8.8.8").await.unwrap();
    state
        .proxy_service
        .record_proxy_check("8.8.8.8", true)
        .await
        .unwrap();

    let writer = FsZoneWriter::new(tmp.path().join("zones"));
    let result = state.zone_service.publish_all(&writer).await.unwrap();
    assert_eq!(result.success_count, 1);
    assert_eq!(result.failed_count, 0);

    let text = std::fs::read_to_string(writer.zone_path("oniongate.com").unwrap()).unwrap();
    assert!(text.starts_with("$ORIGIN oniongate.com."));
    assert!(text.contains("proxy\t120\tIN\tA\t8.8.8.8"));
    assert!(text.contains("hello\t120\tIN\tCNAME\tproxy.oniongate.com."));
    assert!(text.contains(&format!("_onion.hello\t3600\tIN\tTXT\t\"onion={ONION}\"")));

    let domain = state.domain_service.get_domain("hello").await.unwrap().domain;
    assert!(!domain.dirty);
}

#[tokio::test]
async fn test_serial_increases_across_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let writer = FsZoneWriter::new(tmp.path().join("zones"));

    // each iteration is a fresh process as far as the state is concerned
    let mut serials = Vec::new();
    for _ in 0..3 {
        let state = sqlite_state(&tmp).await;
        let file = state
            .zone_service
            .publish_zone("oniongate.com", &writer)
            .await
            .unwrap();
        serials.push(file.serial);
    }
    assert!(
        serials.windows(2).all(|pair| pair[1] > pair[0]),
        "serials must increase: {serials:?}"
    );

    let text = std::fs::read_to_string(writer.zone_path("oniongate.com").unwrap()).unwrap();
    assert!(text.contains(&format!(" {} ", serials[2])));
}

#[tokio::test]
async fn test_foreign_token_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let state = sqlite_state(&tmp).await;

    let first = state
        .domain_service
        .register_domain(&register("first"))
        .await
        .unwrap();
    state
        .domain_service
        .register_domain(&register("second"))
        .await
        .unwrap();

    let err = state
        .domain_service
        .update_domain(
            "second",
            Some(&first.update_token),
            &UpdateDomainRequest {
                onion_address: Some(Some(ONION.to_string())),
                public: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));

    let err = state
        .record_service
        .create_record("second", None, &onion_record())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let tmp = tempfile::tempdir().unwrap();
    let state = sqlite_state(&tmp).await;

    state
        .domain_service
        .register_domain(&register("hello"))
        .await
        .unwrap();
    let err = state
        .domain_service
        .register_domain(&register("HELLO"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn test_broken_zone_override_fails_alone() {
    let tmp = tempfile::tempdir().unwrap();
    let template_dir = tmp.path().join("templates");
    std::fs::create_dir_all(&template_dir).unwrap();
    std::fs::write(template_dir.join(BASE_TEMPLATE_FILE), DEFAULT_BASE_TEMPLATE).unwrap();
    std::fs::write(
        template_dir.join("example.org.zone.j2"),
        "www IN A not-an-address\n",
    )
    .unwrap();

    let store = Arc::new(SqliteStore::new(&tmp.path().join("oniongate.db")).await.unwrap());
    let state = AppStateBuilder::new()
        .config(ResolverConfig {
            fqdn_registration_closed: false,
            ..ResolverConfig::default()
        })
        .secret_key(SECRET)
        .registry(store)
        .template_loader(Arc::new(FsTemplateLoader::new(template_dir)))
        .build()
        .unwrap();

    state
        .domain_service
        .register_domain(&register("example.org"))
        .await
        .unwrap();
    state
        .domain_service
        .register_domain(&register("hello"))
        .await
        .unwrap();

    let writer = FsZoneWriter::new(tmp.path().join("zones"));
    let result = state.zone_service.publish_all(&writer).await.unwrap();
    assert_eq!(result.success_count, 1);
    assert_eq!(result.failed_count, 1);
    assert_eq!(result.failures[0].zone, "example.org");
    assert_eq!(result.failures[0].code, "TemplateParseError");
    assert!(writer.zone_path("oniongate.com").unwrap().exists());
    assert!(!writer.zone_path("example.org").unwrap().exists());
}

#[tokio::test]
async fn test_stats_over_sqlite() {
    let tmp = tempfile::tempdir().unwrap();
    let state = sqlite_state(&tmp).await;

    state
        .domain_service
        .register_domain(&register("hello"))
        .await
        .unwrap();
    state.proxy_service.register_proxy("1.1.1.1").await.unwrap();

    let stats = state.stats_service.stats(5).await.unwrap();
    assert_eq!(stats.num_domains_issued, 1);
    assert_eq!(stats.num_entry_proxies, 1);
    assert_eq!(stats.recent_domains.len(), 1);
}
