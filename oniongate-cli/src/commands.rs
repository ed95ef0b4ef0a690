//! Subcommand handlers.

use anyhow::{Context, Result};
use serde::Serialize;

use oniongate_app::adapters::{FsZoneWriter, BASE_TEMPLATE_FILE};
use oniongate_app::{AppConfig, AppState};
use oniongate_core::types::RegisterDomainRequest;
use oniongate_core::zone::DEFAULT_BASE_TEMPLATE;

use crate::cli::{CheckArgs, Commands, RegisterArgs};

/// Text to print and whether the command fully succeeded.
#[derive(Debug)]
pub struct Outcome {
    pub text: String,
    pub success: bool,
}

impl Outcome {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
        }
    }

    fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::ok(serde_json::to_string_pretty(value)?))
    }
}

pub async fn execute(command: Commands, config: &AppConfig) -> Result<Outcome> {
    match command {
        Commands::Init => init(config).await,
        other => {
            let state = AppState::open(config)
                .await
                .context("failed to open the registry")?;
            run(&state, config, other).await
        }
    }
}

async fn run(state: &AppState, config: &AppConfig, command: Commands) -> Result<Outcome> {
    match command {
        Commands::Init => init(config).await,
        Commands::Register(args) => register(state, args).await,
        Commands::Show { domain } => Outcome::json(&state.domain_service.get_domain(&domain).await?),
        Commands::Domains => Outcome::json(&state.domain_service.list_public_domains().await?),
        Commands::AddProxy { ip } => Outcome::json(&state.proxy_service.register_proxy(&ip).await?),
        Commands::Proxies => Outcome::json(&state.proxy_service.list_proxies().await?),
        Commands::CheckProxy(CheckArgs { target, offline }) => Outcome::json(
            &state
                .proxy_service
                .record_proxy_check(&target, !offline)
                .await?,
        ),
        Commands::CheckService(CheckArgs { target, offline }) => Outcome::json(
            &state
                .domain_service
                .record_service_check(&target, !offline)
                .await?,
        ),
        Commands::Zones => Ok(Outcome::ok(state.zone_service.list_zones().await?.join("\n"))),
        Commands::Generate { zone } => {
            Ok(Outcome::ok(state.zone_service.generate_zone(&zone).await?.text))
        }
        Commands::Publish { zone } => publish(state, config, zone).await,
        Commands::Stats { recent } => Outcome::json(&state.stats_service.stats(recent).await?),
    }
}

async fn init(config: &AppConfig) -> Result<Outcome> {
    let mut lines = Vec::new();

    tokio::fs::create_dir_all(&config.template_dir)
        .await
        .with_context(|| format!("failed to create {}", config.template_dir.display()))?;
    let base = config.template_dir.join(BASE_TEMPLATE_FILE);
    if tokio::fs::try_exists(&base).await? {
        lines.push(format!("Keeping existing template {}", base.display()));
    } else {
        tokio::fs::write(&base, DEFAULT_BASE_TEMPLATE)
            .await
            .with_context(|| format!("failed to write {}", base.display()))?;
        lines.push(format!("Wrote default template {}", base.display()));
    }

    tokio::fs::create_dir_all(&config.zone_dir)
        .await
        .with_context(|| format!("failed to create {}", config.zone_dir.display()))?;

    AppState::open(config)
        .await
        .context("failed to initialize the registry")?;
    lines.push(format!(
        "Registry ready at {}",
        config.database_path.display()
    ));

    Ok(Outcome::ok(lines.join("\n")))
}

async fn register(state: &AppState, args: RegisterArgs) -> Result<Outcome> {
    let registered = state
        .domain_service
        .register_domain(&RegisterDomainRequest {
            domain_name: args.domain,
            onion_address: args.onion,
            public: !args.private,
        })
        .await?;
    Outcome::json(&registered)
}

async fn publish(state: &AppState, config: &AppConfig, zone: Option<String>) -> Result<Outcome> {
    let writer = FsZoneWriter::new(config.zone_dir.clone());

    if let Some(zone) = zone {
        let file = state.zone_service.publish_zone(&zone, &writer).await?;
        return Ok(Outcome::ok(format!(
            "Published {} (serial {}) to {}",
            file.zone,
            file.serial,
            writer.zone_path(&file.zone)?.display()
        )));
    }

    let result = state.zone_service.publish_all(&writer).await?;
    let mut outcome = Outcome::json(&result)?;
    outcome.success = result.failed_count == 0;
    Ok(outcome)
}
