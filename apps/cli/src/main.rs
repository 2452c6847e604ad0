//! HIE Admin console
//!
//! Inspect entities, their reconciled relationships and identifier
//! namespaces held by the remote repository and metadata services.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use hie_client::HttpDataServiceClient;
use hie_core::AdminContext;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

mod commands;
mod config;
mod logging;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "hie-admin")]
#[command(version)]
#[command(about = "Administer HIE entities, relationships and identifier metadata", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./hie-admin.toml when present)
    #[arg(short, long, value_name = "FILE", env = "HIE_ADMIN_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current version of an entity
    Get {
        /// Entity type tag (Place, Material, ManufacturedMaterial, Organization)
        tag: String,
        id: Uuid,
    },

    /// Show an entity's reconciled relationships
    Relationships {
        /// Entity type tag
        tag: String,
        id: Uuid,
    },

    /// Show an assigning authority by domain name
    Authority {
        /// Domain name, e.g. NHID
        domain: String,
    },

    /// Check an identifier value against its authority's format rule
    ValidateIdentifier {
        /// Domain name of the assigning authority
        domain: String,
        value: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    let ctx = build_context(&config)?;

    match cli.command {
        Commands::Get { tag, id } => commands::entity::get(&ctx, &tag, id, cli.format).await?,
        Commands::Relationships { tag, id } => {
            commands::entity::relationships(&ctx, &tag, id, cli.format).await?
        }
        Commands::Authority { domain } => {
            commands::authority::show(&ctx, &domain, cli.format).await?
        }
        Commands::ValidateIdentifier { domain, value } => {
            commands::authority::validate_identifier(&ctx, &domain, &value, cli.format).await?
        }
    }

    let stats = ctx.cache.stats();
    tracing::debug!(
        hits = stats.hits,
        misses = stats.misses,
        fetches = stats.fetches,
        "Metadata cache statistics"
    );

    Ok(())
}

fn build_context(config: &Config) -> anyhow::Result<AdminContext> {
    let repository = HttpDataServiceClient::with_timeout(
        &config.repository.base_url,
        config.repository.timeout(),
    )
    .context("Failed to create repository client")?;
    let metadata =
        HttpDataServiceClient::with_timeout(&config.metadata.base_url, config.metadata.timeout())
            .context("Failed to create metadata client")?;

    tracing::debug!(
        repository = %repository.base_url(),
        metadata = %metadata.base_url(),
        "Service clients configured"
    );

    Ok(AdminContext::new(
        Arc::new(repository),
        Arc::new(metadata),
        &config.cache,
    ))
}
