mod catalog;
mod clients;
mod delta;
mod push;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "feedsync")]
#[command(about = "Sync supplier feed prices and stock into a Shopify catalog")]
struct Cli {
    /// Directory for the SKU cache, snapshot, delta file and reports
    /// (overrides `FEEDSYNC_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every SKU in the store and cache it as `shop_skus.json`
    CacheSkus {
        /// Pause between catalog pages, in milliseconds
        #[arg(long, default_value_t = 0)]
        page_delay_ms: u64,
    },
    /// Convert the whole feed into an update file, without diffing
    Transform,
    /// Diff the feed against the last run's snapshot and write the delta file
    Delta {
        /// Drop changes for SKUs not in the cached storefront SKU list
        #[arg(long)]
        known_only: bool,
        /// Fail on feed errors instead of writing an empty delta file
        #[arg(long)]
        strict: bool,
    },
    /// Diff the feed against the live catalog and write the delta file
    Direct {
        #[arg(long, value_enum, default_value_t = CatalogSource::Graphql)]
        catalog_source: CatalogSource,
        /// Drop changes for SKUs not in the cached storefront SKU list
        #[arg(long)]
        known_only: bool,
        /// Fail on feed errors instead of writing an empty delta file
        #[arg(long)]
        strict: bool,
        /// Pause between catalog pages, in milliseconds
        #[arg(long, default_value_t = 0)]
        page_delay_ms: u64,
    },
    /// Push the delta file to the store in batches and write a report
    Push {
        /// Delta file to push (defaults to the one in the data directory)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Log the batch plan without calling the API
        #[arg(long)]
        dry_run: bool,
    },
}

/// Where `direct` reads live catalog state from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CatalogSource {
    Graphql,
    /// `products.json`; carries no unit cost
    Rest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = feedsync_core::load_app_config()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, data_dir = %config.data_dir.display(), "loaded configuration");

    match cli.command {
        Commands::CacheSkus { page_delay_ms } => {
            catalog::run_cache_skus(&config, page_delay_ms).await?;
        }
        Commands::Transform => delta::run_transform(&config).await?,
        Commands::Delta { known_only, strict } => {
            delta::run_delta(&config, known_only, strict).await?;
        }
        Commands::Direct {
            catalog_source,
            known_only,
            strict,
            page_delay_ms,
        } => {
            delta::run_direct(&config, catalog_source, known_only, strict, page_delay_ms).await?;
        }
        Commands::Push { input, dry_run } => {
            push::run_push(&config, input, dry_run).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod test_support;
