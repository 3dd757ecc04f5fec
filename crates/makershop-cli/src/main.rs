use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod import;
mod media;

#[cfg(test)]
mod tests;

#[derive(Debug, Parser)]
#[command(name = "makershop-cli")]
#[command(about = "Makershop catalog import and media synchronization pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations.
    Migrate,
    /// Ingest a CSV/XLSX price list and merge it into the catalog.
    ImportCsv {
        /// Path to the uploaded source file.
        #[arg(long)]
        file: PathBuf,
        /// Import batch id; a fresh UUID is generated when omitted.
        #[arg(long)]
        batch: Option<String>,
        /// Delete the batch's staging rows after a successful merge.
        #[arg(long)]
        prune_staging: bool,
    },
    /// Upsert a single product from a source URL.
    ImportUrl {
        #[arg(long)]
        url: String,
        #[arg(long)]
        sku: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        stock: Option<i32>,
        /// Pipe-delimited category slugs, e.g. `figurines|fantasy`.
        #[arg(long)]
        categories: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        model_url: Option<String>,
        /// Extra product attributes as a JSON object.
        #[arg(long)]
        attributes: Option<String>,
    },
    /// Reconcile one SKU's image gallery with its media directory.
    SyncMedia {
        #[arg(long)]
        sku: String,
        /// Preferred primary-image link (remote URL or media-root path).
        #[arg(long)]
        prefer: Option<String>,
    },
    /// Recompute prices for every cost-plus product.
    Reprice,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = makershop_core::load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    let pool = makershop_db::connect_pool(
        &config.database_url,
        makershop_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match cli.command {
        Commands::Migrate => {
            makershop_db::run_migrations(&pool).await?;
        }
        Commands::ImportCsv {
            file,
            batch,
            prune_staging,
        } => {
            import::run_import_csv(&pool, &config, &file, batch, prune_staging).await?;
        }
        Commands::ImportUrl {
            url,
            sku,
            name,
            price,
            currency,
            stock,
            categories,
            image_url,
            model_url,
            attributes,
        } => {
            let job = import::build_url_job(
                url, sku, name, price, currency, stock, categories, image_url, model_url,
                attributes,
            )?;
            import::run_import_url(&pool, &config, &job).await?;
        }
        Commands::SyncMedia { sku, prefer } => {
            media::run_sync_media(&pool, &config, sku, prefer).await?;
        }
        Commands::Reprice => {
            import::run_reprice(&pool, &config).await?;
        }
    }

    Ok(())
}
