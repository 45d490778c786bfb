use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use shopsight_core::load_engine_config;
use shopsight_engine::competitor::display_name_from_url;
use shopsight_engine::text::normalize_shop_url;
use shopsight_engine::InsightsEngine;

#[derive(Debug, Parser)]
#[command(name = "shopsight")]
#[command(about = "Shopify storefront insights extraction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract the full profile of one storefront as JSON.
    Profile {
        /// Storefront URL; scheme defaults to https.
        url: String,
        /// Write the JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Single-line JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },
    /// Discover competitors of a storefront and profile each one.
    Competitors {
        /// Storefront URL; scheme defaults to https.
        url: String,
        /// Brand name used in search queries; derived from the URL when
        /// omitted.
        #[arg(long)]
        brand: Option<String>,
        /// Maximum number of competitors to analyze.
        #[arg(long, default_value_t = 5)]
        max: usize,
        /// Write the JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Single-line JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_engine_config()?;
    let engine = InsightsEngine::new(&config)
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

    match cli.command {
        Commands::Profile {
            url,
            output,
            compact,
        } => {
            let profile = engine.extract_insights(&url).await?;
            emit(&profile, output.as_deref(), compact)?;
        }
        Commands::Competitors {
            url,
            brand,
            max,
            output,
            compact,
        } => {
            let brand = brand.unwrap_or_else(|| display_name_from_url(&normalize_shop_url(&url)));
            let analysis = engine.analyze_competitors(&brand, &url, max).await?;
            emit(&analysis, output.as_deref(), compact)?;
        }
    }

    Ok(())
}

fn emit<T: serde::Serialize>(value: &T, output: Option<&Path>, compact: bool) -> anyhow::Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}
