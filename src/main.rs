use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use market_etl::config::Settings;
use market_etl::models::SearchQuery;
use market_etl::services::MarketplaceService;
use market_etl::storage::{OutputFormat, export_items};
use market_etl::utils::file_timestamp;

/// Scrape marketplace search results into a table, or average sold prices.
#[derive(Parser)]
#[command(name = "market_etl", version, long_about = None)]
struct Cli {
    /// YAML config file. Defaults to config/default.yaml when it exists.
    #[arg(long, global = true, env = "APP_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the first result page and enrich every listing from its detail page.
    Items {
        /// Search keywords.
        query: String,

        #[arg(long, default_value = "us")]
        region: String,

        /// all, new, opened, refurbished or used.
        #[arg(long, default_value = "all")]
        condition: String,

        /// all, auction, bin or offers.
        #[arg(long = "type", default_value = "all")]
        listing_type: String,

        /// csv, parquet or json. Overrides output.format.
        #[arg(long)]
        format: Option<String>,

        /// Output file. Defaults to <output.dir>/items_<query>_<timestamp>.<ext>.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Detail pages fetched at once. Overrides enrichment.concurrency.
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Trimmed average price and shipping of sold listings.
    Average {
        /// Search keywords.
        query: String,

        #[arg(long, default_value = "us")]
        region: String,

        #[arg(long, default_value = "all")]
        condition: String,
    },
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match verbose {
        0 => "market_etl=info",
        1 => "market_etl=debug",
        _ => "market_etl=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    fmt().with_env_filter(env_filter).with_target(false).init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Settings::new().context("failed to load config")?,
    };
    Ok(settings)
}

fn file_slug(query: &str) -> String {
    query
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Resolves once Ctrl-C is pressed. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    warn!("Ctrl-C received, finishing in-flight detail fetches");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Items {
            query,
            region,
            condition,
            listing_type,
            format,
            output,
            concurrency,
        } => {
            let search = SearchQuery::parse(&query, &region, &condition, &listing_type)?;
            let format = match format {
                Some(format) => format.parse::<OutputFormat>()?,
                None => settings.output.format,
            };
            if let Some(concurrency) = concurrency {
                settings.enrichment.concurrency = concurrency;
                settings.validate()?;
            }

            let service = MarketplaceService::from_settings(&settings)?;
            let outcome = service.items_until(&search, shutdown_signal()).await?;

            let path = output.unwrap_or_else(|| {
                Path::new(&settings.output.dir).join(format!(
                    "items_{}_{}.{}",
                    file_slug(&query),
                    file_timestamp(),
                    format.extension()
                ))
            });
            export_items(&outcome.items, format, &path).await?;

            let report = &outcome.report;
            info!(
                items = outcome.items.len(),
                enriched = report.enriched,
                failed = report.failed.len(),
                timed_out = report.timed_out.len(),
                cancelled = report.cancelled.len(),
                "Run complete"
            );
            for (item_code, message) in &report.failed {
                warn!(item_code = %item_code, error = %message, "Item left without detail data");
            }
            println!("{}", path.display());
        }
        Command::Average {
            query,
            region,
            condition,
        } => {
            let search = SearchQuery::parse(&query, &region, &condition, "all")?;
            let service = MarketplaceService::from_settings(&settings)?;
            let report = service.average(&search).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
