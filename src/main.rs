// src/main.rs

//! shelfrank: Bestseller Ranking Crawler CLI
//!
//! Runs one ingestion cycle by hand and inspects the persisted catalog.
//! The periodic trigger is an external scheduler (cron or a systemd timer)
//! invoking `shelfrank ingest` once per interval.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use shelfrank::error::Result;
use shelfrank::models::Config;
use shelfrank::pipeline::run_ingest;
use shelfrank::services::{DetailFetcher, ListFetcher};
use shelfrank::storage::{FileLedger, LocalCatalog};
use shelfrank::utils::{HttpPageSource, PageSource};

#[derive(Parser, Debug)]
#[command(
    name = "shelfrank",
    version,
    about = "Crawls online bookstore bestseller rankings into a local catalog"
)]

/// CLI Arguments
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

/// CLI Commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Run one ingestion cycle
    Ingest,
    /// Print the current ranking from storage
    Show {
        /// Show at most this many entries
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Validate the configuration
    Validate,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    match cli.command {
        Command::Ingest => ingest(config).await,
        Command::Show { top } => show(&config, top).await,
        Command::Validate => {
            config.validate()?;
            println!("Configuration OK");
            Ok(())
        }
    }
}

/// Wire up the fetchers and storage, then run one cycle.
async fn ingest(config: Config) -> Result<()> {
    config.validate()?;
    let config = Arc::new(config);

    let source: Arc<dyn PageSource> = Arc::new(HttpPageSource::new(&config.crawler)?);
    let list_fetcher = ListFetcher::new(config.clone(), source.clone())?;
    let detail_fetcher = DetailFetcher::new(config.clone(), source)?;
    let catalog = LocalCatalog::new(config.storage.root_dir.as_str());
    let ledger = FileLedger::new(config.storage.root_dir.as_str());

    let outcome = run_ingest(
        &config,
        &list_fetcher,
        &detail_fetcher,
        &catalog,
        Some(&ledger),
    )
    .await?;

    if outcome.skipped_unchanged {
        println!("List unchanged ({}), nothing to do", &outcome.digest[..12]);
    } else {
        println!(
            "Ingested {} of {} listed books ({} new, {} re-ranked, {} dropped)",
            outcome.persisted,
            outcome.list_count,
            outcome.inserted,
            outcome.updated,
            outcome.detail_failures
        );
    }
    Ok(())
}

/// Print the current ranking, best seller first.
async fn show(config: &Config, top: usize) -> Result<()> {
    let catalog = LocalCatalog::new(config.storage.root_dir.as_str());
    let ranked = catalog.ranked_books().await?;

    if ranked.is_empty() {
        println!("No ranked books in the catalog yet. Run `shelfrank ingest` first.");
        return Ok(());
    }

    for book in ranked.iter().take(top) {
        let rank = book.rank.unwrap_or_default();
        if book.has_isbn() {
            println!(
                "{rank:>3}. {} by {} (ISBN {})",
                book.title, book.author, book.isbn
            );
        } else {
            println!("{rank:>3}. {} by {}", book.title, book.author);
        }
    }
    Ok(())
}
