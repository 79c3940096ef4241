//! portfolio-refresh: update holding prices, analysis and classification in
//! the portfolio document from a market-data snapshot.
//!
//! Usage:
//!   cargo run -p portfolio-refresh -- update
//!   cargo run -p portfolio-refresh -- update --dry-run --symbols TCS INFY
//!   cargo run -p portfolio-refresh -- recategorize-funds

mod config;
mod market_data;
mod portfolio;
mod refresh;
mod symbols;

use anyhow::{Context, Result};
use std::sync::Arc;

use config::{Command, RefreshConfig, DEFAULT_CONCURRENCY};
use market_data::JsonFileMarketData;
use portfolio::PortfolioDocument;
use refresh::{recategorize_funds, PriceRefresher};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let config = RefreshConfig::from_env()?.apply_args(&args)?;
    tracing::info!(
        "portfolio-refresh: {:?}, portfolio={}, dry_run={}",
        config.command,
        config.portfolio_path.display(),
        config.dry_run
    );

    let mut document = PortfolioDocument::load(&config.portfolio_path)
        .await
        .with_context(|| format!("reading {}", config.portfolio_path.display()))?;

    let changed = match config.command {
        Command::Update => {
            let source = JsonFileMarketData::load(&config.market_data_path).await?;
            let refresher = PriceRefresher::new(Arc::new(source), &config);
            let summary = refresher
                .refresh(&mut document, config.symbols.as_deref())
                .await;
            if summary.updated_holdings > 0 {
                tracing::info!(
                    "Successfully updated prices for {} holdings",
                    summary.updated_holdings
                );
            } else {
                tracing::info!("No prices updated");
            }
            summary.updated_holdings
        }
        Command::RecategorizeFunds => {
            let count = recategorize_funds(&mut document);
            tracing::info!("Recategorized {} mutual fund holdings", count);
            count
        }
    };

    if changed == 0 {
        return Ok(());
    }
    if config.dry_run {
        tracing::info!("Dry run, not writing {}", config.portfolio_path.display());
        return Ok(());
    }

    document
        .save(&config.portfolio_path)
        .await
        .with_context(|| format!("writing {}", config.portfolio_path.display()))?;
    tracing::info!("Saved {}", config.portfolio_path.display());
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  portfolio-refresh [update]             Refresh prices, analysis and categories");
    eprintln!("  portfolio-refresh recategorize-funds   Re-derive mutual fund categories");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dry-run              Compute everything but do not write the portfolio");
    eprintln!("  --portfolio PATH       Portfolio JSON (env PORTFOLIO_PATH)");
    eprintln!("  --market-data PATH     Market-data snapshot JSON (env MARKET_DATA_PATH)");
    eprintln!(
        "  --concurrency N        Max symbols fetched in parallel (default: {})",
        DEFAULT_CONCURRENCY
    );
    eprintln!("  --symbols SYM ...      Only refresh these holdings");
}
