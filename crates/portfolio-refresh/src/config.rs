use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

use asset_classifier::DEFAULT_USD_TO_INR;

pub const DEFAULT_PORTFOLIO_PATH: &str = "data/financial-data.json";
pub const DEFAULT_MARKET_DATA_PATH: &str = "data/market-data.json";
/// Max symbols fetched in parallel.
pub const DEFAULT_CONCURRENCY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Refresh prices, analysis and classification.
    Update,
    /// Re-derive mutual fund categories from fund names.
    RecategorizeFunds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshConfig {
    pub command: Command,
    pub portfolio_path: PathBuf,
    pub market_data_path: PathBuf,
    pub usd_to_inr_rate: f64,
    pub concurrency: usize,
    pub reclassify: bool,
    pub dry_run: bool,
    /// Only refresh holdings with these symbols.
    pub symbols: Option<Vec<String>>,
}

impl RefreshConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            command: Command::Update,
            portfolio_path: var("PORTFOLIO_PATH")
                .unwrap_or_else(|| DEFAULT_PORTFOLIO_PATH.to_string())
                .into(),
            market_data_path: var("MARKET_DATA_PATH")
                .unwrap_or_else(|| DEFAULT_MARKET_DATA_PATH.to_string())
                .into(),
            usd_to_inr_rate: var("USD_INR_RATE")
                .unwrap_or_else(|| DEFAULT_USD_TO_INR.to_string())
                .parse()
                .context("USD_INR_RATE must be a number")?,
            concurrency: var("REFRESH_CONCURRENCY")
                .unwrap_or_else(|| DEFAULT_CONCURRENCY.to_string())
                .parse()
                .context("REFRESH_CONCURRENCY must be a positive integer")?,
            reclassify: var("RECLASSIFY")
                .unwrap_or_else(|| "true".to_string())
                .parse()
                .context("RECLASSIFY must be true or false")?,
            dry_run: false,
            symbols: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line arguments on top of the environment settings.
    /// The command, if given, must come first.
    pub fn apply_args(mut self, args: &[String]) -> Result<Self> {
        if let Some(command) = args.first().filter(|a| !a.starts_with("--")) {
            self.command = match command.as_str() {
                "update" => Command::Update,
                "recategorize-funds" => Command::RecategorizeFunds,
                other => bail!("unknown command '{}'", other),
            };
        }

        self.dry_run = self.dry_run || args.iter().any(|a| a == "--dry-run");

        if let Some(path) = flag_value(args, "--portfolio") {
            self.portfolio_path = path.into();
        }
        if let Some(path) = flag_value(args, "--market-data") {
            self.market_data_path = path.into();
        }
        if let Some(value) = flag_value(args, "--concurrency") {
            self.concurrency = value
                .parse()
                .with_context(|| format!("invalid --concurrency '{}'", value))?;
        }

        if let Some(idx) = args.iter().position(|a| a == "--symbols") {
            let symbols: Vec<String> = args[idx + 1..]
                .iter()
                .take_while(|a| !a.starts_with("--"))
                .cloned()
                .collect();
            if symbols.is_empty() {
                bail!("--symbols needs at least one symbol");
            }
            self.symbols = Some(symbols);
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if !(self.usd_to_inr_rate.is_finite() && self.usd_to_inr_rate > 0.0) {
            bail!("USD/INR rate must be positive, got {}", self.usd_to_inr_rate);
        }
        Ok(())
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
