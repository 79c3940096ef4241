use std::collections::HashMap;
use std::path::Path;

use analysis_core::{AnalysisError, FinancialSnapshot, PriceSeries};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fundamentals as reported by the quote provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteFundamentals {
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub trailing_pe: Option<f64>,
    #[serde(default)]
    pub forward_pe: Option<f64>,
    #[serde(default)]
    pub revenue_growth: Option<f64>,
}

impl QuoteFundamentals {
    /// Trailing P/E, or forward P/E when the trailing figure is missing or zero.
    pub fn pe_ratio(&self) -> Option<f64> {
        self.trailing_pe
            .filter(|pe| *pe != 0.0 && !pe.is_nan())
            .or(self.forward_pe)
    }
}

/// Everything known about one market symbol at refresh time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub day_change: Option<f64>,
    #[serde(default)]
    pub day_change_percent: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_high: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Daily closes, oldest first. Providers emit `null` for missing sessions.
    #[serde(default)]
    pub history: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub fundamentals: Option<QuoteFundamentals>,
}

impl MarketQuote {
    /// Last traded price, if it is a usable one.
    pub fn usable_price(&self) -> Option<f64> {
        self.price.filter(|price| price.is_finite() && *price > 0.0)
    }

    /// Sanitized closes, or `None` when the provider sent no history at all.
    pub fn price_series(&self) -> Option<PriceSeries> {
        self.history
            .as_ref()
            .map(|closes| PriceSeries::from_closes(closes.iter().copied()))
    }

    pub fn financial_snapshot(&self, current_price: f64) -> FinancialSnapshot {
        let fundamentals = self.fundamentals.clone().unwrap_or_default();
        FinancialSnapshot {
            current_price,
            roe: fundamentals.roe,
            debt_to_equity: fundamentals.debt_to_equity,
            pe_ratio: fundamentals.pe_ratio(),
            revenue_growth: fundamentals.revenue_growth,
            fifty_two_week_high: self.fifty_two_week_high,
        }
    }
}

/// On-disk market data: quotes keyed by market symbol (or ISIN for funds).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub quotes: HashMap<String, MarketQuote>,
}

/// Where the refresh job gets its quotes from.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Option<MarketQuote>, AnalysisError>;
}

/// Quotes pre-fetched into a JSON file by an external collector.
pub struct JsonFileMarketData {
    snapshot: MarketSnapshot,
}

impl JsonFileMarketData {
    pub fn from_snapshot(snapshot: MarketSnapshot) -> Self {
        Self { snapshot }
    }

    pub async fn load(path: &Path) -> Result<Self, AnalysisError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AnalysisError::MarketData(format!("{}: {}", path.display(), e)))?;
        let snapshot: MarketSnapshot = serde_json::from_str(&raw)
            .map_err(|e| AnalysisError::MarketData(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Loaded {} quotes from {}", snapshot.quotes.len(), path.display());
        Ok(Self::from_snapshot(snapshot))
    }
}

#[async_trait]
impl MarketDataSource for JsonFileMarketData {
    async fn quote(&self, symbol: &str) -> Result<Option<MarketQuote>, AnalysisError> {
        Ok(self.snapshot.quotes.get(symbol).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pe_falls_back_to_forward() {
        let trailing = QuoteFundamentals {
            trailing_pe: Some(22.0),
            forward_pe: Some(18.0),
            ..Default::default()
        };
        assert_eq!(trailing.pe_ratio(), Some(22.0));

        let zero_trailing = QuoteFundamentals {
            trailing_pe: Some(0.0),
            forward_pe: Some(18.0),
            ..Default::default()
        };
        assert_eq!(zero_trailing.pe_ratio(), Some(18.0));

        let forward_only = QuoteFundamentals {
            forward_pe: Some(31.0),
            ..Default::default()
        };
        assert_eq!(forward_only.pe_ratio(), Some(31.0));
        assert_eq!(QuoteFundamentals::default().pe_ratio(), None);
    }

    #[test]
    fn test_quote_parses_provider_json() {
        let quote: MarketQuote = serde_json::from_value(json!({
            "price": 2950.5,
            "dayChange": 12.0,
            "dayChangePercent": 0.41,
            "fiftyTwoWeekHigh": 3024.0,
            "marketCap": 1.99e13,
            "history": [2900.0, null, 2925.0, 2950.5],
            "fundamentals": { "roe": 0.09, "debtToEquity": 36.4, "trailingPe": 28.1 }
        }))
        .unwrap();

        assert_eq!(quote.usable_price(), Some(2950.5));
        assert_eq!(&*quote.price_series().unwrap(), &[2900.0, 2925.0, 2950.5]);

        let snapshot = quote.financial_snapshot(2950.5);
        assert_eq!(snapshot.roe, Some(0.09));
        assert_eq!(snapshot.debt_to_equity, Some(36.4));
        assert_eq!(snapshot.pe_ratio, Some(28.1));
        assert_eq!(snapshot.revenue_growth, None);
        assert_eq!(snapshot.fifty_two_week_high, Some(3024.0));
    }

    #[test]
    fn test_missing_history_is_not_empty_history() {
        let no_history = MarketQuote {
            price: Some(10.0),
            ..Default::default()
        };
        assert!(no_history.price_series().is_none());

        let zero_price = MarketQuote {
            price: Some(0.0),
            ..Default::default()
        };
        assert_eq!(zero_price.usable_price(), None);
    }

    #[tokio::test]
    async fn test_file_source_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market.json");
        std::fs::write(
            &path,
            r#"{ "quotes": { "TCS.NS": { "price": 4100.0 } } }"#,
        )
        .unwrap();

        let source = JsonFileMarketData::load(&path).await.unwrap();
        let quote = source.quote("TCS.NS").await.unwrap().unwrap();
        assert_eq!(quote.price, Some(4100.0));
        assert!(source.quote("INFY.NS").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_source_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = JsonFileMarketData::load(&path).await.err().unwrap();
        assert!(err.to_string().contains("missing.json"));
    }
}
