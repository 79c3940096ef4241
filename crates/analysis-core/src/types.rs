use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Closing prices, oldest first, one entry per trading day.
///
/// Missing sessions are simply absent. `from_closes` drops entries that cannot
/// be a traded price (null, NaN, infinite, zero or negative) so the indicator
/// library only ever sees usable closes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries(Vec<f64>);

impl PriceSeries {
    pub fn from_closes<I>(closes: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self(
            closes
                .into_iter()
                .flatten()
                .filter(|close| close.is_finite() && *close > 0.0)
                .collect(),
        )
    }
}

impl Deref for PriceSeries {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

/// Point-in-time fundamentals for a security.
///
/// Units follow the upstream quote provider: `roe` and `revenue_growth` are
/// fractions (0.15 = 15%), `debt_to_equity` is already a percentage (40 = 40%).
/// Every ratio is optional and an absent value never scores as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSnapshot {
    pub current_price: f64,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub revenue_growth: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_high: Option<f64>,
}

impl FinancialSnapshot {
    pub fn new(current_price: f64) -> Self {
        Self {
            current_price,
            ..Default::default()
        }
    }

    /// Fractional distance of the current price below the 52-week high.
    /// Unknown when the high is missing or not positive.
    pub fn distance_from_high(&self) -> Option<f64> {
        self.fifty_two_week_high
            .filter(|high| *high > 0.0)
            .map(|high| (high - self.current_price) / high)
    }
}

/// Discrete investment verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Buy,
    Accumulate,
    #[default]
    Hold,
    Trim,
    Sell,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Buy => "BUY",
            Verdict::Accumulate => "ACCUMULATE",
            Verdict::Hold => "HOLD",
            Verdict::Trim => "TRIM",
            Verdict::Sell => "SELL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub quality: u8,
    pub momentum: u8,
    pub total: f64,
}

impl Scores {
    pub fn new(quality: u8, momentum: u8) -> Self {
        Self {
            quality,
            momentum,
            total: (quality as f64 + momentum as f64) / 2.0,
        }
    }
}

/// Raw fundamentals and derived technicals kept alongside the scores for
/// display and audit. Unavailable values serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetrics {
    pub roe: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    #[serde(rename = "fiftyDMA")]
    pub fifty_dma: Option<f64>,
    #[serde(rename = "twoHundredDMA")]
    pub two_hundred_dma: Option<f64>,
    pub rsi: Option<f64>,
    pub distance_from_high: Option<f64>,
}

/// Output of the stock analyzer, persisted onto the holding record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingAnalysis {
    pub verdict: Verdict,
    pub scores: Scores,
    pub signals: Vec<String>,
    pub metrics: AnalysisMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    Equity,
    Debt,
    Commodity,
    RealEstate,
    MutualFund,
    UsEquity,
    /// Legacy classes recorded before categories existed.
    Etf,
    Bond,
    Reit,
    /// Also absorbs any class this version does not know, so one odd record
    /// cannot make the whole portfolio unreadable.
    #[serde(other)]
    Other,
}

impl AssetClass {
    pub fn is_equity(&self) -> bool {
        matches!(self, AssetClass::Equity | AssetClass::UsEquity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetCategory {
    Largecap,
    Midcap,
    Smallcap,
    Multicap,
    Fd,
    Cash,
    LiquidFund,
    ArbitrageFund,
    DebtFund,
    Bond,
    Gold,
    Silver,
    Residential,
    Commercial,
    IndexFund,
    Etf,
    SectorFund,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Direct,
    MutualFund,
    Etf,
    Sgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub asset_class: AssetClass,
    pub asset_category: AssetCategory,
}

impl ClassificationResult {
    pub const fn new(asset_class: AssetClass, asset_category: AssetCategory) -> Self {
        Self {
            asset_class,
            asset_category,
        }
    }
}

/// A position as stored in the portfolio document.
///
/// Fields this workspace does not interpret are kept in `extra` so a refresh
/// writes the record back without losing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub account_id: String,
    pub asset_class: AssetClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_category: Option<AssetCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<AssetType>,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    pub name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub average_price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_change_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<HoldingAnalysis>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Holding {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        asset_class: AssetClass,
    ) -> Self {
        let symbol = symbol.into();
        Self {
            id: symbol.to_lowercase(),
            account_id: String::new(),
            asset_class,
            asset_category: None,
            asset_type: None,
            symbol,
            isin: None,
            name: name.into(),
            quantity: 0.0,
            average_price: 0.0,
            currency: default_currency(),
            last_price: None,
            day_change: None,
            day_change_percent: None,
            last_updated: None,
            analysis: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_isin(mut self, isin: impl Into<String>) -> Self {
        self.isin = Some(isin.into());
        self
    }

    pub fn is_usd(&self) -> bool {
        self.currency == "USD"
    }

    /// Sovereign Gold Bonds trade under `SGB...` symbols.
    pub fn is_sovereign_gold_bond(&self) -> bool {
        self.symbol.starts_with("SGB")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_price_series_drops_unusable_closes() {
        let series = PriceSeries::from_closes(vec![
            Some(10.0),
            None,
            Some(f64::NAN),
            Some(-3.0),
            Some(0.0),
            Some(f64::INFINITY),
            Some(11.5),
        ]);
        assert_eq!(&*series, &[10.0, 11.5]);
    }

    #[test]
    fn test_distance_from_high() {
        let snapshot = FinancialSnapshot {
            fifty_two_week_high: Some(200.0),
            ..FinancialSnapshot::new(190.0)
        };
        assert_relative_eq!(snapshot.distance_from_high().unwrap(), 0.05);

        let no_high = FinancialSnapshot::new(190.0);
        assert_eq!(no_high.distance_from_high(), None);

        let zero_high = FinancialSnapshot {
            fifty_two_week_high: Some(0.0),
            ..FinancialSnapshot::new(190.0)
        };
        assert_eq!(zero_high.distance_from_high(), None);
    }

    #[test]
    fn test_scores_total_is_average() {
        let scores = Scores::new(7, 4);
        assert_relative_eq!(scores.total, 5.5);
    }

    #[test]
    fn test_analysis_serializes_dashboard_keys() {
        let analysis = HoldingAnalysis {
            verdict: Verdict::Accumulate,
            scores: Scores::new(8, 2),
            signals: vec!["High ROE".to_string()],
            metrics: AnalysisMetrics {
                fifty_dma: Some(101.0),
                rsi: None,
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["verdict"], json!("ACCUMULATE"));
        assert_eq!(value["scores"]["total"], json!(5.0));
        assert_eq!(value["metrics"]["fiftyDMA"], json!(101.0));
        assert_eq!(value["metrics"]["twoHundredDMA"], json!(null));
        assert_eq!(value["metrics"]["rsi"], json!(null));
    }

    #[test]
    fn test_holding_round_trip_keeps_unknown_fields() {
        let raw = json!({
            "id": "h1",
            "accountId": "acc-1",
            "assetClass": "US_EQUITY",
            "symbol": "AAPL",
            "name": "Apple Inc",
            "quantity": 10,
            "averagePrice": 150.5,
            "currency": "USD",
            "lastUpdated": "2024-03-01T10:00:00Z",
            "brokerNote": "imported from IBKR"
        });
        let holding: Holding = serde_json::from_value(raw).unwrap();
        assert_eq!(holding.asset_class, AssetClass::UsEquity);
        assert!(holding.is_usd());
        assert_eq!(holding.extra["brokerNote"], json!("imported from IBKR"));

        let back = serde_json::to_value(&holding).unwrap();
        assert_eq!(back["brokerNote"], json!("imported from IBKR"));
        assert_eq!(back["assetClass"], json!("US_EQUITY"));
        assert!(back.get("analysis").is_none());
    }

    #[test]
    fn test_legacy_and_unknown_asset_classes() {
        let reit: AssetClass = serde_json::from_value(json!("REIT")).unwrap();
        assert_eq!(reit, AssetClass::Reit);
        let bond: AssetClass = serde_json::from_value(json!("BOND")).unwrap();
        assert_eq!(bond, AssetClass::Bond);
        let crypto: AssetClass = serde_json::from_value(json!("CRYPTO")).unwrap();
        assert_eq!(crypto, AssetClass::Other);
        assert!(!crypto.is_equity());
    }

    #[test]
    fn test_asset_enums_use_wire_names() {
        let wire = |value: serde_json::Value, expected: &str| assert_eq!(value, json!(expected));
        wire(serde_json::to_value(AssetClass::RealEstate).unwrap(), "REAL_ESTATE");
        wire(serde_json::to_value(AssetCategory::LiquidFund).unwrap(), "LIQUID_FUND");
        wire(serde_json::to_value(AssetCategory::Largecap).unwrap(), "LARGECAP");
        wire(serde_json::to_value(AssetType::MutualFund).unwrap(), "MUTUAL_FUND");
    }
}
