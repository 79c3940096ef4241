//! Heuristic asset-class / category assignment for holdings.
//!
//! Name and symbol keywords are checked first, in a fixed order, because fund
//! names carry the strongest hint ("... Liquid Fund", "SGB..."). Plain stocks
//! fall through to market-cap bands, then to whatever class the holding
//! already declared.

use analysis_core::{AssetCategory, AssetClass, AssetClassifier, ClassificationResult, Holding};

pub mod mutual_fund;
pub use mutual_fund::categorize_fund_name;

/// Fallback USD/INR rate when the caller has no live quote.
pub const DEFAULT_USD_TO_INR: f64 = 90.0;

/// One crore, in base currency units.
pub const CRORE: f64 = 10_000_000.0;

/// Indicative Indian market-cap bands, in crore.
const LARGECAP_FLOOR_CRORE: f64 = 20_000.0;
const MIDCAP_FLOOR_CRORE: f64 = 5_000.0;

struct KeywordRule {
    symbol_prefixes: &'static [&'static str],
    symbols: &'static [&'static str],
    name_keywords: &'static [&'static str],
    result: ClassificationResult,
}

impl KeywordRule {
    /// `name` and `symbol` must already be upper-cased.
    fn matches(&self, name: &str, symbol: &str) -> bool {
        self.symbol_prefixes.iter().any(|prefix| symbol.starts_with(prefix))
            || self.symbols.iter().any(|s| symbol == *s)
            || self.name_keywords.iter().any(|keyword| name.contains(keyword))
    }
}

const NO_MATCH: &[&str] = &[];

/// Keyword cascade, first match wins. Order matters: "Nippon Nifty Smallcap
/// Index Fund" is an index fund before it is a small-cap fund, and "Large and
/// Mid Cap" lands in MIDCAP because that rule is checked first.
const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        symbol_prefixes: &["SGB"],
        symbols: &["GOLDBEES"],
        name_keywords: &["GOLD"],
        result: ClassificationResult::new(AssetClass::Commodity, AssetCategory::Gold),
    },
    KeywordRule {
        symbol_prefixes: NO_MATCH,
        symbols: &["SILVERBEES"],
        name_keywords: &["SILVER"],
        result: ClassificationResult::new(AssetClass::Commodity, AssetCategory::Silver),
    },
    KeywordRule {
        symbol_prefixes: NO_MATCH,
        symbols: NO_MATCH,
        name_keywords: &["LIQUID"],
        result: ClassificationResult::new(AssetClass::Debt, AssetCategory::LiquidFund),
    },
    KeywordRule {
        symbol_prefixes: NO_MATCH,
        symbols: NO_MATCH,
        name_keywords: &["ARBITRAGE"],
        result: ClassificationResult::new(AssetClass::Debt, AssetCategory::ArbitrageFund),
    },
    KeywordRule {
        symbol_prefixes: NO_MATCH,
        symbols: NO_MATCH,
        name_keywords: &["BOND", "DEBT", "SHORT TERM"],
        result: ClassificationResult::new(AssetClass::Debt, AssetCategory::DebtFund),
    },
    KeywordRule {
        symbol_prefixes: NO_MATCH,
        symbols: NO_MATCH,
        name_keywords: &["NIFTY 50", "INDEX", "SENSEX"],
        result: ClassificationResult::new(AssetClass::Equity, AssetCategory::IndexFund),
    },
    KeywordRule {
        symbol_prefixes: NO_MATCH,
        symbols: NO_MATCH,
        name_keywords: &["SMALL CAP"],
        result: ClassificationResult::new(AssetClass::Equity, AssetCategory::Smallcap),
    },
    KeywordRule {
        symbol_prefixes: NO_MATCH,
        symbols: NO_MATCH,
        name_keywords: &["MID CAP"],
        result: ClassificationResult::new(AssetClass::Equity, AssetCategory::Midcap),
    },
    KeywordRule {
        symbol_prefixes: NO_MATCH,
        symbols: NO_MATCH,
        name_keywords: &["LARGE", "BLUECHIP", "NIFTY NEXT 50"],
        result: ClassificationResult::new(AssetClass::Equity, AssetCategory::Largecap),
    },
];

/// Classifies holdings by keyword, then market cap, then declared class.
pub struct HoldingClassifier {
    usd_to_inr_rate: f64,
}

impl HoldingClassifier {
    pub fn new() -> Self {
        Self {
            usd_to_inr_rate: DEFAULT_USD_TO_INR,
        }
    }

    /// Rate used to bring USD market caps onto the INR bands.
    pub fn with_usd_to_inr_rate(mut self, rate: f64) -> Self {
        self.usd_to_inr_rate = rate;
        self
    }

    /// `market_cap` is in the holding's own currency.
    pub fn classify(&self, holding: &Holding, market_cap: Option<f64>) -> ClassificationResult {
        let name = holding.name.to_uppercase();
        let symbol = holding.symbol.to_uppercase();

        if let Some(rule) = KEYWORD_RULES.iter().find(|rule| rule.matches(&name, &symbol)) {
            tracing::debug!(
                symbol = %holding.symbol,
                class = ?rule.result.asset_class,
                category = ?rule.result.asset_category,
                "classified by keyword"
            );
            return rule.result;
        }

        if let Some(cap) = market_cap.filter(|cap| *cap > 0.0) {
            let cap_in_inr = if holding.is_usd() {
                cap * self.usd_to_inr_rate
            } else {
                cap
            };
            return ClassificationResult::new(AssetClass::Equity, cap_band(cap_in_inr));
        }

        // No cap on file: keep equities as equities without guessing the band
        if holding.asset_class.is_equity() {
            return ClassificationResult::new(AssetClass::Equity, AssetCategory::Multicap);
        }

        ClassificationResult::new(AssetClass::Other, AssetCategory::Other)
    }
}

fn cap_band(cap_in_inr: f64) -> AssetCategory {
    if cap_in_inr > LARGECAP_FLOOR_CRORE * CRORE {
        AssetCategory::Largecap
    } else if cap_in_inr > MIDCAP_FLOOR_CRORE * CRORE {
        AssetCategory::Midcap
    } else {
        AssetCategory::Smallcap
    }
}

impl AssetClassifier for HoldingClassifier {
    fn classify(&self, holding: &Holding, market_cap: Option<f64>) -> ClassificationResult {
        HoldingClassifier::classify(self, holding, market_cap)
    }
}

impl Default for HoldingClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot classification with an explicit USD/INR rate.
pub fn classify_holding(
    holding: &Holding,
    market_cap: Option<f64>,
    usd_to_inr_rate: f64,
) -> ClassificationResult {
    HoldingClassifier::new()
        .with_usd_to_inr_rate(usd_to_inr_rate)
        .classify(holding, market_cap)
}
