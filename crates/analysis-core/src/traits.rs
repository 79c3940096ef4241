use crate::{ClassificationResult, FinancialSnapshot, Holding, HoldingAnalysis};

/// Scores a single security from its closing prices and fundamentals.
///
/// Implementations are pure: identical inputs must produce identical output,
/// so callers are free to fan out across holdings without coordination.
pub trait HoldingAnalyzer: Send + Sync {
    fn analyze(&self, prices: &[f64], financials: &FinancialSnapshot) -> HoldingAnalysis;
}

/// Assigns an asset class and category to a holding.
pub trait AssetClassifier: Send + Sync {
    fn classify(&self, holding: &Holding, market_cap: Option<f64>) -> ClassificationResult;
}
