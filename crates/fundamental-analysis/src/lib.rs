use analysis_core::{evaluate, FinancialSnapshot, ScoreCard, ScoreRule};

// ROE and revenue growth arrive as fractions, D/E as a percentage.
const HIGH_ROE: f64 = 0.15;
const FAIR_ROE: f64 = 0.10;
const LOW_DEBT_TO_EQUITY: f64 = 50.0;
const MANAGEABLE_DEBT_TO_EQUITY: f64 = 100.0;
const REVENUE_GROWTH: f64 = 0.10;
const EXPENSIVE_PE: f64 = 80.0;
const REASONABLE_PE: f64 = 25.0;

/// Quality rules in evaluation order.
///
/// A missing ratio fails every threshold of its category, so an unknown ROE
/// neither earns nor loses points.
pub const QUALITY_RULES: &[ScoreRule<FinancialSnapshot>] = &[
    ScoreRule {
        signal: Some("High ROE"),
        delta: 3,
        applies: |f| f.roe.is_some_and(|roe| roe > HIGH_ROE),
    },
    ScoreRule {
        signal: None,
        delta: 1,
        applies: |f| f.roe.is_some_and(|roe| roe > FAIR_ROE && roe <= HIGH_ROE),
    },
    ScoreRule {
        signal: Some("Low Debt"),
        delta: 3,
        applies: |f| f.debt_to_equity.is_some_and(|d2e| d2e < LOW_DEBT_TO_EQUITY),
    },
    ScoreRule {
        signal: None,
        delta: 1,
        applies: |f| {
            f.debt_to_equity
                .is_some_and(|d2e| d2e >= LOW_DEBT_TO_EQUITY && d2e < MANAGEABLE_DEBT_TO_EQUITY)
        },
    },
    ScoreRule {
        signal: Some("Growing Revenue"),
        delta: 2,
        applies: |f| f.revenue_growth.is_some_and(|growth| growth > REVENUE_GROWTH),
    },
    ScoreRule {
        signal: Some("Expensive Valuation"),
        delta: -1,
        applies: |f| f.pe_ratio.is_some_and(|pe| pe > EXPENSIVE_PE),
    },
    ScoreRule {
        signal: Some("Reasonable Val"),
        delta: 2,
        applies: |f| f.pe_ratio.is_some_and(|pe| pe > 0.0 && pe < REASONABLE_PE),
    },
];

/// Scores profitability, leverage, growth and valuation on a 0-10 scale.
pub struct QualityScorer;

impl QualityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, financials: &FinancialSnapshot) -> ScoreCard {
        let card = evaluate(QUALITY_RULES, financials);
        tracing::debug!(
            raw = card.raw,
            score = card.score,
            signals = ?card.signals,
            "quality rules evaluated"
        );
        card
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new()
    }
}
