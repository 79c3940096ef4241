use analysis_core::{evaluate, FinancialSnapshot, ScoreCard, ScoreRule};

use crate::indicators::{calculate_rsi, calculate_sma, DEFAULT_RSI_PERIOD};

pub const SHORT_MA_PERIOD: usize = 50;
pub const LONG_MA_PERIOD: usize = 200;

/// Within 10% of the 52-week high counts as "near".
pub const NEAR_HIGH_DISTANCE: f64 = 0.10;

/// Technical readings the momentum rules are evaluated against.
///
/// Any indicator can be `None` when the history is too short; rules that need
/// it simply do not fire.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrendSnapshot {
    pub price: f64,
    pub fifty_dma: Option<f64>,
    pub two_hundred_dma: Option<f64>,
    pub rsi: Option<f64>,
    pub distance_from_high: Option<f64>,
}

impl TrendSnapshot {
    pub fn from_prices(prices: &[f64], financials: &FinancialSnapshot) -> Self {
        Self {
            price: financials.current_price,
            fifty_dma: calculate_sma(prices, SHORT_MA_PERIOD),
            two_hundred_dma: calculate_sma(prices, LONG_MA_PERIOD),
            rsi: calculate_rsi(prices, DEFAULT_RSI_PERIOD),
            distance_from_high: financials.distance_from_high(),
        }
    }

    /// Trend rules need both averages at once.
    fn moving_averages(&self) -> Option<(f64, f64)> {
        self.fifty_dma.zip(self.two_hundred_dma)
    }
}

/// Momentum rules in evaluation order. The three RSI bands are disjoint; the
/// trend rules are not, so a golden cross with price under the 50 DMA scores
/// both +2 and -1.
pub const MOMENTUM_RULES: &[ScoreRule<TrendSnapshot>] = &[
    ScoreRule {
        signal: Some("Price > 50DMA"),
        delta: 3,
        applies: |t| t.moving_averages().is_some_and(|(fifty, _)| t.price > fifty),
    },
    ScoreRule {
        signal: Some("Golden Cross Trend"),
        delta: 2,
        applies: |t| t.moving_averages().is_some_and(|(fifty, two_hundred)| fifty > two_hundred),
    },
    ScoreRule {
        signal: Some("Short Term Weakness"),
        delta: -1,
        applies: |t| {
            t.moving_averages()
                .is_some_and(|(fifty, two_hundred)| t.price < fifty && fifty > two_hundred)
        },
    },
    ScoreRule {
        signal: Some("Strong Momentum"),
        delta: 3,
        applies: |t| t.rsi.is_some_and(|rsi| rsi > 50.0 && rsi < 70.0),
    },
    ScoreRule {
        signal: Some("Overbought"),
        delta: 1,
        applies: |t| t.rsi.is_some_and(|rsi| rsi >= 70.0),
    },
    ScoreRule {
        signal: Some("Oversold"),
        delta: -1,
        applies: |t| t.rsi.is_some_and(|rsi| rsi < 30.0),
    },
    ScoreRule {
        signal: Some("Near 52W High"),
        delta: 2,
        applies: |t| t.distance_from_high.is_some_and(|d| d < NEAR_HIGH_DISTANCE),
    },
];

/// Scores trend alignment, RSI and 52-week-high proximity on a 0-10 scale.
pub struct MomentumScorer;

impl MomentumScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, trend: &TrendSnapshot) -> ScoreCard {
        let card = evaluate(MOMENTUM_RULES, trend);
        tracing::debug!(
            raw = card.raw,
            score = card.score,
            signals = ?card.signals,
            "momentum rules evaluated"
        );
        card
    }
}

impl Default for MomentumScorer {
    fn default() -> Self {
        Self::new()
    }
}
