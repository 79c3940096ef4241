use analysis_core::{AnalysisMetrics, FinancialSnapshot, HoldingAnalysis, HoldingAnalyzer, Scores};
use fundamental_analysis::QualityScorer;
use technical_analysis::{MomentumScorer, TrendSnapshot};

pub mod verdict;
pub use verdict::{decide_verdict, EXTREME_PE};

/// Runs the quality and momentum scorers over one security and derives the
/// verdict.
///
/// Pure and stateless: no clock, no I/O, so repeated calls with the same inputs
/// serialize to identical bytes and holdings can be analyzed in parallel.
pub struct StockAnalyzer {
    quality_scorer: QualityScorer,
    momentum_scorer: MomentumScorer,
}

impl StockAnalyzer {
    pub fn new() -> Self {
        Self {
            quality_scorer: QualityScorer::new(),
            momentum_scorer: MomentumScorer::new(),
        }
    }

    /// `prices` are closes oldest to newest. Short histories are fine: any
    /// indicator that needs more data is reported as unavailable and its rules
    /// are skipped.
    pub fn analyze(&self, prices: &[f64], financials: &FinancialSnapshot) -> HoldingAnalysis {
        let quality = self.quality_scorer.score(financials);

        let trend = TrendSnapshot::from_prices(prices, financials);
        let momentum = self.momentum_scorer.score(&trend);

        let verdict = decide_verdict(quality.score, momentum.score, financials.pe_ratio);
        let scores = Scores::new(quality.score, momentum.score);

        tracing::debug!(
            bars = prices.len(),
            quality = scores.quality,
            momentum = scores.momentum,
            %verdict,
            "holding analyzed"
        );

        let signals = quality
            .signals
            .iter()
            .chain(momentum.signals.iter())
            .map(|signal| signal.to_string())
            .collect();

        HoldingAnalysis {
            verdict,
            scores,
            signals,
            metrics: build_metrics(financials, &trend),
        }
    }
}

fn build_metrics(financials: &FinancialSnapshot, trend: &TrendSnapshot) -> AnalysisMetrics {
    AnalysisMetrics {
        roe: financials.roe,
        debt_to_equity: financials.debt_to_equity,
        pe_ratio: financials.pe_ratio,
        revenue_growth: financials.revenue_growth,
        fifty_two_week_high: financials.fifty_two_week_high,
        fifty_dma: trend.fifty_dma,
        two_hundred_dma: trend.two_hundred_dma,
        rsi: trend.rsi,
        distance_from_high: trend.distance_from_high,
    }
}

impl HoldingAnalyzer for StockAnalyzer {
    fn analyze(&self, prices: &[f64], financials: &FinancialSnapshot) -> HoldingAnalysis {
        StockAnalyzer::analyze(self, prices, financials)
    }
}

impl Default for StockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper around a default [`StockAnalyzer`].
pub fn analyze_stock(prices: &[f64], financials: &FinancialSnapshot) -> HoldingAnalysis {
    StockAnalyzer::new().analyze(prices, financials)
}
