use std::sync::Arc;

use analysis_core::{
    AnalysisError, AssetCategory, AssetClass, AssetType, ClassificationResult, Holding,
    HoldingAnalysis,
};
use analysis_orchestrator::StockAnalyzer;
use asset_classifier::{categorize_fund_name, HoldingClassifier};
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use crate::config::RefreshConfig;
use crate::market_data::{MarketDataSource, MarketQuote};
use crate::portfolio::PortfolioDocument;
use crate::symbols::{
    gold_proxy_price, group_by_market_symbol, is_selected, GOLD_FUTURES_SYMBOL, USD_INR_SYMBOL,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub symbols: usize,
    pub updated_holdings: usize,
    pub analyzed_symbols: usize,
    pub failed_symbols: usize,
    pub reclassified_holdings: usize,
}

/// Result of fetching one market symbol.
struct SymbolUpdate {
    quote: MarketQuote,
    price: f64,
    analysis: Option<HoldingAnalysis>,
}

/// Refreshes prices, analysis and classification of a portfolio document
/// from a market-data source.
pub struct PriceRefresher {
    source: Arc<dyn MarketDataSource>,
    analyzer: Arc<StockAnalyzer>,
    classifier: HoldingClassifier,
    concurrency: usize,
    reclassify: bool,
}

impl PriceRefresher {
    pub fn new(source: Arc<dyn MarketDataSource>, config: &RefreshConfig) -> Self {
        Self {
            source,
            analyzer: Arc::new(StockAnalyzer::new()),
            classifier: HoldingClassifier::new().with_usd_to_inr_rate(config.usd_to_inr_rate),
            concurrency: config.concurrency.max(1),
            reclassify: config.reclassify,
        }
    }

    pub async fn refresh(
        &self,
        document: &mut PortfolioDocument,
        filter: Option<&[String]>,
    ) -> RefreshSummary {
        let now = Utc::now();
        let mut summary = RefreshSummary::default();

        self.refresh_gold_bonds(document, filter, now, &mut summary).await;

        let groups = group_by_market_symbol(&document.holdings, filter);
        summary.symbols = groups.len();
        tracing::info!(
            "Refreshing {} symbols across {} holdings (concurrency={})",
            groups.len(),
            document.holdings.len(),
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(groups.len());

        for (symbol, indices) in groups {
            let wants_analysis = indices
                .first()
                .map(|&i| document.holdings[i].asset_class.is_equity())
                .unwrap_or(false);
            let source = Arc::clone(&self.source);
            let analyzer = Arc::clone(&self.analyzer);
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(async move {
                let result = match semaphore.acquire().await {
                    Ok(_permit) => {
                        fetch_symbol(source.as_ref(), &analyzer, &symbol, wants_analysis).await
                    }
                    Err(e) => Err(AnalysisError::MarketData(e.to_string())),
                };
                (symbol, indices, result)
            });
            handles.push(handle);
        }

        for handle in handles {
            let (symbol, indices, result) = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    summary.failed_symbols += 1;
                    tracing::warn!("Refresh task panicked: {}", e);
                    continue;
                }
            };

            let update = match result {
                Ok(Some(update)) => update,
                Ok(None) => {
                    tracing::warn!("No price available for {}", symbol);
                    continue;
                }
                Err(e) => {
                    summary.failed_symbols += 1;
                    tracing::warn!("Failed to fetch {}: {}", symbol, e);
                    continue;
                }
            };

            log_symbol_update(&symbol, &update);
            if update.analysis.is_some() {
                summary.analyzed_symbols += 1;
            }

            for index in indices {
                let holding = &mut document.holdings[index];
                holding.last_price = Some(update.price);
                holding.day_change = update.quote.day_change;
                holding.day_change_percent = update.quote.day_change_percent;
                holding.last_updated = Some(now);
                if let Some(analysis) = &update.analysis {
                    holding.analysis = Some(analysis.clone());
                }
                summary.updated_holdings += 1;

                // Partial merge, not a wholesale overwrite: the class that drives
                // symbol lookup is kept and OTHER never replaces a known category.
                if self.reclassify
                    && self.apply_classification(holding, update.quote.market_cap)
                {
                    summary.reclassified_holdings += 1;
                }
            }
        }

        tracing::info!(
            "Refresh finished: {} holdings updated, {}/{} symbols analyzed, {} failed, \
             {} reclassified",
            summary.updated_holdings,
            summary.analyzed_symbols,
            summary.symbols,
            summary.failed_symbols,
            summary.reclassified_holdings
        );
        summary
    }

    async fn refresh_gold_bonds(
        &self,
        document: &mut PortfolioDocument,
        filter: Option<&[String]>,
        now: DateTime<Utc>,
        summary: &mut RefreshSummary,
    ) {
        let has_bonds = document
            .holdings
            .iter()
            .any(|h| h.is_sovereign_gold_bond() && is_selected(h, filter));
        if !has_bonds {
            return;
        }

        let (gold, usd_inr) = tokio::join!(
            self.source.quote(GOLD_FUTURES_SYMBOL),
            self.source.quote(USD_INR_SYMBOL),
        );
        let proxy = match (gold, usd_inr) {
            (Ok(Some(gold)), Ok(Some(usd_inr))) => gold_proxy_price(&gold, &usd_inr),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Gold proxy quotes unavailable: {}", e);
                None
            }
            _ => None,
        };
        let Some(proxy) = proxy else {
            tracing::warn!(
                "Skipping SGB holdings: need {} and {} quotes",
                GOLD_FUTURES_SYMBOL,
                USD_INR_SYMBOL
            );
            return;
        };

        tracing::info!(
            "Gold proxy: {:.2} INR/gram ({:.2}%)",
            proxy.price_per_gram,
            proxy.day_change_percent.unwrap_or(0.0)
        );

        for holding in document
            .holdings
            .iter_mut()
            .filter(|h| h.is_sovereign_gold_bond() && is_selected(h, filter))
        {
            holding.last_price = Some(proxy.price_per_gram);
            holding.day_change = Some(proxy.day_change);
            holding.day_change_percent = proxy.day_change_percent;
            holding.last_updated = Some(now);
            summary.updated_holdings += 1;

            // Same partial merge as priced holdings; SGBs are matched by symbol.
            if self.reclassify && self.apply_classification(holding, None) {
                summary.reclassified_holdings += 1;
            }
        }
    }

    /// Merges the classifier's verdict into the holding. Returns whether
    /// anything changed.
    ///
    /// Funds the keyword rules miss are categorized by fund name, and a known
    /// category is never replaced by OTHER.
    fn apply_classification(&self, holding: &mut Holding, market_cap: Option<f64>) -> bool {
        let ClassificationResult {
            asset_class,
            asset_category,
        } = self.classifier.classify(holding, market_cap);

        let asset_category = match (holding.asset_class, asset_category) {
            (AssetClass::MutualFund, AssetCategory::Other) => categorize_fund_name(&holding.name),
            (_, category) => category,
        };
        if asset_category == AssetCategory::Other && holding.asset_category.is_some() {
            return false;
        }

        let mut changed = false;
        if holding.asset_category != Some(asset_category) {
            holding.asset_category = Some(asset_category);
            changed = true;
        }
        if !keeps_asset_class(holding.asset_class) && holding.asset_class != asset_class {
            holding.asset_class = asset_class;
            changed = true;
        }
        changed
    }
}

/// Classes that decide how a holding is looked up on the next refresh.
fn keeps_asset_class(class: AssetClass) -> bool {
    matches!(
        class,
        AssetClass::Equity | AssetClass::UsEquity | AssetClass::Etf | AssetClass::MutualFund
    )
}

async fn fetch_symbol(
    source: &dyn MarketDataSource,
    analyzer: &StockAnalyzer,
    symbol: &str,
    wants_analysis: bool,
) -> Result<Option<SymbolUpdate>, AnalysisError> {
    let Some(quote) = source.quote(symbol).await? else {
        return Ok(None);
    };
    let Some(price) = quote.usable_price() else {
        return Ok(None);
    };

    let analysis = if wants_analysis {
        quote.price_series().map(|prices| {
            let financials = quote.financial_snapshot(price);
            analyzer.analyze(&prices, &financials)
        })
    } else {
        None
    };

    Ok(Some(SymbolUpdate {
        quote,
        price,
        analysis,
    }))
}

fn log_symbol_update(symbol: &str, update: &SymbolUpdate) {
    let change = update.quote.day_change_percent.unwrap_or(0.0);
    match &update.analysis {
        Some(analysis) => tracing::info!(
            "Updated {}: {:.2} ({:+.2}%) | score {}/10 {}",
            symbol,
            update.price,
            change,
            analysis.scores.total,
            analysis.verdict
        ),
        None => tracing::info!("Updated {}: {:.2} ({:+.2}%)", symbol, update.price, change),
    }
}

/// Tags every mutual fund holding and re-derives its category from the fund
/// name. Returns the number of fund holdings touched.
pub fn recategorize_funds(document: &mut PortfolioDocument) -> usize {
    let mut count = 0;
    for holding in document
        .holdings
        .iter_mut()
        .filter(|h| h.asset_class == AssetClass::MutualFund)
    {
        let category = categorize_fund_name(&holding.name);
        tracing::info!("{} -> {:?}", holding.name, category);
        holding.asset_type = Some(AssetType::MutualFund);
        holding.asset_category = Some(category);
        count += 1;
    }
    count
}
