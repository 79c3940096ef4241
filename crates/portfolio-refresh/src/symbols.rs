use std::collections::BTreeMap;

use analysis_core::{AssetClass, Holding};

use crate::market_data::MarketQuote;

/// COMEX gold futures, quoted in USD per troy ounce.
pub const GOLD_FUTURES_SYMBOL: &str = "GC=F";
/// USD/INR spot.
pub const USD_INR_SYMBOL: &str = "INR=X";
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

/// Symbol to ask the market-data source for, or `None` if the holding is not
/// priced per symbol (gold bonds, deposits, property...).
pub fn market_symbol(holding: &Holding) -> Option<String> {
    if holding.is_sovereign_gold_bond() {
        return None;
    }

    match holding.asset_class {
        AssetClass::UsEquity => Some(holding.symbol.clone()),
        AssetClass::Equity | AssetClass::Etf => Some(exchange_symbol(&holding.symbol)),
        AssetClass::MutualFund => holding.isin.clone().filter(|isin| !isin.is_empty()),
        _ => None,
    }
}

/// NSE ticker for a broker symbol. NSDL only trades on BSE under that name.
fn exchange_symbol(symbol: &str) -> String {
    if symbol == "NSDL" {
        return "NSDL.BO".to_string();
    }
    let symbol = symbol.strip_suffix("-EQ").unwrap_or(symbol);
    let symbol = symbol.strip_suffix("-BL").unwrap_or(symbol);
    format!("{}.NS", symbol)
}

/// Holding indices grouped by market symbol, so each symbol is fetched once.
///
/// With a `filter`, only holdings whose own symbol appears in it (ignoring
/// case) are included.
pub fn group_by_market_symbol(
    holdings: &[Holding],
    filter: Option<&[String]>,
) -> BTreeMap<String, Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, holding) in holdings.iter().enumerate() {
        if !is_selected(holding, filter) {
            continue;
        }
        if let Some(symbol) = market_symbol(holding) {
            groups.entry(symbol).or_default().push(index);
        }
    }
    groups
}

pub fn is_selected(holding: &Holding, filter: Option<&[String]>) -> bool {
    match filter {
        Some(symbols) => symbols.iter().any(|s| s.eq_ignore_ascii_case(&holding.symbol)),
        None => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldProxyPrice {
    pub price_per_gram: f64,
    pub day_change: f64,
    pub day_change_percent: Option<f64>,
}

/// Price of one gram of gold in INR, derived from the futures and FX quotes.
///
/// The day change follows the futures contract's percentage move.
pub fn gold_proxy_price(gold: &MarketQuote, usd_inr: &MarketQuote) -> Option<GoldProxyPrice> {
    let gold_usd = gold.usable_price()?;
    let rate = usd_inr.usable_price()?;

    let price_per_gram = gold_usd * rate / GRAMS_PER_TROY_OUNCE;
    let day_change_percent = gold.day_change_percent;
    let day_change = price_per_gram * day_change_percent.unwrap_or(0.0) / 100.0;

    Some(GoldProxyPrice {
        price_per_gram,
        day_change,
        day_change_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_market_symbol_resolution() {
        let stock = Holding::new("RELIANCE-EQ", "Reliance Industries", AssetClass::Equity);
        assert_eq!(market_symbol(&stock).as_deref(), Some("RELIANCE.NS"));

        let blocked = Holding::new("IRFC-BL", "Indian Railway Finance", AssetClass::Equity);
        assert_eq!(market_symbol(&blocked).as_deref(), Some("IRFC.NS"));

        let nsdl = Holding::new("NSDL", "NSDL", AssetClass::Equity);
        assert_eq!(market_symbol(&nsdl).as_deref(), Some("NSDL.BO"));

        let etf = Holding::new("NIFTYBEES", "Nippon Nifty BeES", AssetClass::Etf);
        assert_eq!(market_symbol(&etf).as_deref(), Some("NIFTYBEES.NS"));

        let us = Holding::new("AAPL", "Apple Inc", AssetClass::UsEquity).with_currency("USD");
        assert_eq!(market_symbol(&us).as_deref(), Some("AAPL"));

        let fund = Holding::new("PPFAS", "Parag Parikh Flexi Cap", AssetClass::MutualFund)
            .with_isin("INF879O01027");
        assert_eq!(market_symbol(&fund).as_deref(), Some("INF879O01027"));
    }

    #[test]
    fn test_unpriced_holdings_have_no_symbol() {
        let sgb = Holding::new("SGBMAR29", "SGB 2029", AssetClass::Equity);
        assert_eq!(market_symbol(&sgb), None);

        let fund_without_isin = Holding::new("XYZ", "Some Fund", AssetClass::MutualFund);
        assert_eq!(market_symbol(&fund_without_isin), None);

        let deposit = Holding::new("FD-HDFC", "HDFC Fixed Deposit", AssetClass::Debt);
        assert_eq!(market_symbol(&deposit), None);
    }

    #[test]
    fn test_grouping_shares_one_fetch_per_symbol() {
        let holdings = vec![
            Holding::new("TCS-EQ", "TCS", AssetClass::Equity),
            Holding::new("INFY", "Infosys", AssetClass::Equity),
            Holding::new("TCS", "TCS", AssetClass::Equity),
            Holding::new("FD-SBI", "SBI FD", AssetClass::Debt),
        ];

        let groups = group_by_market_symbol(&holdings, None);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["TCS.NS"], vec![0, 2]);
        assert_eq!(groups["INFY.NS"], vec![1]);

        let filter = vec!["infy".to_string()];
        let filtered = group_by_market_symbol(&holdings, Some(&filter));
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains_key("INFY.NS"));
    }

    #[test]
    fn test_gold_proxy_price() {
        let gold = MarketQuote {
            price: Some(2000.0),
            day_change_percent: Some(1.5),
            ..Default::default()
        };
        let usd_inr = MarketQuote {
            price: Some(83.0),
            ..Default::default()
        };

        let proxy = gold_proxy_price(&gold, &usd_inr).unwrap();
        let expected = 2000.0 * 83.0 / 31.1035;
        assert_relative_eq!(proxy.price_per_gram, expected, epsilon = 1e-9);
        assert_relative_eq!(proxy.day_change, expected * 0.015, epsilon = 1e-9);
        assert_eq!(proxy.day_change_percent, Some(1.5));
    }

    #[test]
    fn test_gold_proxy_without_percent_move() {
        let gold = MarketQuote {
            price: Some(2000.0),
            ..Default::default()
        };
        let usd_inr = MarketQuote {
            price: Some(83.0),
            ..Default::default()
        };
        let proxy = gold_proxy_price(&gold, &usd_inr).unwrap();
        assert_eq!(proxy.day_change, 0.0);
        assert_eq!(proxy.day_change_percent, None);

        assert!(gold_proxy_price(&gold, &MarketQuote::default()).is_none());
    }
}
