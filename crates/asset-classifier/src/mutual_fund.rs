use analysis_core::AssetCategory;

/// Fund-name keywords, first match wins. Broader than the holding cascade:
/// it also recognises flexi-cap, hybrid and sector funds.
const FUND_CATEGORY_KEYWORDS: &[(&[&str], AssetCategory)] = &[
    (&["SMALL CAP", "SMALLCAP"], AssetCategory::Smallcap),
    (&["MID CAP", "MIDCAP"], AssetCategory::Midcap),
    (
        &["NIFTY 50 INDEX", "NIFTY NEXT 50", "NASDAQ", "FANG+"],
        AssetCategory::IndexFund,
    ),
    (&["LARGE CAP", "LARGECAP"], AssetCategory::Largecap),
    // Tax savers are flexi/multi-cap in practice
    (&["ELSS", "TAX SAVER"], AssetCategory::Multicap),
    (
        &["FLEXI CAP", "FLEXICAP", "DYNAMIC", "HYBRID", "MULTICAP"],
        AssetCategory::Multicap,
    ),
    (&["SHORT TERM", "LIQUID", "DEBT"], AssetCategory::DebtFund),
    (&["GOLD"], AssetCategory::Gold),
    (&["SILVER"], AssetCategory::Silver),
    (
        &["AUTOMOTIVE", "TECHNOLOGY", "PHARMA", "INFRA"],
        AssetCategory::SectorFund,
    ),
];

/// Category for a mutual fund, from its scheme name alone.
pub fn categorize_fund_name(name: &str) -> AssetCategory {
    let name = name.to_uppercase();
    FUND_CATEGORY_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| name.contains(keyword)))
        .map(|(_, category)| *category)
        .unwrap_or(AssetCategory::Other)
}
