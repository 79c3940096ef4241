use std::path::Path;

use analysis_core::{AnalysisError, Holding};
use serde::{Deserialize, Serialize};

/// The portfolio document. Only `holdings` is interpreted; every other
/// top-level key (accounts, goals, ...) is written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDocument {
    #[serde(default)]
    pub holdings: Vec<Holding>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl PortfolioDocument {
    pub async fn load(path: &Path) -> Result<Self, AnalysisError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let document: PortfolioDocument = serde_json::from_str(&raw)?;
        tracing::debug!("Loaded {} holdings from {}", document.holdings.len(), path.display());
        Ok(document)
    }

    /// Writes the document as 2-space indented JSON.
    pub async fn save(&self, path: &Path) -> Result<(), AnalysisError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
