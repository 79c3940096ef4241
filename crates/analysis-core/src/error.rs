use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
