use thiserror::Error;

/// Per-instrument failures raised while fetching or modelling a single symbol.
///
/// None of these abort a watchlist build; the builder excludes the instrument
/// and records the reason.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("Insufficient history: need at least {required} periods, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid momentum signal {0}: must be a finite value in [-1, 1]")]
    InvalidSignal(f64),

    #[error("Invalid price {0}: must be a finite positive value")]
    InvalidPrice(f64),

    #[error("Data fetch for {symbol} timed out after {timeout_ms}ms")]
    DataFetchTimeout { symbol: String, timeout_ms: u64 },
}

impl AnalysisError {
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        AnalysisError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    /// Errors that point at a bug upstream of the engine rather than bad market data.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidSignal(_) | AnalysisError::InvalidPrice(_)
        )
    }

    /// Transient failures that earn one more attempt before exclusion.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::DataFetchTimeout { .. })
    }

    /// Short machine-readable label, used in build reports.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::DataUnavailable { .. } => "data_unavailable",
            AnalysisError::InsufficientHistory { .. } => "insufficient_history",
            AnalysisError::InvalidData(_) => "invalid_data",
            AnalysisError::InvalidSignal(_) => "invalid_signal",
            AnalysisError::InvalidPrice(_) => "invalid_price",
            AnalysisError::DataFetchTimeout { .. } => "data_fetch_timeout",
        }
    }
}
