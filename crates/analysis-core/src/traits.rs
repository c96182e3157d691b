use async_trait::async_trait;

use crate::AnalysisError;

/// Source of per-instrument market data consumed by the watchlist engine.
///
/// Implementations own retrieval concerns (HTTP, caching, rate limits); the
/// engine only bounds each call with a timeout.
#[async_trait]
pub trait InstrumentDataProvider: Send + Sync {
    /// Latest price for `symbol`.
    async fn current_price(&self, symbol: &str) -> Result<f64, AnalysisError>;

    /// Up to `window` most recent periodic returns for `symbol`, oldest first.
    async fn history(&self, symbol: &str, window: usize) -> Result<Vec<f64>, AnalysisError>;

    /// Category used for diversity caps, if the provider knows one.
    async fn group(&self, _symbol: &str) -> Result<Option<String>, AnalysisError> {
        Ok(None)
    }

    /// Precomputed momentum signal in [-1, 1]. `None` lets the engine derive one
    /// from the return history.
    async fn momentum_signal(&self, _symbol: &str) -> Result<Option<f64>, AnalysisError> {
        Ok(None)
    }
}
