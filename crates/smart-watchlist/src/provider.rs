//! In-memory data providers.
//!
//! `StaticDataProvider` serves preloaded instruments (fixtures, tests, the CLI);
//! `BarHistoryProvider` adapts OHLCV bar series into prices and returns.

use std::collections::HashMap;
use std::time::Duration;

use analysis_core::{returns_from_bars, AnalysisError, Bar, Instrument, InstrumentDataProvider};
use async_trait::async_trait;

/// Serves instruments held in memory, optionally with simulated latency.
#[derive(Debug, Clone, Default)]
pub struct StaticDataProvider {
    order: Vec<String>,
    instruments: HashMap<String, Instrument>,
    latency: HashMap<String, Duration>,
}

impl StaticDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_instruments(instruments: Vec<Instrument>) -> Self {
        let mut provider = Self::new();
        for instrument in instruments {
            provider.insert(instrument);
        }
        provider
    }

    /// Parse a JSON array of instruments.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let instruments: Vec<Instrument> = serde_json::from_str(json)?;
        Ok(Self::from_instruments(instruments))
    }

    /// Add or replace an instrument. Replacing keeps its original position.
    pub fn insert(&mut self, instrument: Instrument) {
        if !self.instruments.contains_key(&instrument.symbol) {
            self.order.push(instrument.symbol.clone());
        }
        self.instruments.insert(instrument.symbol.clone(), instrument);
    }

    /// Delay every call for `symbol` by `delay`.
    pub fn with_latency(mut self, symbol: &str, delay: Duration) -> Self {
        self.latency.insert(symbol.to_string(), delay);
        self
    }

    /// Symbols in insertion order, usable as a universe.
    pub fn universe(&self) -> Vec<String> {
        self.order.clone()
    }

    async fn lookup(&self, symbol: &str) -> Result<&Instrument, AnalysisError> {
        if let Some(delay) = self.latency.get(symbol) {
            tokio::time::sleep(*delay).await;
        }
        self.instruments
            .get(symbol)
            .ok_or_else(|| AnalysisError::unavailable(symbol, "unknown symbol"))
    }
}

#[async_trait]
impl InstrumentDataProvider for StaticDataProvider {
    async fn current_price(&self, symbol: &str) -> Result<f64, AnalysisError> {
        Ok(self.lookup(symbol).await?.current_price)
    }

    async fn history(&self, symbol: &str, window: usize) -> Result<Vec<f64>, AnalysisError> {
        let returns = &self.lookup(symbol).await?.returns;
        Ok(returns[returns.len().saturating_sub(window)..].to_vec())
    }

    async fn group(&self, symbol: &str) -> Result<Option<String>, AnalysisError> {
        Ok(self.lookup(symbol).await?.group.clone())
    }

    async fn momentum_signal(&self, symbol: &str) -> Result<Option<f64>, AnalysisError> {
        Ok(self.lookup(symbol).await?.momentum_signal)
    }
}

/// Derives prices and returns from chronological bar series.
#[derive(Debug, Clone, Default)]
pub struct BarHistoryProvider {
    bars: HashMap<String, Vec<Bar>>,
    groups: HashMap<String, String>,
}

impl BarHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_bars(&mut self, symbol: &str, bars: Vec<Bar>) {
        self.bars.insert(symbol.to_string(), bars);
    }

    pub fn set_group(&mut self, symbol: &str, group: &str) {
        self.groups.insert(symbol.to_string(), group.to_string());
    }

    fn bars_for(&self, symbol: &str) -> Result<&[Bar], AnalysisError> {
        match self.bars.get(symbol) {
            Some(bars) if !bars.is_empty() => Ok(bars),
            _ => Err(AnalysisError::unavailable(symbol, "no bars")),
        }
    }
}

#[async_trait]
impl InstrumentDataProvider for BarHistoryProvider {
    async fn current_price(&self, symbol: &str) -> Result<f64, AnalysisError> {
        let bars = self.bars_for(symbol)?;
        Ok(bars[bars.len() - 1].close)
    }

    async fn history(&self, symbol: &str, window: usize) -> Result<Vec<f64>, AnalysisError> {
        let bars = self.bars_for(symbol)?;
        // `window` returns need `window + 1` closes
        let start = bars.len().saturating_sub(window.saturating_add(1));
        Ok(returns_from_bars(&bars[start..]))
    }

    async fn group(&self, symbol: &str) -> Result<Option<String>, AnalysisError> {
        Ok(self.groups.get(symbol).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: Utc::now() - chrono::Duration::days((closes.len() - i) as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000_000.0,
                vwap: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_static_provider_serves_tail_of_history() {
        let provider = StaticDataProvider::from_instruments(vec![Instrument::new(
            "AAPL",
            190.0,
            vec![0.01, 0.02, 0.03, 0.04],
        )
        .with_group("Technology")]);

        assert_eq!(provider.current_price("AAPL").await.unwrap(), 190.0);
        assert_eq!(provider.history("AAPL", 2).await.unwrap(), vec![0.03, 0.04]);
        assert_eq!(provider.history("AAPL", 10).await.unwrap().len(), 4);
        assert_eq!(
            provider.group("AAPL").await.unwrap().as_deref(),
            Some("Technology")
        );
        assert_eq!(provider.momentum_signal("AAPL").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_static_provider_unknown_symbol() {
        let provider = StaticDataProvider::new();
        let err = provider.current_price("ZZZZ").await.unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable { .. }));
    }

    #[test]
    fn test_static_provider_from_json() {
        let json = r#"[
            {"symbol": "KO", "current_price": 60.5, "returns": [0.01, -0.01], "group": "Consumer Staples"},
            {"symbol": "XOM", "current_price": 110.0, "returns": [0.02], "momentum_signal": 0.4}
        ]"#;
        let provider = StaticDataProvider::from_json(json).unwrap();
        assert_eq!(provider.universe(), vec!["KO".to_string(), "XOM".to_string()]);
    }

    #[tokio::test]
    async fn test_bar_provider_adapts_closes() {
        let mut provider = BarHistoryProvider::new();
        provider.insert_bars("SPY", bars(&[100.0, 101.0, 102.01, 100.0]));
        provider.set_group("SPY", "Index");

        assert_eq!(provider.current_price("SPY").await.unwrap(), 100.0);

        let history = provider.history("SPY", 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!((history[0] - 0.01).abs() < 1e-9);
        assert!(history[1] < 0.0);

        assert_eq!(provider.history("SPY", 50).await.unwrap().len(), 3);
        assert_eq!(provider.group("SPY").await.unwrap().as_deref(), Some("Index"));
        assert!(provider.current_price("QQQ").await.is_err());
    }
}
