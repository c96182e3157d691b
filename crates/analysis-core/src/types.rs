use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub vwap: Option<f64>,
}

/// Read-only market data for one instrument, as consumed by a single build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    /// Ticker symbol, unique within a universe
    pub symbol: String,
    /// Latest traded price
    pub current_price: f64,
    /// Periodic simple returns, oldest first
    pub returns: Vec<f64>,
    /// Categorical grouping used by diversity caps (e.g. sector)
    #[serde(default)]
    pub group: Option<String>,
    /// Externally supplied momentum signal in [-1, 1]
    #[serde(default)]
    pub momentum_signal: Option<f64>,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, current_price: f64, returns: Vec<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            current_price,
            returns,
            group: None,
            momentum_signal: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_momentum_signal(mut self, signal: f64) -> Self {
        self.momentum_signal = Some(signal);
        self
    }
}
