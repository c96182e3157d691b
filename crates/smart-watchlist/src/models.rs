//! Smart Watchlist Data Models

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Per-ticker record handed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    /// Current price
    pub current_price: f64,
    /// Lower bound of the forecast range
    pub range_low: f64,
    /// Upper bound of the forecast range
    pub range_high: f64,
    /// Median forecast, always within the range
    pub target_price: f64,
    /// Probability (0-1) of finishing the horizon at or above the current price
    pub bullish_probability: f64,
    /// Horizon volatility used for the forecast
    pub volatility: f64,
    /// Momentum signal used for the drift (-1 to 1)
    pub momentum_signal: f64,
    /// Diversity group, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl WatchlistEntry {
    /// Expected move to target as a percentage of the current price
    pub fn potential_return(&self) -> f64 {
        (self.target_price - self.current_price) / self.current_price * 100.0
    }

    /// Distance of the bullish probability from a coin flip (0 to 0.5)
    pub fn conviction(&self) -> f64 {
        (self.bullish_probability - 0.5).abs()
    }

    /// Whether the current price sits inside the forecast range
    pub fn price_in_range(&self) -> bool {
        self.range_low <= self.current_price && self.current_price <= self.range_high
    }
}

/// An instrument left out of the watchlist, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub symbol: String,
    pub kind: String,
    pub reason: String,
}

/// Diagnostics for one build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReport {
    /// Distinct symbols submitted
    pub scanned: usize,
    /// Symbols that produced a valid forecast
    pub qualified: usize,
    /// Symbols dropped for data or contract problems
    pub excluded: Vec<Exclusion>,
    /// Symbols still in flight when the deadline expired or the build was cancelled
    pub unfinished: Vec<String>,
    /// Qualified symbols dropped by the per-group cap
    pub dropped_by_diversity: Vec<String>,
    /// Qualified symbols dropped by the maximum size
    pub dropped_by_size: Vec<String>,
    /// True when the scan stopped before every instrument completed
    pub partial: bool,
    pub elapsed: Duration,
    pub generated_at: Option<DateTime<Utc>>,
}

/// Mapping from ticker to forecast, in selection order.
///
/// Serializes as a JSON object keyed by ticker.
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    order: Vec<String>,
    entries: HashMap<String, WatchlistEntry>,
    report: BuildReport,
}

impl Watchlist {
    pub(crate) fn from_selection(
        selection: Vec<(String, WatchlistEntry)>,
        report: BuildReport,
    ) -> Self {
        let mut order = Vec::with_capacity(selection.len());
        let mut entries = HashMap::with_capacity(selection.len());
        for (symbol, entry) in selection {
            if entries.insert(symbol.clone(), entry).is_none() {
                order.push(symbol);
            }
        }
        Self {
            order,
            entries,
            report,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&WatchlistEntry> {
        self.entries.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    /// Tickers in selection order
    pub fn symbols(&self) -> &[String] {
        &self.order
    }

    /// Entries in selection order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WatchlistEntry)> {
        self.order
            .iter()
            .filter_map(|s| self.entries.get(s).map(|e| (s.as_str(), e)))
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Number of entries per diversity group; ungrouped entries are not counted
    pub fn group_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for (_, entry) in self.iter() {
            if let Some(group) = &entry.group {
                *counts.entry(group.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl Serialize for Watchlist {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (symbol, entry) in self.iter() {
            map.serialize_entry(symbol, entry)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(price: f64, p: f64, group: Option<&str>) -> WatchlistEntry {
        WatchlistEntry {
            current_price: price,
            range_low: price * 0.9,
            range_high: price * 1.1,
            target_price: price * 1.02,
            bullish_probability: p,
            volatility: 0.05,
            momentum_signal: 0.1,
            group: group.map(|g| g.to_string()),
        }
    }

    #[test]
    fn test_entry_helpers() {
        let e = entry(100.0, 0.7, None);
        assert!((e.potential_return() - 2.0).abs() < 1e-9);
        assert!((e.conviction() - 0.2).abs() < 1e-9);
        assert!(e.price_in_range());
    }

    #[test]
    fn test_watchlist_keeps_selection_order() {
        let list = Watchlist::from_selection(
            vec![
                ("MSFT".to_string(), entry(400.0, 0.55, Some("Technology"))),
                ("JNJ".to_string(), entry(150.0, 0.45, Some("Healthcare"))),
                ("AAPL".to_string(), entry(190.0, 0.60, Some("Technology"))),
            ],
            BuildReport::default(),
        );

        assert_eq!(list.len(), 3);
        assert_eq!(list.symbols(), &["MSFT", "JNJ", "AAPL"]);
        assert!(list.contains("JNJ"));
        assert_eq!(list.group_counts().get("Technology"), Some(&2));
    }

    #[test]
    fn test_serializes_as_ticker_map() {
        let list = Watchlist::from_selection(
            vec![("AAPL".to_string(), entry(190.0, 0.6, None))],
            BuildReport::default(),
        );

        let json = serde_json::to_value(&list).unwrap();
        let record = &json["AAPL"];
        for field in [
            "current_price",
            "range_low",
            "range_high",
            "target_price",
            "bullish_probability",
        ] {
            assert!(record.get(field).is_some(), "missing {}", field);
        }
        assert!(record.get("group").is_none());
    }
}
