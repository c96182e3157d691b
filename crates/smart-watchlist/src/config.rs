//! Watchlist build configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{WatchlistError, WatchlistResult};

/// Caps how many members of one category (e.g. sector) the watchlist may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiversityPolicy {
    pub max_per_group: usize,
}

/// Order in which qualifying instruments compete for watchlist slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ranking {
    /// Input universe order
    #[default]
    UniverseOrder,
    /// Strongest directional bias first (|p - 0.5| descending), ties by universe order
    Conviction,
}

impl FromStr for Ranking {
    type Err = WatchlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "universe" | "universe_order" => Ok(Ranking::UniverseOrder),
            "conviction" => Ok(Ranking::Conviction),
            other => Err(WatchlistError::InvalidConfig(format!(
                "unknown ranking '{}' (expected 'universe' or 'conviction')",
                other
            ))),
        }
    }
}

/// Parameters for a single watchlist build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistConfig {
    /// Fewest entries a valid watchlist may hold
    pub min_size: usize,
    /// Most entries a watchlist may hold
    pub max_size: usize,
    /// Forecast horizon in periods of the return series
    pub horizon_periods: u32,
    /// Two-sided coverage of the forecast range (0.68 ~ one standard deviation)
    pub confidence_level: f64,
    /// Minimum number of returns an instrument needs to be modelled
    pub min_history: usize,
    /// Number of returns requested from the provider
    pub lookback: usize,
    /// Number of most recent returns used to derive a momentum signal
    pub momentum_lookback: usize,
    /// Drift per unit of momentum signal, in horizon standard deviations
    pub momentum_drift: f64,
    /// Narrowest allowed range, as a fraction of current price
    pub min_band_fraction: f64,
    pub diversity: Option<DiversityPolicy>,
    pub ranking: Ranking,
    /// Bound on fetching all provider data for one instrument, retried once
    pub fetch_timeout: Duration,
    /// Bound on the whole universe scan
    pub build_deadline: Duration,
    /// Instruments processed at once
    pub max_concurrency: usize,
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            min_size: 10,
            max_size: 25,
            horizon_periods: 5,
            confidence_level: 0.68,
            min_history: 20,
            lookback: 60,
            momentum_lookback: 20,
            momentum_drift: 0.5,
            min_band_fraction: 0.005,
            diversity: None,
            ranking: Ranking::UniverseOrder,
            fetch_timeout: Duration::from_secs(5),
            build_deadline: Duration::from_secs(60),
            max_concurrency: 8,
        }
    }
}

impl WatchlistConfig {
    /// Load from `WATCHLIST_*` environment variables, falling back to defaults.
    pub fn from_env() -> WatchlistResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> WatchlistResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_per_group: Option<usize> = parse_opt(&lookup, "WATCHLIST_MAX_PER_GROUP")?;
        let ranking = match lookup("WATCHLIST_RANKING") {
            Some(raw) => raw.parse()?,
            None => defaults.ranking,
        };

        let config = Self {
            min_size: parse_or(&lookup, "WATCHLIST_MIN_SIZE", defaults.min_size)?,
            max_size: parse_or(&lookup, "WATCHLIST_MAX_SIZE", defaults.max_size)?,
            horizon_periods: parse_or(&lookup, "WATCHLIST_HORIZON_PERIODS", defaults.horizon_periods)?,
            confidence_level: parse_or(&lookup, "WATCHLIST_CONFIDENCE_LEVEL", defaults.confidence_level)?,
            min_history: parse_or(&lookup, "WATCHLIST_MIN_HISTORY", defaults.min_history)?,
            lookback: parse_or(&lookup, "WATCHLIST_LOOKBACK", defaults.lookback)?,
            momentum_lookback: parse_or(&lookup, "WATCHLIST_MOMENTUM_LOOKBACK", defaults.momentum_lookback)?,
            momentum_drift: parse_or(&lookup, "WATCHLIST_MOMENTUM_DRIFT", defaults.momentum_drift)?,
            min_band_fraction: parse_or(&lookup, "WATCHLIST_MIN_BAND_FRACTION", defaults.min_band_fraction)?,
            diversity: max_per_group.map(|max_per_group| DiversityPolicy { max_per_group }),
            ranking,
            fetch_timeout: Duration::from_millis(parse_or(
                &lookup,
                "WATCHLIST_FETCH_TIMEOUT_MS",
                defaults.fetch_timeout.as_millis() as u64,
            )?),
            build_deadline: Duration::from_millis(parse_or(
                &lookup,
                "WATCHLIST_BUILD_DEADLINE_MS",
                defaults.build_deadline.as_millis() as u64,
            )?),
            max_concurrency: parse_or(&lookup, "WATCHLIST_MAX_CONCURRENCY", defaults.max_concurrency)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations that would break the engine's invariants.
    pub fn validate(&self) -> WatchlistResult<()> {
        let invalid = |msg: String| Err(WatchlistError::InvalidConfig(msg));

        if self.max_size == 0 {
            return invalid("max_size must be at least 1".into());
        }
        if self.min_size > self.max_size {
            return invalid(format!(
                "min_size ({}) exceeds max_size ({})",
                self.min_size, self.max_size
            ));
        }
        if self.horizon_periods == 0 {
            return invalid("horizon_periods must be at least 1".into());
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return invalid(format!(
                "confidence_level must lie strictly between 0 and 1, got {}",
                self.confidence_level
            ));
        }
        if self.min_history < 2 {
            return invalid("min_history must be at least 2".into());
        }
        if self.lookback < self.min_history {
            return invalid(format!(
                "lookback ({}) is shorter than min_history ({})",
                self.lookback, self.min_history
            ));
        }
        if self.momentum_lookback < 2 {
            return invalid("momentum_lookback must be at least 2".into());
        }
        if !(self.momentum_drift.is_finite() && self.momentum_drift >= 0.0) {
            return invalid(format!(
                "momentum_drift must be finite and non-negative, got {}",
                self.momentum_drift
            ));
        }
        if !(self.min_band_fraction > 0.0 && self.min_band_fraction < 1.0) {
            return invalid(format!(
                "min_band_fraction must lie strictly between 0 and 1, got {}",
                self.min_band_fraction
            ));
        }
        if let Some(policy) = &self.diversity {
            if policy.max_per_group == 0 {
                return invalid("diversity max_per_group must be at least 1".into());
            }
        }
        if self.fetch_timeout.is_zero() {
            return invalid("fetch_timeout must be non-zero".into());
        }
        if self.max_concurrency == 0 {
            return invalid("max_concurrency must be at least 1".into());
        }
        Ok(())
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> WatchlistResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

fn parse_opt<T, F>(lookup: &F, key: &str) -> WatchlistResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| WatchlistError::InvalidConfig(format!("{}='{}': {}", key, raw, e))),
        None => Ok(None),
    }
}
