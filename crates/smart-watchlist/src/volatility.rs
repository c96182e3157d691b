//! Volatility Estimator
//!
//! Turns a historical return series into a horizon-scaled volatility estimate.
//! Uses the sample standard deviation (N - 1 denominator) and the
//! square-root-of-time rule.

use analysis_core::{finite_values, AnalysisError};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::config::WatchlistConfig;

/// Volatility of one instrument, recomputed on every build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityEstimate {
    /// Standard deviation of one period's return
    pub per_period: f64,
    /// `per_period` scaled to the forecast horizon
    pub horizon: f64,
    pub horizon_periods: u32,
    /// Finite observations the estimate is based on
    pub observations: usize,
}

#[derive(Debug, Clone)]
pub struct VolatilityEstimator {
    min_window: usize,
    horizon_periods: u32,
}

impl VolatilityEstimator {
    pub fn new(min_window: usize, horizon_periods: u32) -> Self {
        Self {
            // A standard deviation needs two points
            min_window: min_window.max(2),
            horizon_periods: horizon_periods.max(1),
        }
    }

    pub fn from_config(config: &WatchlistConfig) -> Self {
        Self::new(config.min_history, config.horizon_periods)
    }

    /// Estimate horizon volatility from `returns`.
    ///
    /// Fails with `InsufficientHistory` when the raw series is shorter than the
    /// minimum window, and with `InvalidData` when too few finite values remain
    /// after dropping NaN/infinite periods.
    pub fn estimate(&self, returns: &[f64]) -> Result<VolatilityEstimate, AnalysisError> {
        if returns.len() < self.min_window {
            return Err(AnalysisError::InsufficientHistory {
                required: self.min_window,
                available: returns.len(),
            });
        }

        let finite = finite_values(returns);
        if finite.len() < self.min_window {
            return Err(AnalysisError::InvalidData(format!(
                "only {} of {} returns are finite, need {}",
                finite.len(),
                returns.len(),
                self.min_window
            )));
        }

        let per_period = finite.as_slice().std_dev();
        if !per_period.is_finite() {
            return Err(AnalysisError::InvalidData(format!(
                "return dispersion is not finite ({})",
                per_period
            )));
        }
        let per_period = per_period.max(0.0);

        Ok(VolatilityEstimate {
            per_period,
            horizon: per_period * (self.horizon_periods as f64).sqrt(),
            horizon_periods: self.horizon_periods,
            observations: finite.len(),
        })
    }
}
