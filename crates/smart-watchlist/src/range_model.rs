//! Range & Bias Model
//!
//! Models the log price change over the forecast horizon as
//! `ln(P_T / P) ~ Normal(mu, sigma^2)` where `sigma` is the horizon volatility
//! and the drift `mu = S * momentum_drift * sigma` follows the momentum signal.
//!
//! - Range: `P * exp(mu -/+ z * sigma)` for the configured two-sided confidence
//!   level, widened to a minimum band when volatility is (near) zero.
//! - Target: the distribution median `P * exp(mu)`, clamped into the range.
//! - Bullish probability: `P(P_T >= P) = Phi(mu / sigma) = Phi(S * momentum_drift)`,
//!   measured against the current price. Taking the limit form keeps it
//!   continuous as `sigma -> 0`.

use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::config::WatchlistConfig;
use crate::error::{WatchlistError, WatchlistResult};

/// Forecast for one instrument at the configured horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeForecast {
    pub range_low: f64,
    pub range_high: f64,
    pub target_price: f64,
    pub bullish_probability: f64,
}

impl RangeForecast {
    pub fn width(&self) -> f64 {
        self.range_high - self.range_low
    }
}

/// Stateless, deterministic forecaster.
#[derive(Debug, Clone)]
pub struct RangeBiasModel {
    standard: Normal,
    z: f64,
    momentum_drift: f64,
    min_band_fraction: f64,
}

impl RangeBiasModel {
    pub fn new(
        confidence_level: f64,
        momentum_drift: f64,
        min_band_fraction: f64,
    ) -> WatchlistResult<Self> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(WatchlistError::InvalidConfig(format!(
                "confidence_level must lie strictly between 0 and 1, got {}",
                confidence_level
            )));
        }
        if !(momentum_drift.is_finite() && momentum_drift >= 0.0) {
            return Err(WatchlistError::InvalidConfig(format!(
                "momentum_drift must be finite and non-negative, got {}",
                momentum_drift
            )));
        }
        if !(min_band_fraction > 0.0 && min_band_fraction < 1.0) {
            return Err(WatchlistError::InvalidConfig(format!(
                "min_band_fraction must lie strictly between 0 and 1, got {}",
                min_band_fraction
            )));
        }

        let standard = Normal::new(0.0, 1.0)
            .map_err(|e| WatchlistError::InvalidConfig(e.to_string()))?;
        let z = standard.inverse_cdf(0.5 + confidence_level / 2.0);

        Ok(Self {
            standard,
            z,
            momentum_drift,
            min_band_fraction,
        })
    }

    pub fn from_config(config: &WatchlistConfig) -> WatchlistResult<Self> {
        Self::new(
            config.confidence_level,
            config.momentum_drift,
            config.min_band_fraction,
        )
    }

    /// Half-width of the range in horizon standard deviations.
    pub fn z_score(&self) -> f64 {
        self.z
    }

    /// Forecast range, target and bullish probability.
    ///
    /// `price` must be finite and positive, `sigma` (horizon volatility) finite
    /// and non-negative, `signal` finite and within [-1, 1]. Volatility so large
    /// that the bounds leave the representable range is rejected as
    /// `InvalidData`.
    pub fn forecast(
        &self,
        price: f64,
        sigma: f64,
        signal: f64,
    ) -> Result<RangeForecast, AnalysisError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(AnalysisError::InvalidPrice(price));
        }
        if !signal.is_finite() || !(-1.0..=1.0).contains(&signal) {
            return Err(AnalysisError::InvalidSignal(signal));
        }
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(AnalysisError::InvalidData(format!(
                "volatility must be finite and non-negative, got {}",
                sigma
            )));
        }

        let drift = signal * self.momentum_drift * sigma;
        let median = price * drift.exp();

        let mut range_low = price * (drift - self.z * sigma).exp();
        let mut range_high = price * (drift + self.z * sigma).exp();

        let floor = self.min_band_fraction * price;
        if range_high - range_low < floor {
            // Symmetric in log space around the median with width exactly `floor`:
            // median * (e^h - e^-h) = 2 * median * sinh(h) = floor
            let half = (floor / (2.0 * median)).asinh();
            range_low = median * (-half).exp();
            range_high = median * half.exp();
        }

        if !(range_low > 0.0 && range_high.is_finite() && median.is_finite()) {
            return Err(AnalysisError::InvalidData(format!(
                "volatility {} gives an unrepresentable range [{}, {}]",
                sigma, range_low, range_high
            )));
        }

        let target_price = median.max(range_low).min(range_high);
        let bullish_probability = self.standard.cdf(signal * self.momentum_drift);

        Ok(RangeForecast {
            range_low,
            range_high,
            target_price,
            bullish_probability: bullish_probability.clamp(0.0, 1.0),
        })
    }
}
