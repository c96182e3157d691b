//! Momentum signal derived from recent returns, used when the data provider
//! does not supply one.

use analysis_core::{finite_values, mean};
use statrs::statistics::Statistics;

/// Trend signal in [-1, 1] from the last `lookback` finite returns.
///
/// The t-statistic of the mean return is squashed through `tanh`, so a
/// persistent drift saturates towards +/-1 while noise stays near 0.
/// A series with no dispersion reports the sign of its mean.
pub fn trend_signal(returns: &[f64], lookback: usize) -> f64 {
    let finite = finite_values(returns);
    let window = &finite[finite.len().saturating_sub(lookback)..];
    if window.len() < 2 {
        return 0.0;
    }

    let avg = mean(window);
    let sd = window.std_dev();

    if !sd.is_finite() || sd <= f64::EPSILON {
        return if avg > 0.0 {
            1.0
        } else if avg < 0.0 {
            -1.0
        } else {
            0.0
        };
    }

    let t_stat = avg / (sd / (window.len() as f64).sqrt());
    t_stat.tanh().clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_drift_is_neutral() {
        let returns: Vec<f64> = (0..40)
            .map(|i| if i % 2 == 0 { 0.02 } else { -0.02 })
            .collect();
        assert_eq!(trend_signal(&returns, 20), 0.0);
    }

    #[test]
    fn test_uptrend_is_positive_and_bounded() {
        let returns: Vec<f64> = (0..30).map(|i| 0.01 + 0.002 * (i % 3) as f64).collect();
        let signal = trend_signal(&returns, 20);
        assert!(signal > 0.9);
        assert!(signal <= 1.0);
    }

    #[test]
    fn test_downtrend_is_negative() {
        let returns: Vec<f64> = (0..30).map(|i| -0.01 - 0.002 * (i % 3) as f64).collect();
        assert!(trend_signal(&returns, 20) < -0.9);
    }

    #[test]
    fn test_only_recent_window_counts() {
        let mut returns: Vec<f64> = vec![-0.05; 50];
        returns.extend((0..10).map(|i| 0.01 + 0.001 * (i % 2) as f64));
        assert!(trend_signal(&returns, 10) > 0.0);
    }

    #[test]
    fn test_constant_and_short_series() {
        assert_eq!(trend_signal(&[0.01; 10], 5), 1.0);
        assert_eq!(trend_signal(&[0.0; 10], 5), 0.0);
        assert_eq!(trend_signal(&[0.03], 5), 0.0);
        assert_eq!(trend_signal(&[f64::NAN, 0.01], 5), 0.0);
    }
}
