//! Return-series helpers shared by providers and estimators.

use crate::Bar;

/// Simple period-over-period returns from a chronological close series.
///
/// A period whose prior close is not a positive finite number yields `NaN`,
/// leaving it to the estimator to treat as missing.
pub fn returns_from_closes(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| {
            if w[0].is_finite() && w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Simple returns from bar closes.
pub fn returns_from_bars(bars: &[Bar]) -> Vec<f64> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    returns_from_closes(&closes)
}

/// Drop NaN and infinite observations, preserving order.
pub fn finite_values(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| x.is_finite()).collect()
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Utc;

    #[test]
    fn test_returns_from_closes() {
        let r = returns_from_closes(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert_relative_eq!(r[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(r[1], -0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_bad_prior_close_is_nan() {
        let r = returns_from_closes(&[0.0, 10.0, 11.0]);
        assert!(r[0].is_nan());
        assert_relative_eq!(r[1], 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_returns_from_bars() {
        let bars: Vec<Bar> = [50.0, 55.0]
            .iter()
            .map(|&close| Bar {
                timestamp: Utc::now(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
                vwap: None,
            })
            .collect();
        let r = returns_from_bars(&bars);
        assert_eq!(r.len(), 1);
        assert_relative_eq!(r[0], 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_finite_values_and_mean() {
        let data = [1.0, f64::NAN, 3.0, f64::INFINITY];
        let finite = finite_values(&data);
        assert_eq!(finite, vec![1.0, 3.0]);
        assert_relative_eq!(mean(&finite), 2.0);
        assert_eq!(mean(&[]), 0.0);
    }
}
