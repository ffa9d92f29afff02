use statrs::statistics::Statistics;

/// Sample standard deviation (ddof = 1). NaN for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    values.std_dev()
}

/// Rolling sample std-dev. Entry `i` covers `values[i + 1 - window..=i]`;
/// the leading `window - 1` positions have no full window and are omitted,
/// so the output has `values.len() - window + 1` entries.
pub fn rolling_sample_std_dev(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values.windows(window).map(sample_std_dev).collect()
}

/// Percentage simple returns: `scale * (x[t] / x[t-1] - 1)` for t >= 1.
pub fn pct_returns(values: &[f64], scale: f64) -> Vec<f64> {
    values
        .windows(2)
        .map(|pair| scale * (pair[1] / pair[0] - 1.0))
        .collect()
}

/// Root-mean-squared error after dividing both sides by `scale`.
pub fn scaled_rmse(actual: &[f64], predicted: &[f64], scale: f64) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return f64::NAN;
    }
    let sum_sq: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| {
            let diff = a / scale - p / scale;
            diff * diff
        })
        .sum();
    (sum_sq / actual.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        // mean 3, squared deviations sum to 10, / 4
        let sd = sample_std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((sd - 2.5_f64.sqrt()).abs() < 1e-12);
        assert!(sample_std_dev(&[1.0]).is_nan());
    }

    #[test]
    fn rolling_window_drops_leading_partial_windows() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let rolled = rolling_sample_std_dev(&values, 5);
        assert_eq!(rolled.len(), 3);
        for sd in rolled {
            assert!((sd - 2.5_f64.sqrt()).abs() < 1e-12);
        }
    }

    #[test]
    fn pct_returns_are_scaled() {
        let r = pct_returns(&[100.0, 110.0, 99.0], 100.0);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 10.0).abs() < 1e-9);
        assert!((r[1] + 10.0).abs() < 1e-9);
    }

    #[test]
    fn rmse_is_scaled() {
        let rmse = scaled_rmse(&[100.0, 200.0], &[200.0, 100.0], 100.0);
        assert!((rmse - 1.0).abs() < 1e-12);
    }
}
