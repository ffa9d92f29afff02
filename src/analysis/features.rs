//! Price-ratio volatility features.
//!
//! Both pipelines derive their inputs here:
//!
//! 1. Inner-join the two series on open time, keeping each leg's open price.
//! 2. `ratio[t] = open_b[t] / open_a[t]`.
//! 3. `returns[t] = 100 * (ratio[t] / ratio[t-1] - 1)`; the first row has no return.
//! 4. `realized_vol` is the sample std-dev of a 5-return window, `returns_squared`
//!    the square of the window's last return.
//!
//! Inference takes the window ending at the latest return; training rolls it
//! over the whole history. Both go through [`window_features`], so the last
//! training row and the live vector are bit-identical for the same input.

use {
    crate::{
        config::FEATURES,
        domain::PriceSeries,
        errors::{VolError, VolResult},
        utils::{pct_returns, rolling_sample_std_dev, sample_std_dev},
    },
    serde::{Deserialize, Serialize},
    std::collections::HashMap,
};

#[cfg(debug_assertions)]
use crate::config::DF;

/// The model's input row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub realized_vol: f64,
    pub returns_squared: f64,
}

impl FeatureVector {
    pub fn new(realized_vol: f64, returns_squared: f64) -> Self {
        Self {
            realized_vol,
            returns_squared,
        }
    }

    /// Column order the model was trained with.
    pub fn to_array(&self) -> [f64; 2] {
        [self.realized_vol, self.returns_squared]
    }

    fn ensure_finite(self) -> VolResult<Self> {
        if !self.realized_vol.is_finite() {
            return Err(VolError::NaNFeature {
                feature: "realized_vol",
            });
        }
        if !self.returns_squared.is_finite() {
            return Err(VolError::NaNFeature {
                feature: "returns_squared",
            });
        }
        Ok(self)
    }
}

/// A training feature row, stamped with the open time of its latest return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub timestamp_ms: i64,
    pub features: FeatureVector,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedRow {
    pub timestamp_ms: i64,
    pub open_a: f64,
    pub open_b: f64,
}

/// Inner join of two series on timestamp, ascending.
#[derive(Debug, Clone)]
pub struct AlignedPricePair {
    pub rows: Vec<AlignedRow>,
}

impl AlignedPricePair {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn price_ratios(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.open_b / r.open_a).collect()
    }

    pub fn returns(&self) -> Vec<f64> {
        pct_returns(&self.price_ratios(), FEATURES.return_scale)
    }
}

fn square(r: f64) -> f64 {
    r * r
}

/// Features for a window of returns that ends at the window's last element.
fn window_features(window: &[f64]) -> FeatureVector {
    let latest = window.last().copied().unwrap_or(f64::NAN);
    FeatureVector::new(sample_std_dev(window), square(latest))
}

pub struct FeatureBuilder;

impl FeatureBuilder {
    /// Inner join on open time keeping each leg's open price.
    pub fn align(series_a: &PriceSeries, series_b: &PriceSeries) -> AlignedPricePair {
        let opens_a: HashMap<i64, f64> = series_a
            .candles()
            .iter()
            .map(|c| (c.timestamp_ms, c.open_price))
            .collect();

        // Series are already sorted, so walking B keeps the join ascending.
        let rows = series_b
            .candles()
            .iter()
            .filter_map(|b| {
                opens_a.get(&b.timestamp_ms).map(|&open_a| AlignedRow {
                    timestamp_ms: b.timestamp_ms,
                    open_a,
                    open_b: b.open_price,
                })
            })
            .collect();

        AlignedPricePair { rows }
    }

    /// Live features from the latest window.
    pub fn build(series_a: &PriceSeries, series_b: &PriceSeries) -> VolResult<FeatureVector> {
        let aligned = Self::align(series_a, series_b);
        if aligned.len() < FEATURES.min_aligned_rows {
            return Err(VolError::InsufficientData {
                available: aligned.len(),
                required: FEATURES.min_aligned_rows,
            });
        }

        let returns = aligned.returns();
        if returns.len() < FEATURES.inference_tail {
            return Err(VolError::InsufficientData {
                available: returns.len(),
                required: FEATURES.inference_tail,
            });
        }

        let recent = &returns[returns.len() - FEATURES.inference_tail..];
        let window = &recent[recent.len().saturating_sub(FEATURES.vol_window)..];
        let features = window_features(window).ensure_finite()?;

        #[cfg(debug_assertions)]
        if DF.log_features {
            log::info!(
                "{}/{} features: realized_vol={:.6} returns_squared={:.6}",
                series_a.symbol(),
                series_b.symbol(),
                features.realized_vol,
                features.returns_squared
            );
        }

        Ok(features)
    }

    /// Training features over the whole joined history. The first
    /// `vol_window - 1` returns have no full window and are dropped.
    pub fn build_series(
        series_a: &PriceSeries,
        series_b: &PriceSeries,
    ) -> VolResult<Vec<FeatureRow>> {
        let aligned = Self::align(series_a, series_b);
        log::info!("Merged data: {} aligned rows", aligned.len());
        if aligned.len() < FEATURES.min_aligned_rows {
            return Err(VolError::InsufficientData {
                available: aligned.len(),
                required: FEATURES.min_aligned_rows,
            });
        }

        let returns = aligned.returns();
        let window = FEATURES.vol_window;
        let rolling_vol = rolling_sample_std_dev(&returns, window);

        rolling_vol
            .iter()
            .enumerate()
            .map(|(i, &realized_vol)| {
                let return_idx = i + window - 1;
                // returns[k] belongs to aligned row k + 1
                let timestamp_ms = aligned.rows[return_idx + 1].timestamp_ms;
                let features =
                    FeatureVector::new(realized_vol, square(returns[return_idx])).ensure_finite()?;
                Ok(FeatureRow {
                    timestamp_ms,
                    features,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{daily_series, series, wavy_price};

    fn pair(len: usize) -> (PriceSeries, PriceSeries) {
        let a = series("LINKUSDT", daily_series(19_000, len, |i| wavy_price(15.0, i)));
        let b = series("ETHUSDT", daily_series(19_000, len, |i| wavy_price(2500.0, i + 3)));
        (a, b)
    }

    #[test]
    fn align_is_an_inner_join() {
        let a = series("A", daily_series(100, 10, |i| 1.0 + i as f64));
        let b = series("B", daily_series(105, 10, |i| 10.0 + i as f64));
        let aligned = FeatureBuilder::align(&a, &b);
        assert_eq!(aligned.len(), 5);
        assert_eq!(aligned.rows[0].open_a, 6.0);
        assert_eq!(aligned.rows[0].open_b, 10.0);
        assert!(aligned.rows.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
    }

    #[test]
    fn live_features_are_finite_and_non_negative() {
        for len in [15, 16, 20, 30, 90] {
            let (a, b) = pair(len);
            let features = FeatureBuilder::build(&a, &b).unwrap();
            assert!(features.realized_vol.is_finite());
            assert!(features.returns_squared.is_finite());
            assert!(features.realized_vol >= 0.0);
            assert!(features.returns_squared >= 0.0);
        }
    }

    #[test]
    fn live_features_match_hand_computation() {
        let (a, b) = pair(20);
        let aligned = FeatureBuilder::align(&a, &b);
        let ratios: Vec<f64> = aligned.rows.iter().map(|r| r.open_b / r.open_a).collect();
        let returns: Vec<f64> = ratios.windows(2).map(|w| 100.0 * (w[1] / w[0] - 1.0)).collect();
        let last5 = &returns[returns.len() - 5..];
        let mean = last5.iter().sum::<f64>() / 5.0;
        let var = last5.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 4.0;

        let features = FeatureBuilder::build(&a, &b).unwrap();
        assert!((features.realized_vol - var.sqrt()).abs() < 1e-9);
        assert!((features.returns_squared - returns[returns.len() - 1].powi(2)).abs() < 1e-9);
    }

    #[test]
    fn too_few_aligned_rows_is_insufficient() {
        let (a, b) = pair(14);
        let err = FeatureBuilder::build(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            VolError::InsufficientData {
                available: 14,
                required: 15
            }
        ));
    }

    #[test]
    fn series_with_too_few_aligned_rows_is_insufficient() {
        let (a, b) = pair(8);
        let err = FeatureBuilder::build_series(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            VolError::InsufficientData {
                available: 8,
                required: 15
            }
        ));

        let (a, b) = pair(15);
        assert_eq!(FeatureBuilder::build_series(&a, &b).unwrap().len(), 10);
    }

    #[test]
    fn constant_ratio_gives_zero_vol_not_nan() {
        let a = series("LINKUSDT", daily_series(19_000, 20, |i| wavy_price(15.0, i)));
        let b = series("ETHUSDT", daily_series(19_000, 20, |i| 2.0 * wavy_price(15.0, i)));
        let features = FeatureBuilder::build(&a, &b).unwrap();
        assert_eq!(features.realized_vol, 0.0);
        assert_eq!(features.returns_squared, 0.0);
    }

    #[test]
    fn zero_price_surfaces_as_nan_feature() {
        let a = series("LINKUSDT", daily_series(19_000, 20, |i| if i == 19 { 0.0 } else { 15.0 }));
        let b = series("ETHUSDT", daily_series(19_000, 20, |_| 2500.0));
        let err = FeatureBuilder::build(&a, &b).unwrap_err();
        assert!(matches!(err, VolError::NaNFeature { .. }));
    }

    #[test]
    fn series_drops_leading_partial_windows() {
        let (a, b) = pair(30);
        let rows = FeatureBuilder::build_series(&a, &b).unwrap();
        // 30 aligned -> 29 returns -> 25 full windows
        assert_eq!(rows.len(), 25);
        // first full window ends at return 4, i.e. aligned row 5
        assert_eq!(rows[0].timestamp_ms, a.candles()[5].timestamp_ms);
        assert_eq!(rows.last().unwrap().timestamp_ms, a.last_timestamp_ms().unwrap());
    }

    #[test]
    fn training_and_inference_windows_agree() {
        for len in [15, 21, 64, 300] {
            let (a, b) = pair(len);
            let live = FeatureBuilder::build(&a, &b).unwrap();
            let last_row = FeatureBuilder::build_series(&a, &b).unwrap().pop().unwrap();
            assert_eq!(live, last_row.features);
        }
    }
}
