//! Feature engineering constants shared by training and inference.
//! Changing any of these invalidates every exported model.

pub struct FeatureConfig {
    /// Rolling window for realized volatility (sample std-dev, ddof = 1)
    pub vol_window: usize,
    /// Trailing returns handed to the inference window
    pub inference_tail: usize,
    /// Periods ahead the training target is shifted
    pub horizon: usize,
    /// Returns are expressed in percent
    pub return_scale: f64,
    /// Minimum aligned rows before inference features are attempted
    pub min_aligned_rows: usize,
    /// Minimum feature rows before a training set is built
    pub min_training_rows: usize,
    /// Upper bound on the held-out tail
    pub max_test_rows: usize,
    /// Used for annualizing and for the test-set cap
    pub trading_days_per_year: f64,
    /// Width of a feature row
    pub width: usize,
}

pub const FEATURES: FeatureConfig = FeatureConfig {
    vol_window: 5,
    inference_tail: 10,
    horizon: 5,
    return_scale: 100.0,
    min_aligned_rows: 15,
    min_training_rows: 100,
    max_test_rows: 252,
    trading_days_per_year: 252.0,
    width: 2,
};
