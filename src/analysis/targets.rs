use crate::{
    analysis::{FeatureRow, FeatureVector},
    config::FEATURES,
    errors::{VolError, VolResult},
};

/// Fewest targeted examples for which `n / 4` leaves a non-empty test set.
const MIN_SPLIT_EXAMPLES: usize = 4;

/// Features paired with realized volatility `horizon` rows ahead, split
/// chronologically into train and test.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub x: Vec<FeatureVector>,
    pub y: Vec<f64>,
    pub timestamps: Vec<i64>,
    /// Index of the first test example
    pub split: usize,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x_train(&self) -> &[FeatureVector] {
        &self.x[..self.split]
    }

    pub fn x_test(&self) -> &[FeatureVector] {
        &self.x[self.split..]
    }

    pub fn y_train(&self) -> &[f64] {
        &self.y[..self.split]
    }

    pub fn y_test(&self) -> &[f64] {
        &self.y[self.split..]
    }

    pub fn train_timestamps(&self) -> &[i64] {
        &self.timestamps[..self.split]
    }

    pub fn test_timestamps(&self) -> &[i64] {
        &self.timestamps[self.split..]
    }
}

pub struct TargetBuilder;

impl TargetBuilder {
    /// `y[t] = realized_vol[t + horizon]`. The trailing `horizon` rows have
    /// no target and are dropped. The last `min(max_test_rows, n / 4)`
    /// examples form the test set.
    pub fn build(rows: &[FeatureRow], horizon: usize) -> VolResult<TrainingSet> {
        if rows.len() < FEATURES.min_training_rows {
            return Err(VolError::InsufficientData {
                available: rows.len(),
                required: FEATURES.min_training_rows,
            });
        }

        let n = rows.len().saturating_sub(horizon);
        let test_len = FEATURES.max_test_rows.min(n / 4);
        if test_len == 0 {
            return Err(VolError::InsufficientData {
                available: rows.len(),
                required: horizon + MIN_SPLIT_EXAMPLES,
            });
        }

        let (x, timestamps): (Vec<FeatureVector>, Vec<i64>) = rows[..n]
            .iter()
            .map(|row| (row.features, row.timestamp_ms))
            .unzip();
        let y: Vec<f64> = rows[horizon..]
            .iter()
            .map(|row| row.features.realized_vol)
            .collect();

        let split = n - test_len;

        log::info!(
            "Training set: {} examples ({} train / {} test), horizon {}",
            n,
            split,
            test_len,
            horizon
        );

        Ok(TrainingSet {
            x,
            y,
            timestamps,
            split,
        })
    }
}
