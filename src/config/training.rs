//! Regressor shape and optimizer settings.

#[derive(Debug, Clone, Copy)]
pub struct RmsPropConfig {
    pub learning_rate: f64,
    pub alpha: f64,
    pub epsilon: f64,
}

/// Stage schedule: `stages` entries of `start, start + step, ...`
pub struct EpochSchedule {
    pub start: usize,
    pub step: usize,
    pub stages: usize,
}

impl EpochSchedule {
    pub fn epochs(&self) -> Vec<usize> {
        (0..self.stages).map(|i| self.start + i * self.step).collect()
    }
}

pub struct TrainingConfig {
    pub hidden_layers: &'static [usize],
    pub optimizer: RmsPropConfig,
    pub epoch_schedule: EpochSchedule,
    /// RMSE is reported on targets divided by this (undoes the percent scaling)
    pub rmse_scale: f64,
    pub seed: u64,
    /// How far back the training download reaches
    pub history_days: i64,
}

pub const TRAINING: TrainingConfig = TrainingConfig {
    hidden_layers: &[128, 64],
    optimizer: RmsPropConfig {
        learning_rate: 0.01,
        alpha: 0.99,
        epsilon: 1e-8,
    },
    epoch_schedule: EpochSchedule {
        start: 100,
        step: 4,
        stages: 4,
    },
    rmse_scale: 100.0,
    seed: 42,
    history_days: 2000,
};
