use crate::{
    analysis::TrainingSet,
    config::{FEATURES, RmsPropConfig, TRAINING},
    errors::{VolError, VolResult},
    models::{Mlp, RmsProp, features_to_matrix, targets_to_matrix},
    utils::scaled_rmse,
};

#[cfg(debug_assertions)]
use crate::config::DF;

/// Diagnostics after one training stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: usize,
    pub epochs: usize,
    pub cumulative_epochs: usize,
    /// Full-batch MSE on the training split at the stage's last epoch
    pub train_loss: f64,
    /// Held-out RMSE on targets scaled back out of percent
    pub test_rmse: f64,
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub stages: Vec<StageReport>,
    pub train_examples: usize,
    pub test_examples: usize,
    pub seed: u64,
}

impl TrainingReport {
    pub fn total_epochs(&self) -> usize {
        self.stages.last().map_or(0, |s| s.cumulative_epochs)
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.stages.last().map(|s| s.train_loss)
    }

    pub fn final_test_rmse(&self) -> Option<f64> {
        self.stages.last().map(|s| s.test_rmse)
    }
}

/// Full-batch MSE fitting with RMSprop, in stages. Stages continue from the
/// previous stage's weights; each one ends with a held-out RMSE check.
pub struct Trainer {
    hidden_layers: Vec<usize>,
    stages: Vec<usize>,
    optimizer: RmsPropConfig,
    seed: u64,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(TRAINING.seed)
    }
}

impl Trainer {
    pub fn new(seed: u64) -> Self {
        Self {
            hidden_layers: TRAINING.hidden_layers.to_vec(),
            stages: TRAINING.epoch_schedule.epochs(),
            optimizer: TRAINING.optimizer,
            seed,
        }
    }

    pub fn with_hidden_layers(mut self, hidden_layers: Vec<usize>) -> Self {
        self.hidden_layers = hidden_layers;
        self
    }

    pub fn with_stages(mut self, stages: Vec<usize>) -> Self {
        self.stages = stages;
        self
    }

    pub fn fit(&self, set: &TrainingSet) -> VolResult<(Mlp, TrainingReport)> {
        if set.x_train().is_empty() {
            return Err(VolError::InsufficientData {
                available: 0,
                required: 1,
            });
        }

        let x_train = features_to_matrix(set.x_train());
        let y_train = targets_to_matrix(set.y_train());

        let mut network = Mlp::new(FEATURES.width, &self.hidden_layers, self.seed);
        let mut optimizer = RmsProp::new(&self.optimizer);
        log::info!(
            "🧠 Training {}-{:?}-1 network ({} parameters) on {} examples, seed {}",
            FEATURES.width,
            self.hidden_layers,
            network.num_parameters(),
            set.x_train().len(),
            self.seed
        );

        let mut stages = Vec::with_capacity(self.stages.len());
        let mut cumulative_epochs = 0;
        for (stage, &epochs) in self.stages.iter().enumerate() {
            let mut train_loss = f64::NAN;
            for _epoch in 0..epochs {
                let (loss, gradients) = network.mse_gradients(&x_train, &y_train);
                optimizer.step(&mut network, &gradients);
                train_loss = loss;

                #[cfg(debug_assertions)]
                if DF.log_epoch_loss {
                    log::debug!("stage {} epoch {}: loss {:.6}", stage + 1, _epoch + 1, loss);
                }
            }
            cumulative_epochs += epochs;

            let predictions = network.predict_batch(set.x_test());
            let test_rmse = scaled_rmse(set.y_test(), &predictions, TRAINING.rmse_scale);
            log::info!(
                "Stage {}: {} epochs ({} total), loss {:.6}, test RMSE {:.6}",
                stage + 1,
                epochs,
                cumulative_epochs,
                train_loss,
                test_rmse
            );

            stages.push(StageReport {
                stage: stage + 1,
                epochs,
                cumulative_epochs,
                train_loss,
                test_rmse,
            });
        }

        let report = TrainingReport {
            stages,
            train_examples: set.x_train().len(),
            test_examples: set.x_test().len(),
            seed: self.seed,
        };
        Ok((network, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::{FeatureRow, FeatureVector, TargetBuilder},
        models::{FrozenModel, ModelArtifact},
    };

    fn synthetic_set(rows: usize) -> TrainingSet {
        let rows: Vec<FeatureRow> = (0..rows)
            .map(|i| {
                let vol = 1.0 + (i as f64 * 0.37).sin().abs() * 3.0;
                FeatureRow {
                    timestamp_ms: i as i64,
                    features: FeatureVector::new(vol, vol * vol * 0.5),
                }
            })
            .collect();
        TargetBuilder::build(&rows, FEATURES.horizon).unwrap()
    }

    #[test]
    fn stages_accumulate_epochs() {
        let set = synthetic_set(150);
        let (_, report) = Trainer::new(1)
            .with_hidden_layers(vec![8])
            .with_stages(vec![3, 5, 7])
            .fit(&set)
            .unwrap();

        let cumulative: Vec<usize> = report.stages.iter().map(|s| s.cumulative_epochs).collect();
        assert_eq!(cumulative, vec![3, 8, 15]);
        assert_eq!(report.total_epochs(), 15);
        assert_eq!(report.train_examples + report.test_examples, set.len());
        assert!(report.stages.iter().all(|s| s.test_rmse.is_finite()));
    }

    #[test]
    fn training_reduces_loss() {
        let set = synthetic_set(200);
        let trainer = Trainer::new(4).with_hidden_layers(vec![16]);
        let (_, short) = trainer.with_stages(vec![1]).fit(&set).unwrap();

        let trainer = Trainer::new(4).with_hidden_layers(vec![16]);
        let (_, long) = trainer.with_stages(vec![1, 150]).fit(&set).unwrap();

        assert!(long.final_loss().unwrap() < short.final_loss().unwrap());
    }

    #[test]
    fn same_seed_same_network() {
        let set = synthetic_set(120);
        let fit = |seed| {
            Trainer::new(seed)
                .with_hidden_layers(vec![8])
                .with_stages(vec![10])
                .fit(&set)
                .unwrap()
                .0
        };
        assert_eq!(fit(42), fit(42));
    }

    /// Targets are an exact linear function of the two features.
    fn linear_set(rows: usize) -> (TrainingSet, impl Fn(&FeatureVector) -> f64) {
        let target = |f: &FeatureVector| 0.8 * f.realized_vol + 0.05 * f.returns_squared + 0.5;
        let x: Vec<FeatureVector> = (0..rows)
            .map(|i| {
                let vol = 0.5 + 4.0 * (i as f64 * 0.37).sin().abs();
                let squared = 20.0 * (i as f64 * 0.61).cos().powi(2);
                FeatureVector::new(vol, squared)
            })
            .collect();
        let y = x.iter().map(target).collect();
        let set = TrainingSet {
            timestamps: (0..rows as i64).collect(),
            split: rows - rows / 4,
            x,
            y,
        };
        (set, target)
    }

    #[test]
    fn linear_target_is_learned_and_survives_export() {
        let (set, target) = linear_set(240);
        let (network, report) = Trainer::new(7)
            .with_hidden_layers(vec![16, 8])
            .with_stages(vec![1, 400])
            .fit(&set)
            .unwrap();

        let y = set.y_train();
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let variance = y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / y.len() as f64;
        let first = report.stages[0].train_loss;
        let last = report.final_loss().unwrap();
        assert!(last < first, "loss rose: {first} -> {last}");
        assert!(last < 0.25 * variance, "loss {last} vs target variance {variance}");

        let held_out = set.x_test();
        let fitted = network.predict_batch(held_out);
        let mse = fitted
            .iter()
            .zip(held_out)
            .map(|(p, f)| (p - target(f)).powi(2))
            .sum::<f64>()
            / held_out.len() as f64;
        assert!(mse < 0.5 * variance, "held-out error {mse} vs variance {variance}");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linear.onnx");
        ModelArtifact::export(&network, FEATURES.width)
            .unwrap()
            .save(&path)
            .unwrap();
        let served = FrozenModel::load(&path).unwrap().predict_batch(held_out).unwrap();
        for (s, live) in served.iter().zip(&fitted) {
            assert!((s - live).abs() < 1e-3, "{s} vs {live}");
        }
    }

    #[test]
    fn default_schedule_and_shape() {
        let trainer = Trainer::default();
        assert_eq!(trainer.stages, vec![100, 104, 108, 112]);
        assert_eq!(trainer.hidden_layers, vec![128, 64]);
    }
}
