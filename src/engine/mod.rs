mod prediction;
mod trainer;
mod training_pipeline;

pub use {
    prediction::PredictionService,
    trainer::{StageReport, Trainer, TrainingReport},
    training_pipeline::{TrainingData, TrainingOptions, TrainingOutcome, TrainingPipeline},
};
