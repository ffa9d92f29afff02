// Feature engineering and training targets
mod features;
mod targets;

pub use {
    features::{AlignedPricePair, AlignedRow, FeatureBuilder, FeatureRow, FeatureVector},
    targets::{TargetBuilder, TrainingSet},
};
