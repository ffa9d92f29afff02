mod artifact;
mod frozen;
mod network;
mod onnx;
mod optimizer;
mod prediction;
mod volatility_model;

pub use {
    artifact::ModelArtifact,
    frozen::FrozenModel,
    network::{DenseLayer, LayerGradients, Mlp, features_to_matrix, targets_to_matrix},
    onnx::{Dimension, GraphProto, ModelProto, NodeProto, TensorProto, ValueInfoProto},
    optimizer::RmsProp,
    prediction::{PredictionResult, annualize},
    volatility_model::{ModelHandle, VolatilityModel},
};
