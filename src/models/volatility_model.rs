use {
    crate::{
        analysis::FeatureVector,
        errors::VolResult,
        models::{frozen::FrozenModel, network::Mlp},
    },
    std::{path::Path, sync::Arc},
    tokio::sync::{RwLock, RwLockReadGuard},
};

/// Anything that maps a feature vector to a 5-period volatility forecast.
#[derive(Debug)]
pub enum VolatilityModel {
    /// In-memory network straight out of the trainer
    Trainable(Mlp),
    /// Exported ONNX model run by ONNX Runtime
    Frozen(FrozenModel),
}

impl VolatilityModel {
    pub fn load(path: &Path) -> VolResult<Self> {
        Ok(Self::Frozen(FrozenModel::load(path)?))
    }

    pub fn predict(&self, features: &FeatureVector) -> VolResult<f64> {
        match self {
            Self::Trainable(network) => Ok(network.predict(features)),
            Self::Frozen(session) => session.predict(features),
        }
    }

    pub fn predict_batch(&self, rows: &[FeatureVector]) -> VolResult<Vec<f64>> {
        match self {
            Self::Trainable(network) => Ok(network.predict_batch(rows)),
            Self::Frozen(session) => session.predict_batch(rows),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Trainable(_) => "trainable",
            Self::Frozen(_) => "frozen",
        }
    }
}

/// Process-wide shared model. Predictions hold a read guard; swapping the
/// model waits for them and takes the write guard.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    inner: Arc<RwLock<VolatilityModel>>,
}

impl ModelHandle {
    pub fn new(model: VolatilityModel) -> Self {
        Self {
            inner: Arc::new(RwLock::new(model)),
        }
    }

    pub fn load(path: &Path) -> VolResult<Self> {
        Ok(Self::new(VolatilityModel::load(path)?))
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, VolatilityModel> {
        self.inner.read().await
    }

    pub async fn replace(&self, model: VolatilityModel) {
        *self.inner.write().await = model;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelArtifact;

    fn frozen(net: &Mlp) -> FrozenModel {
        FrozenModel::from_artifact(&ModelArtifact::export(net, 2).unwrap()).unwrap()
    }

    #[test]
    fn frozen_and_trainable_agree() {
        let net = Mlp::new(2, &[32, 16], 9);
        let served = frozen(&net);
        let features = FeatureVector::new(2.5, 4.0);

        let live = VolatilityModel::Trainable(net).predict(&features).unwrap();
        let frozen = VolatilityModel::Frozen(served).predict(&features).unwrap();
        assert!((live - frozen).abs() < 1e-3);
    }

    #[tokio::test]
    async fn replace_swaps_the_shared_model() {
        let handle = ModelHandle::new(VolatilityModel::Trainable(Mlp::new(2, &[4], 1)));
        let clone = handle.clone();
        assert_eq!(clone.read().await.kind(), "trainable");

        handle
            .replace(VolatilityModel::Frozen(frozen(&Mlp::new(2, &[4], 2))))
            .await;
        assert_eq!(clone.read().await.kind(), "frozen");
    }
}
