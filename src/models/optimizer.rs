use {
    crate::{
        config::RmsPropConfig,
        models::network::{LayerGradients, Mlp},
    },
    ndarray::{Array, Array1, Array2, Dimension, Zip},
};

/// RMSprop without momentum or weight decay:
///
/// `v = alpha * v + (1 - alpha) * g^2`, `p -= lr * g / (sqrt(v) + eps)`
pub struct RmsProp {
    learning_rate: f64,
    alpha: f64,
    epsilon: f64,
    /// Running squared-gradient averages, one pair per layer.
    square_avg: Vec<(Array2<f64>, Array1<f64>)>,
}

impl RmsProp {
    pub fn new(config: &RmsPropConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            alpha: config.alpha,
            epsilon: config.epsilon,
            square_avg: Vec::new(),
        }
    }

    /// Apply one update. State is sized lazily from the first call.
    pub fn step(&mut self, network: &mut Mlp, gradients: &[LayerGradients]) {
        if self.square_avg.len() != gradients.len() {
            self.square_avg = gradients
                .iter()
                .map(|g| (Array2::zeros(g.weights.dim()), Array1::zeros(g.biases.len())))
                .collect();
        }

        let (lr, alpha, eps) = (self.learning_rate, self.alpha, self.epsilon);
        for ((layer, grad), (avg_w, avg_b)) in network
            .layers_mut()
            .iter_mut()
            .zip(gradients)
            .zip(self.square_avg.iter_mut())
        {
            rms_update(&mut layer.weights, &grad.weights, avg_w, lr, alpha, eps);
            rms_update(&mut layer.biases, &grad.biases, avg_b, lr, alpha, eps);
        }
    }
}

fn rms_update<D: Dimension>(
    param: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    square_avg: &mut Array<f64, D>,
    lr: f64,
    alpha: f64,
    eps: f64,
) {
    Zip::from(param)
        .and(grad)
        .and(square_avg)
        .for_each(|p, &g, v| {
            *v = alpha * *v + (1.0 - alpha) * g * g;
            *p -= lr * g / (v.sqrt() + eps);
        });
}
