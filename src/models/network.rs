//! Small fully connected regressor.
//!
//! `input -> [Dense + ReLU]* -> Dense -> output`, f64 throughout. Layers are
//! initialised from `U(-1/sqrt(fan_in), 1/sqrt(fan_in))` with a seeded RNG so a
//! training run is reproducible from its seed.

use {
    crate::{analysis::FeatureVector, config::FEATURES},
    ndarray::{Array1, Array2, Axis},
    ndarray_rand::{RandomExt, rand_distr::Uniform},
    rand::{SeedableRng, rngs::StdRng},
};

/// `z = x . weights + biases`, optionally followed by ReLU.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    /// (input_size, output_size)
    pub(crate) weights: Array2<f64>,
    pub(crate) biases: Array1<f64>,
    pub(crate) relu: bool,
}

impl DenseLayer {
    fn new(input_size: usize, output_size: usize, relu: bool, rng: &mut StdRng) -> Self {
        let bound = 1.0 / (input_size as f64).sqrt();
        let dist = Uniform::new(-bound, bound);
        Self {
            weights: Array2::random_using((input_size, output_size), dist, rng),
            biases: Array1::random_using(output_size, dist, rng),
            relu,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn biases(&self) -> &Array1<f64> {
        &self.biases
    }

    pub fn has_relu(&self) -> bool {
        self.relu
    }

    fn linear(&self, input: &Array2<f64>) -> Array2<f64> {
        input.dot(&self.weights) + &self.biases
    }
}

/// Gradients of the loss for one layer.
#[derive(Debug, Clone)]
pub struct LayerGradients {
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mlp {
    layers: Vec<DenseLayer>,
}

impl Mlp {
    /// One ReLU layer per entry of `hidden`, then a single linear output unit.
    pub fn new(input_width: usize, hidden: &[usize], seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut fan_in = input_width;
        for &units in hidden {
            layers.push(DenseLayer::new(fan_in, units, true, &mut rng));
            fan_in = units;
        }
        layers.push(DenseLayer::new(fan_in, 1, false, &mut rng));
        Self { layers }
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    pub fn input_width(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_width(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    pub fn num_parameters(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    /// (batch, input_width) -> (batch, output_width)
    pub fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        self.layers.iter().fold(input.clone(), |x, layer| {
            let z = layer.linear(&x);
            if layer.relu { z.mapv(relu) } else { z }
        })
    }

    /// Mean-squared-error loss and its gradients for a full batch.
    /// `target` is (batch, output_width).
    pub fn mse_gradients(
        &self,
        input: &Array2<f64>,
        target: &Array2<f64>,
    ) -> (f64, Vec<LayerGradients>) {
        // Inputs to each layer, and each layer's pre-activation
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        activations.push(input.clone());
        for layer in &self.layers {
            let z = layer.linear(&activations[activations.len() - 1]);
            let a = if layer.relu { z.mapv(relu) } else { z.clone() };
            pre_activations.push(z);
            activations.push(a);
        }

        let output = &activations[self.layers.len()];
        let error = output - target;
        let n = error.len().max(1) as f64;
        let loss = error.mapv(|e| e * e).sum() / n;

        let mut grad = error * (2.0 / n);
        let mut gradients = Vec::with_capacity(self.layers.len());
        for (idx, layer) in self.layers.iter().enumerate().rev() {
            if layer.relu {
                let z = &pre_activations[idx];
                grad.zip_mut_with(z, |g, &z| {
                    if z <= 0.0 {
                        *g = 0.0
                    }
                });
            }
            let weights = activations[idx].t().dot(&grad);
            let biases = grad.sum_axis(Axis(0));
            grad = grad.dot(&layer.weights.t());
            gradients.push(LayerGradients { weights, biases });
        }
        gradients.reverse();

        (loss, gradients)
    }

    pub fn predict(&self, features: &FeatureVector) -> f64 {
        self.predict_batch(std::slice::from_ref(features))[0]
    }

    pub fn predict_batch(&self, rows: &[FeatureVector]) -> Vec<f64> {
        self.forward(&features_to_matrix(rows)).column(0).to_vec()
    }
}

fn relu(v: f64) -> f64 {
    v.max(0.0)
}

/// Stacks feature rows into a (rows, width) matrix.
pub fn features_to_matrix(rows: &[FeatureVector]) -> Array2<f64> {
    let width = FEATURES.width;
    let flat: Vec<f64> = rows.iter().flat_map(|f| f.to_array()).collect();
    Array2::from_shape_vec((rows.len(), width), flat)
        .unwrap_or_else(|_| Array2::zeros((0, width)))
}

/// Column vector of targets.
pub fn targets_to_matrix(targets: &[f64]) -> Array2<f64> {
    Array2::from_shape_fn((targets.len(), 1), |(i, _)| targets[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_shapes_follow_hidden_sizes() {
        let net = Mlp::new(2, &[128, 64], 42);
        let shapes: Vec<(usize, usize)> = net.layers().iter().map(|l| l.weights().dim()).collect();
        assert_eq!(shapes, vec![(2, 128), (128, 64), (64, 1)]);
        assert_eq!(net.num_parameters(), 2 * 128 + 128 + 128 * 64 + 64 + 64 + 1);
        assert!(net.layers()[0].has_relu() && !net.layers()[2].has_relu());
    }

    #[test]
    fn init_respects_fan_in_bound_and_seed() {
        let net = Mlp::new(2, &[128, 64], 7);
        for layer in net.layers() {
            let bound = 1.0 / (layer.input_size() as f64).sqrt();
            assert!(layer.weights().iter().all(|w| w.abs() <= bound));
            assert!(layer.biases().iter().all(|b| b.abs() <= bound));
        }
        assert_eq!(net, Mlp::new(2, &[128, 64], 7));
        assert_ne!(net, Mlp::new(2, &[128, 64], 8));
    }

    #[test]
    fn forward_matches_batch_size() {
        let net = Mlp::new(2, &[8], 1);
        let out = net.forward(&Array2::ones((5, 2)));
        assert_eq!(out.dim(), (5, 1));
    }

    #[test]
    fn gradients_match_finite_differences() {
        let net = Mlp::new(2, &[4, 3], 3);
        let x = ndarray::arr2(&[[0.5, 1.5], [2.0, -1.0], [1.0, 0.25]]);
        let y = ndarray::arr2(&[[1.0], [0.0], [2.0]]);
        let (_, grads) = net.mse_gradients(&x, &y);

        let h = 1e-6;
        for (layer_idx, layer_grads) in grads.iter().enumerate() {
            let mut plus = net.clone();
            plus.layers_mut()[layer_idx].biases[0] += h;
            let mut minus = net.clone();
            minus.layers_mut()[layer_idx].biases[0] -= h;
            let numeric = (plus.mse_gradients(&x, &y).0 - minus.mse_gradients(&x, &y).0) / (2.0 * h);
            assert!(
                (numeric - layer_grads.biases[0]).abs() < 1e-4,
                "layer {layer_idx}: numeric {numeric} vs analytic {}",
                layer_grads.biases[0]
            );
        }
    }

    #[test]
    fn predict_agrees_with_forward() {
        let net = Mlp::new(2, &[16, 8], 5);
        let rows = [FeatureVector::new(1.2, 0.3), FeatureVector::new(3.4, 9.1)];
        let batch = net.predict_batch(&rows);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], net.predict(&rows[1]));
    }
}
