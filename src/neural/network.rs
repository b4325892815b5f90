//! Feed-forward network structure, forward pass and fitness.

use super::activation::fast_sigmoid;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use ndarray::linalg::general_mat_vec_mul;
use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::fmt;

/// Standard deviation of freshly initialised weights and biases
pub const INIT_STD_DEV: f64 = 0.01;

/// Dense feed-forward regression network
///
/// `weights[i]` has shape `(layer_sizes[i + 1], layer_sizes[i])` and
/// `biases[i]` has shape `(layer_sizes[i + 1], 1)`. Hidden layers use
/// [`fast_sigmoid`]; the output layer is linear.
#[derive(Clone, Debug)]
pub struct NeuralNet {
    pub(crate) weights: Vec<Array2<f64>>,
    pub(crate) biases: Vec<Array2<f64>>,
    /// Activations for one row, one buffer per layer boundary (input included)
    buffers: Vec<Array1<f64>>,
    /// Mean squared error from the last call to `fit`
    mse: f64,
}

impl NeuralNet {
    /// Create a network with weights and biases drawn from `N(0, 0.01)`
    pub fn new_random<R: Rng + ?Sized>(layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        validate_layer_sizes(layer_sizes)?;

        let normal = Normal::new(0.0, INIT_STD_DEV)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;

        let mut weights = Vec::with_capacity(layer_sizes.len() - 1);
        let mut biases = Vec::with_capacity(layer_sizes.len() - 1);
        for pair in layer_sizes.windows(2) {
            let (n_in, n_out) = (pair[0], pair[1]);
            weights.push(Array2::from_shape_fn((n_out, n_in), |_| normal.sample(rng)));
            biases.push(Array2::from_shape_fn((n_out, 1), |_| normal.sample(rng)));
        }

        Ok(Self::assemble(weights, biases))
    }

    /// Create a network from explicit matrices
    pub fn from_parts(weights: Vec<Array2<f64>>, biases: Vec<Array2<f64>>) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::InvalidTopology(
                "network needs at least one layer".to_string(),
            ));
        }
        if weights.len() != biases.len() {
            return Err(Error::InvalidTopology(format!(
                "{} weight matrices but {} bias matrices",
                weights.len(),
                biases.len()
            )));
        }
        for (i, (w, b)) in weights.iter().zip(&biases).enumerate() {
            if w.nrows() == 0 || w.ncols() == 0 {
                return Err(Error::InvalidTopology(format!("layer {} is empty", i)));
            }
            if b.dim() != (w.nrows(), 1) {
                return Err(Error::InvalidTopology(format!(
                    "layer {} bias shape {:?} does not match ({}, 1)",
                    i,
                    b.dim(),
                    w.nrows()
                )));
            }
            if i > 0 && w.ncols() != weights[i - 1].nrows() {
                return Err(Error::InvalidTopology(format!(
                    "layer {} expects {} inputs, previous layer has {} outputs",
                    i,
                    w.ncols(),
                    weights[i - 1].nrows()
                )));
            }
        }

        Ok(Self::assemble(weights, biases))
    }

    /// Wrap already validated matrices with fresh zeroed buffers
    pub(crate) fn assemble(weights: Vec<Array2<f64>>, biases: Vec<Array2<f64>>) -> Self {
        let mut buffers = Vec::with_capacity(weights.len() + 1);
        buffers.push(Array1::zeros(weights[0].ncols()));
        for w in &weights {
            buffers.push(Array1::zeros(w.nrows()));
        }

        Self {
            weights,
            biases,
            buffers,
            mse: f64::INFINITY,
        }
    }

    pub fn weights(&self) -> &[Array2<f64>] {
        &self.weights
    }

    pub fn biases(&self) -> &[Array2<f64>] {
        &self.biases
    }

    /// Mean squared error of the most recent `fit`; `INFINITY` before the first one
    #[inline]
    pub fn mse(&self) -> f64 {
        self.mse
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.weights[0].ncols()
    }

    /// Number of weight layers
    #[inline]
    pub fn num_layers(&self) -> usize {
        self.weights.len()
    }

    /// Width of every layer, input and output included
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.weights.len() + 1);
        sizes.push(self.input_dim());
        sizes.extend(self.weights.iter().map(|w| w.nrows()));
        sizes
    }

    /// Total number of parameters (weights + biases)
    pub fn parameter_count(&self) -> usize {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(w, b)| w.len() + b.len())
            .sum()
    }

    /// Check that no weight or bias is NaN/Inf
    pub fn is_valid(&self) -> bool {
        self.weights
            .iter()
            .chain(&self.biases)
            .all(|m| m.iter().all(|v| v.is_finite()))
    }

    /// True when both networks have identically shaped matrices
    pub fn same_topology(&self, other: &Self) -> bool {
        self.weights.len() == other.weights.len()
            && self
                .weights
                .iter()
                .zip(&other.weights)
                .all(|(a, b)| a.dim() == b.dim())
    }

    /// Forward pass for one row of features, returning the scalar output
    ///
    /// Overwrites the internal buffers. Panics if `features` does not match
    /// the input width.
    pub fn predict(&mut self, features: ArrayView1<'_, f64>) -> f64 {
        assert_eq!(
            features.len(),
            self.input_dim(),
            "input len {} does not match network input_dim {}",
            features.len(),
            self.input_dim()
        );

        self.buffers[0].assign(&features);

        let last = self.weights.len() - 1;
        for (idx, (w, b)) in self.weights.iter().zip(&self.biases).enumerate() {
            // Previous activation immutably, current one mutably.
            let (head, tail) = self.buffers.split_at_mut(idx + 1);
            let input = &head[idx];
            let out = &mut tail[0];

            general_mat_vec_mul(1.0, w, input, 0.0, out);
            *out += &b.column(0);
            if idx != last {
                out.mapv_inplace(fast_sigmoid);
            }
        }

        self.buffers[last + 1][0]
    }

    /// Evaluate the network on every row and store the mean squared error
    ///
    /// Not safe to call concurrently on the same network (buffers are
    /// reused), safe across distinct networks.
    pub fn fit(&mut self, dataset: &Dataset) -> f64 {
        assert_eq!(
            dataset.feature_count(),
            self.input_dim(),
            "dataset has {} features, network expects {}",
            dataset.feature_count(),
            self.input_dim()
        );

        let mut sum = 0.0;
        for row in 0..dataset.len() {
            let error = dataset.target(row) - self.predict(dataset.features(row));
            sum += error * error;
        }

        self.mse = sum / dataset.len() as f64;
        self.mse
    }

    /// Evaluate on held-out data; the fitness is overwritten with the result
    pub fn test(&mut self, dataset: &Dataset) -> f64 {
        self.fit(dataset)
    }

    /// Like [`NeuralNet::test`], but a dataset of the wrong width is an error
    pub fn try_test(&mut self, dataset: &Dataset) -> Result<f64> {
        if dataset.feature_count() != self.input_dim() {
            return Err(Error::InvalidData(format!(
                "dataset has {} features, network expects {}",
                dataset.feature_count(),
                self.input_dim()
            )));
        }
        Ok(self.fit(dataset))
    }
}

fn validate_layer_sizes(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(Error::InvalidTopology(
            "layer sizes must include input and output widths".to_string(),
        ));
    }
    if layer_sizes.contains(&0) {
        return Err(Error::InvalidTopology(
            "all layer sizes must be > 0".to_string(),
        ));
    }
    Ok(())
}

impl fmt::Display for NeuralNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Weights:")?;
        for (i, w) in self.weights.iter().enumerate() {
            writeln!(f, "Layer {}", i)?;
            writeln!(f, "{:.5}", w)?;
        }
        writeln!(f, "Biases:")?;
        for (i, b) in self.biases.iter().enumerate() {
            writeln!(f, "Layer {}", i)?;
            writeln!(f, "{:.5}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_random_network_shapes() {
        let sizes = [3, 5, 4, 1];
        let net = NeuralNet::new_random(&sizes, &mut rng()).unwrap();

        assert_eq!(net.weights().len(), sizes.len() - 1);
        assert_eq!(net.biases().len(), sizes.len() - 1);
        for i in 0..sizes.len() - 1 {
            assert_eq!(net.weights()[i].dim(), (sizes[i + 1], sizes[i]));
            assert_eq!(net.biases()[i].dim(), (sizes[i + 1], 1));
        }
        assert_eq!(net.layer_sizes(), sizes.to_vec());
        assert_eq!(net.parameter_count(), 3 * 5 + 5 + 5 * 4 + 4 + 4 + 1);
        assert!(net.is_valid());
    }

    #[test]
    fn test_random_weights_are_small() {
        let net = NeuralNet::new_random(&[10, 20, 1], &mut rng()).unwrap();
        let max = net.weights()[0].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(max > 0.0);
        assert!(max < 0.1, "init std-dev 0.01 should keep weights tiny, got {}", max);
    }

    #[test]
    fn test_rejects_bad_layer_sizes() {
        assert!(NeuralNet::new_random(&[3], &mut rng()).is_err());
        assert!(NeuralNet::new_random(&[3, 0, 1], &mut rng()).is_err());
    }

    #[test]
    fn test_from_parts_validates_shapes() {
        let ok = NeuralNet::from_parts(
            vec![array![[1.0, 2.0]], array![[3.0]]],
            vec![array![[0.0]], array![[0.0]]],
        );
        assert!(ok.is_ok());

        let chain_mismatch = NeuralNet::from_parts(
            vec![array![[1.0, 2.0]], array![[3.0, 4.0]]],
            vec![array![[0.0]], array![[0.0]]],
        );
        assert!(chain_mismatch.is_err());

        let bias_mismatch =
            NeuralNet::from_parts(vec![array![[1.0, 2.0]]], vec![array![[0.0], [1.0]]]);
        assert!(bias_mismatch.is_err());

        assert!(NeuralNet::from_parts(vec![], vec![]).is_err());
    }

    #[test]
    fn test_forward_pass_known_values() {
        // 1 -> 2 -> 1; hidden uses fast sigmoid, output stays linear.
        let mut net = NeuralNet::from_parts(
            vec![array![[1.0], [-2.0]], array![[2.0, 4.0]]],
            vec![array![[0.0], [1.0]], array![[0.5]]],
        )
        .unwrap();

        // x = 1: hidden pre = [1, -1] -> [0.5, -0.5]; out = 1 - 2 + 0.5
        let y = net.predict(array![1.0].view());
        assert!((y - (-0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_output_layer_is_linear() {
        let mut net = NeuralNet::from_parts(vec![array![[10.0]]], vec![array![[5.0]]]).unwrap();
        assert_eq!(net.predict(array![2.0].view()), 25.0);
    }

    #[test]
    fn test_fit_computes_mse() {
        let mut net = NeuralNet::from_parts(vec![array![[1.0]]], vec![array![[0.0]]]).unwrap();
        let data = Dataset::from_rows(
            vec!["x".to_string(), "y".to_string()],
            &[vec![1.0, 2.0], vec![3.0, 3.0]],
        )
        .unwrap();

        // errors: 1 and 0
        assert_eq!(net.fit(&data), 0.5);
        assert_eq!(net.mse(), 0.5);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let mut net = NeuralNet::new_random(&[1, 5, 5, 1], &mut rng()).unwrap();
        let data = Dataset::sine(40).unwrap();

        let first = net.fit(&data);
        let second = net.fit(&data);
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_row_mse_is_finite() {
        let mut net = NeuralNet::new_random(&[2, 3, 1], &mut rng()).unwrap();
        let data =
            Dataset::from_rows(vec!["a".into(), "b".into(), "y".into()], &[vec![0.3, -1.2, 4.0]])
                .unwrap();

        let mse = net.fit(&data);
        assert!(mse.is_finite());
    }

    #[test]
    fn test_unevaluated_mse_is_infinite() {
        let net = NeuralNet::new_random(&[1, 2, 1], &mut rng()).unwrap();
        assert!(net.mse().is_infinite());
    }

    #[test]
    #[should_panic]
    fn test_fit_panics_on_feature_mismatch() {
        let mut net = NeuralNet::new_random(&[2, 3, 1], &mut rng()).unwrap();
        let data = Dataset::sine(5).unwrap();
        net.fit(&data);
    }

    #[test]
    fn test_try_test_rejects_feature_mismatch() {
        let mut net = NeuralNet::new_random(&[1, 3, 1], &mut rng()).unwrap();
        let wide =
            Dataset::from_rows(vec!["a".into(), "b".into(), "y".into()], &[vec![0.1, 0.2, 0.3]])
                .unwrap();

        assert!(matches!(net.try_test(&wide), Err(Error::InvalidData(_))));
        assert!(net.mse().is_infinite());

        let expected = net.clone().test(&Dataset::sine(10).unwrap());
        assert_eq!(net.try_test(&Dataset::sine(10).unwrap()).unwrap(), expected);
    }

    #[test]
    fn test_display_dumps_every_layer() {
        let net = NeuralNet::new_random(&[1, 2, 1], &mut rng()).unwrap();
        let dump = net.to_string();
        assert!(dump.contains("Weights:"));
        assert!(dump.contains("Biases:"));
        assert!(dump.contains("Layer 1"));
    }
}
