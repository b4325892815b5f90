//! Arithmetic crossover between networks of identical topology.

use super::mutations::Mutation;
use super::network::NeuralNet;
use ndarray::{Array2, Zip};
use rand::Rng;

impl NeuralNet {
    /// Child whose every gene is the mean of both parents' genes
    ///
    /// Panics if the parents do not share a topology.
    pub fn crossover_average(&self, other: &Self) -> Self {
        assert!(
            self.same_topology(other),
            "crossover requires identical topologies: {:?} vs {:?}",
            self.layer_sizes(),
            other.layer_sizes()
        );

        let mean = |a: &Array2<f64>, b: &Array2<f64>| {
            Zip::from(a).and(b).map_collect(|&x, &y| (x + y) / 2.0)
        };

        let weights = self.weights.iter().zip(&other.weights).map(|(a, b)| mean(a, b)).collect();
        let biases = self.biases.iter().zip(&other.biases).map(|(a, b)| mean(a, b)).collect();

        Self::assemble(weights, biases)
    }
}

/// Produce one offspring: arithmetic mean of the parents, then mutation
///
/// Crossover and mutation happen in a single pass per matrix. Random draws
/// are consumed in the same order as [`NeuralNet::crossover_average`]
/// followed by [`NeuralNet::mutate`], so both paths give the same child for
/// the same generator state. The child gets fresh buffers and no fitness.
pub fn reproduce<R: Rng + ?Sized>(
    parent1: &NeuralNet,
    parent2: &NeuralNet,
    mutation: &Mutation,
    rng: &mut R,
) -> NeuralNet {
    assert!(
        parent1.same_topology(parent2),
        "reproduce requires identical topologies: {:?} vs {:?}",
        parent1.layer_sizes(),
        parent2.layer_sizes()
    );

    let layers = parent1.weights.len();
    let mut weights = Vec::with_capacity(layers);
    let mut biases = Vec::with_capacity(layers);

    for i in 0..layers {
        weights.push(
            Zip::from(&parent1.weights[i])
                .and(&parent2.weights[i])
                .map_collect(|&x, &y| mutation.perturb((x + y) / 2.0, rng)),
        );
        biases.push(
            Zip::from(&parent1.biases[i])
                .and(&parent2.biases[i])
                .map_collect(|&x, &y| mutation.perturb((x + y) / 2.0, rng)),
        );
    }

    NeuralNet::assemble(weights, biases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn parents(rng: &mut ChaCha8Rng) -> (NeuralNet, NeuralNet) {
        let a = NeuralNet::new_random(&[2, 4, 3, 1], rng).unwrap();
        let b = NeuralNet::new_random(&[2, 4, 3, 1], rng).unwrap();
        (a, b)
    }

    #[test]
    fn test_crossover_average_is_exact_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let (a, b) = parents(&mut rng);

        let child = a.crossover_average(&b);

        for i in 0..child.num_layers() {
            let expected_w = (&a.weights()[i] + &b.weights()[i]) / 2.0;
            let expected_b = (&a.biases()[i] + &b.biases()[i]) / 2.0;
            assert_eq!(child.weights()[i], expected_w);
            assert_eq!(child.biases()[i], expected_b);
        }
    }

    #[test]
    fn test_reproduce_without_mutation_is_exact_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (a, b) = parents(&mut rng);
        let mutation = Mutation::new(0.0, 0.1).unwrap();

        let child = reproduce(&a, &b, &mutation, &mut rng);

        for i in 0..child.num_layers() {
            for ((c, x), y) in child.weights()[i]
                .iter()
                .zip(a.weights()[i].iter())
                .zip(b.weights()[i].iter())
            {
                assert_eq!(*c, (x + y) / 2.0);
            }
            for ((c, x), y) in child.biases()[i]
                .iter()
                .zip(a.biases()[i].iter())
                .zip(b.biases()[i].iter())
            {
                assert_eq!(*c, (x + y) / 2.0);
            }
        }
    }

    #[test]
    fn test_reproduce_matches_separate_passes() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let (a, b) = parents(&mut rng);
        let mutation = Mutation::new(0.4, 0.3).unwrap();

        let mut fused_rng = ChaCha8Rng::seed_from_u64(99);
        let fused = reproduce(&a, &b, &mutation, &mut fused_rng);

        let mut split_rng = ChaCha8Rng::seed_from_u64(99);
        let mut split = a.crossover_average(&b);
        split.mutate(&mutation, &mut split_rng);

        assert_eq!(fused.weights(), split.weights());
        assert_eq!(fused.biases(), split.biases());
    }

    #[test]
    fn test_offspring_has_fresh_state() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let (mut a, b) = parents(&mut rng);
        a.fit(&Dataset::from_rows(
            vec!["a".into(), "b".into(), "y".into()],
            &[vec![1.0, 2.0, 3.0]],
        )
        .unwrap());

        let child = reproduce(&a, &b, &Mutation::new(0.5, 0.1).unwrap(), &mut rng);

        assert!(child.mse().is_infinite());
        assert_eq!(child.layer_sizes(), a.layer_sizes());
    }

    #[test]
    #[should_panic]
    fn test_reproduce_rejects_mismatched_topologies() {
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        let a = NeuralNet::new_random(&[1, 5, 1], &mut rng).unwrap();
        let b = NeuralNet::new_random(&[1, 4, 1], &mut rng).unwrap();
        reproduce(&a, &b, &Mutation::new(0.1, 0.1).unwrap(), &mut rng);
    }
}
