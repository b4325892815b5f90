//! Per-gene Gaussian mutation.

use super::network::NeuralNet;
use crate::error::{Error, Result};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Mutation operator: each gene is perturbed with probability `probability`
/// by a draw from `N(0, std_dev)`
#[derive(Clone, Debug)]
pub struct Mutation {
    probability: f64,
    std_dev: f64,
    normal: Normal<f64>,
}

impl Mutation {
    pub fn new(probability: f64, std_dev: f64) -> Result<Self> {
        if !(probability.is_finite() && (0.0..=1.0).contains(&probability)) {
            return Err(Error::InvalidConfig(format!(
                "mutation probability must be in [0, 1], got {}",
                probability
            )));
        }
        if !(std_dev.is_finite() && std_dev > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "mutation std-dev must be finite and > 0, got {}",
                std_dev
            )));
        }
        let normal = Normal::new(0.0, std_dev).map_err(|e| Error::InvalidConfig(e.to_string()))?;

        Ok(Self {
            probability,
            std_dev,
            normal,
        })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Possibly perturb a single gene
    ///
    /// Always consumes one uniform draw, plus one Gaussian draw when the gene
    /// mutates.
    #[inline]
    pub fn perturb<R: Rng + ?Sized>(&self, gene: f64, rng: &mut R) -> f64 {
        if rng.gen::<f64>() < self.probability {
            gene + self.normal.sample(rng)
        } else {
            gene
        }
    }
}

impl NeuralNet {
    /// Mutate every weight and bias in place
    ///
    /// Visits layer by layer, weights before biases, in row-major order.
    pub fn mutate<R: Rng + ?Sized>(&mut self, mutation: &Mutation, rng: &mut R) {
        for (weights, biases) in self.weights.iter_mut().zip(self.biases.iter_mut()) {
            weights.mapv_inplace(|w| mutation.perturb(w, rng));
            biases.mapv_inplace(|b| mutation.perturb(b, rng));
        }
    }
}
