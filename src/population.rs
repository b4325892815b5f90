//! Population of networks, elitism and fitness-proportionate selection.

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::neural::{NeuralNet, Topology};
use rand::Rng;
use std::cmp::Ordering;

/// MSE floor used when turning fitness into a selection weight
pub const MSE_FLOOR: f64 = 1e-12;

/// Ordered collection of networks sharing one topology
#[derive(Clone, Debug)]
pub struct Population {
    members: Vec<NeuralNet>,
}

impl Population {
    /// `size` independently initialised networks shaped `[features, hidden..., 1]`
    pub fn from_topology<R: Rng + ?Sized>(
        topology: &Topology,
        dataset: &Dataset,
        size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidConfig(
                "population size must be > 0".to_string(),
            ));
        }

        let layer_sizes = topology.layer_sizes(dataset.feature_count());
        let members = (0..size)
            .map(|_| NeuralNet::new_random(&layer_sizes, rng))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { members })
    }

    /// Wrap existing networks; they must all share one topology
    pub fn from_members(members: Vec<NeuralNet>) -> Result<Self> {
        let Some(first) = members.first() else {
            return Err(Error::InvalidConfig("population is empty".to_string()));
        };
        if let Some(other) = members.iter().find(|nn| !first.same_topology(nn)) {
            return Err(Error::InvalidTopology(format!(
                "population mixes topologies {:?} and {:?}",
                first.layer_sizes(),
                other.layer_sizes()
            )));
        }
        Ok(Self { members })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[NeuralNet] {
        &self.members
    }

    pub(crate) fn members_mut(&mut self) -> &mut [NeuralNet] {
        &mut self.members
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NeuralNet> {
        self.members.iter()
    }

    /// Input width shared by every member
    pub fn input_dim(&self) -> usize {
        self.members[0].input_dim()
    }

    /// Member with the lowest MSE (first one on ties)
    pub fn best(&self) -> &NeuralNet {
        let mut best = &self.members[0];
        for nn in &self.members[1..] {
            if rank(nn).total_cmp(&rank(best)) == Ordering::Less {
                best = nn;
            }
        }
        best
    }

    /// Take ownership of the best member
    pub fn into_best(self) -> NeuralNet {
        let idx = self
            .members
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| rank(a).total_cmp(&rank(b)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let mut members = self.members;
        members.swap_remove(idx)
    }

    /// Sort ascending by MSE and return the `k` best members
    ///
    /// The sort is stable and total (NaN ranks worst). Must run on a fully
    /// evaluated generation; the returned members are the population's own.
    pub fn apply_elitism(&mut self, k: usize) -> &[NeuralNet] {
        self.members.sort_by(|a, b| rank(a).total_cmp(&rank(b)));
        &self.members[..k.min(self.members.len())]
    }

    /// Roulette-wheel draw weighted by `1 / MSE`
    ///
    /// Non-finite MSE gets zero weight. When no member has positive weight
    /// the draw is uniform.
    pub fn select_parent<R: Rng + ?Sized>(&self, rng: &mut R) -> &NeuralNet {
        let total: f64 = self.members.iter().map(selection_weight).sum();
        if !(total.is_finite() && total > 0.0) {
            return &self.members[rng.gen_range(0..self.members.len())];
        }

        let threshold = rng.gen::<f64>() * total;
        &self.members[self.wheel_index(threshold)]
    }

    /// Index of the first member whose cumulative weight exceeds `threshold`
    ///
    /// Falls back to the last member with positive weight when the running
    /// sum never passes the threshold.
    fn wheel_index(&self, threshold: f64) -> usize {
        let mut running = 0.0;
        let mut last_positive = 0;
        for (i, nn) in self.members.iter().enumerate() {
            let weight = selection_weight(nn);
            if weight > 0.0 {
                last_positive = i;
            }
            running += weight;
            if running > threshold {
                return i;
            }
        }
        last_positive
    }

    /// Append offspring after the first `keep` members, dropping the rest
    pub(crate) fn replace_tail(&mut self, keep: usize, offspring: Vec<NeuralNet>) {
        self.members.truncate(keep);
        self.members.extend(offspring);
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a NeuralNet;
    type IntoIter = std::slice::Iter<'a, NeuralNet>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// Selection weight of one individual: inverse MSE with a floor
#[inline]
pub fn selection_weight(nn: &NeuralNet) -> f64 {
    let mse = nn.mse();
    if mse.is_finite() {
        1.0 / mse.max(MSE_FLOOR)
    } else {
        0.0
    }
}

/// Sort key where NaN counts as worst
#[inline]
fn rank(nn: &NeuralNet) -> f64 {
    let mse = nn.mse();
    if mse.is_nan() {
        f64::INFINITY
    } else {
        mse
    }
}
