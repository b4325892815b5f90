//! Per-generation statistics.

use crate::error::Result;
use crate::population::Population;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fitness snapshot of one evaluated generation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation index (0 = initial population)
    pub generation: usize,
    /// Lowest MSE in the population
    pub best_mse: f64,
    /// Mean MSE across finite members
    pub mean_mse: f64,
    /// Highest finite MSE
    pub worst_mse: f64,
}

impl GenerationStats {
    /// Compute stats from an evaluated population
    pub fn from_population(generation: usize, population: &Population) -> Self {
        let finite: Vec<f64> = population
            .iter()
            .map(|nn| nn.mse())
            .filter(|mse| mse.is_finite())
            .collect();

        if finite.is_empty() {
            return Self {
                generation,
                best_mse: f64::INFINITY,
                mean_mse: f64::INFINITY,
                worst_mse: f64::INFINITY,
            };
        }

        Self {
            generation,
            best_mse: finite.iter().cloned().fold(f64::INFINITY, f64::min),
            mean_mse: finite.iter().sum::<f64>() / finite.len() as f64,
            worst_mse: finite.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Format as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Gen:{:6} | Best:{:.6} | Mean:{:.6} | Worst:{:.6}",
            self.generation, self.best_mse, self.mean_mse, self.worst_mse
        )
    }
}

/// Stats recorded over a run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    pub snapshots: Vec<GenerationStats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(generations: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(generations + 1),
        }
    }

    pub fn record(&mut self, stats: GenerationStats) {
        self.snapshots.push(stats);
    }

    /// Stats of the initial population
    pub fn initial(&self) -> Option<&GenerationStats> {
        self.snapshots.first()
    }

    /// Stats of the final population
    pub fn last(&self) -> Option<&GenerationStats> {
        self.snapshots.last()
    }

    /// Best MSE over time
    pub fn best_series(&self) -> Vec<(usize, f64)> {
        self.snapshots
            .iter()
            .map(|s| (s.generation, s.best_mse))
            .collect()
    }

    /// Save history to a JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load history from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::neural::NeuralNet;
    use ndarray::array;

    fn fitted(w: f64) -> NeuralNet {
        let data = Dataset::from_rows(vec!["x".into(), "y".into()], &[vec![1.0, 0.0]]).unwrap();
        let mut nn = NeuralNet::from_parts(vec![array![[w]]], vec![array![[0.0]]]).unwrap();
        nn.fit(&data);
        nn
    }

    #[test]
    fn test_from_population() {
        let pop = Population::from_members(vec![fitted(1.0), fitted(2.0), fitted(3.0)]).unwrap();
        let stats = GenerationStats::from_population(4, &pop);

        assert_eq!(stats.generation, 4);
        assert_eq!(stats.best_mse, 1.0);
        assert_eq!(stats.worst_mse, 9.0);
        assert!((stats.mean_mse - 14.0 / 3.0).abs() < 1e-12);
        assert!(stats.summary().contains("Gen:     4"));
    }

    #[test]
    fn test_non_finite_members_are_skipped() {
        let pop = Population::from_members(vec![fitted(2.0), fitted(f64::NAN)]).unwrap();
        let stats = GenerationStats::from_population(0, &pop);
        assert_eq!(stats.best_mse, 4.0);
        assert_eq!(stats.mean_mse, 4.0);
    }

    #[test]
    fn test_history_series() {
        let mut history = StatsHistory::new();
        for g in 0..3 {
            history.record(GenerationStats {
                generation: g,
                best_mse: 1.0 / (g + 1) as f64,
                ..Default::default()
            });
        }

        assert_eq!(history.initial().map(|s| s.generation), Some(0));
        assert_eq!(history.last().map(|s| s.generation), Some(2));
        assert_eq!(history.best_series()[1], (1, 0.5));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut history = StatsHistory::with_capacity(1);
        history.record(GenerationStats {
            generation: 0,
            best_mse: 0.5,
            mean_mse: 0.75,
            worst_mse: 1.0,
        });

        let path = std::env::temp_dir().join("evonet_stats_history_test.json");
        history.save_json(&path).unwrap();
        let loaded = StatsHistory::load_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.snapshots, history.snapshots);
    }
}
