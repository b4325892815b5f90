//! Configuration for evolution runs.
//!
//! Supports YAML files describing a suite of experiments, with the classic
//! sine / rastrigin / rosenbrock suite as the default.

use crate::error::{Error, Result};
use crate::neural::Topology;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Suite of experiments run one after another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub experiments: Vec<ExperimentConfig>,
}

/// One training/test pair and the GA settings used on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Label used in logs and history file names
    pub name: String,
    /// Training CSV, relative to the data directory
    pub train_file: String,
    /// Held-out CSV, relative to the data directory
    pub test_file: String,
    pub genetic: GeneticConfig,
}

/// Genetic algorithm parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Hidden layer descriptor, e.g. `5s` or `5s5s`
    pub architecture: String,
    /// Individuals per generation
    pub population_size: usize,
    /// Best individuals copied unchanged into the next generation
    pub elitism: usize,
    /// Probability of mutating each weight
    pub mutation_probability: f64,
    /// Standard deviation of Gaussian mutations
    pub mutation_std_dev: f64,
    /// Number of generations after the initial one
    pub iterations: usize,
    /// Evaluation threads (0 = rayon default, 1 = sequential)
    #[serde(default)]
    pub threads: usize,
    /// Generations between progress reports (0 disables)
    #[serde(default = "default_report_interval")]
    pub report_interval: usize,
    /// Random seed; time-derived when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_report_interval() -> usize {
    2000
}

impl Default for Config {
    fn default() -> Self {
        let experiment = |name: &str, data: &str, architecture: &str, p: f64, k: f64| {
            ExperimentConfig {
                name: name.to_string(),
                train_file: format!("{}_train.txt", data),
                test_file: format!("{}_test.txt", data),
                genetic: GeneticConfig {
                    architecture: architecture.to_string(),
                    mutation_probability: p,
                    mutation_std_dev: k,
                    ..GeneticConfig::default()
                },
            }
        };

        Self {
            experiments: vec![
                experiment("sine-5s", "sine", "5s", 0.1, 0.1),
                experiment("sine-20s", "sine", "20s", 0.7, 0.1),
                experiment("sine-5s5s", "sine", "5s5s", 0.7, 0.1),
                experiment("rastrigin-5s", "rastrigin", "5s", 0.3, 0.5),
                experiment("rosenbrock-5s", "rosenbrock", "5s", 0.5, 4.0),
            ],
        }
    }
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            architecture: "5s".to_string(),
            population_size: 10,
            elitism: 1,
            mutation_probability: 0.1,
            mutation_std_dev: 0.1,
            iterations: 2000,
            threads: 0,
            report_interval: default_report_interval(),
            seed: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate every experiment
    pub fn validate(&self) -> Result<()> {
        if self.experiments.is_empty() {
            return Err(Error::InvalidConfig("no experiments configured".to_string()));
        }
        for experiment in &self.experiments {
            experiment.genetic.validate().map_err(|e| match e {
                Error::InvalidConfig(msg) => {
                    Error::InvalidConfig(format!("{}: {}", experiment.name, msg))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

impl GeneticConfig {
    /// Parse the architecture descriptor
    pub fn topology(&self) -> Result<Topology> {
        self.architecture.parse()
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::InvalidConfig(
                "population_size must be > 0".to_string(),
            ));
        }
        if self.elitism == 0 {
            return Err(Error::InvalidConfig("elitism must be > 0".to_string()));
        }
        if self.elitism >= self.population_size {
            return Err(Error::InvalidConfig(format!(
                "elitism ({}) must be smaller than population_size ({})",
                self.elitism, self.population_size
            )));
        }
        if !(self.mutation_probability.is_finite()
            && (0.0..=1.0).contains(&self.mutation_probability))
        {
            return Err(Error::InvalidConfig(format!(
                "mutation_probability must be in [0, 1], got {}",
                self.mutation_probability
            )));
        }
        if !(self.mutation_std_dev.is_finite() && self.mutation_std_dev > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "mutation_std_dev must be finite and > 0, got {}",
                self.mutation_std_dev
            )));
        }
        self.topology()?;
        Ok(())
    }
}
