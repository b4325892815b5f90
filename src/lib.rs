//! # evonet
//!
//! Evolves the weights of small feed-forward neural networks with a
//! generational genetic algorithm to fit scalar regression benchmarks.
//!
//! ## Features
//!
//! - **Parallel**: fitness of every individual evaluated concurrently via Rayon
//! - **Allocation-free fitness**: per-network activation buffers are reused
//! - **Configurable**: YAML experiment suites
//! - **Reproducible**: one seeded generator per run
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use evonet::{Dataset, GeneticAlgorithm, GeneticConfig};
//!
//! let train = Dataset::sine(50)?;
//! let config = GeneticConfig {
//!     architecture: "5s".to_string(),
//!     seed: Some(7),
//!     ..GeneticConfig::default()
//! };
//!
//! let ga = GeneticAlgorithm::new(config)?;
//! let mut outcome = ga.run(&train)?;
//!
//! println!("Train error: {}", outcome.train_mse);
//! println!("Test error: {}", outcome.best.test(&Dataset::sine(17)?));
//! # Ok::<(), evonet::Error>(())
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use evonet::Config;
//!
//! let mut config = Config::default();
//! config.experiments[0].genetic.population_size = 20;
//! config.experiments[0].genetic.threads = 4;
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod evolution;
pub mod neural;
pub mod population;
pub mod stats;

// Re-export main types
pub use config::{Config, ExperimentConfig, GeneticConfig};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use evaluator::Evaluator;
pub use evolution::{GeneticAlgorithm, RunOutcome};
pub use neural::{NeuralNet, Topology};
pub use population::Population;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a fixed-seed evolution on a 50-point sine dataset and time it
pub fn benchmark(generations: usize, population: usize) -> Result<BenchmarkResult> {
    use std::time::Instant;

    let train = Dataset::sine(50)?;
    let config = GeneticConfig {
        architecture: "5s".to_string(),
        population_size: population,
        elitism: 1,
        iterations: generations,
        report_interval: 0,
        seed: Some(42),
        ..GeneticConfig::default()
    };
    let ga = GeneticAlgorithm::new(config)?;

    let start = Instant::now();
    let outcome = ga.run(&train)?;
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        generations,
        population,
        elapsed_secs: elapsed.as_secs_f64(),
        generations_per_second: generations as f64 / elapsed.as_secs_f64(),
        initial_mse: outcome
            .history
            .initial()
            .map(|s| s.best_mse)
            .unwrap_or(f64::INFINITY),
        final_mse: outcome.train_mse,
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub generations: usize,
    pub population: usize,
    pub elapsed_secs: f64,
    pub generations_per_second: f64,
    pub initial_mse: f64,
    pub final_mse: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Generations: {}", self.generations)?;
        writeln!(f, "Population: {}", self.population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} generations/s", self.generations_per_second)?;
        writeln!(f, "MSE: {:.6} -> {:.6}", self.initial_mse, self.final_mse)?;
        Ok(())
    }
}
