//! Generational genetic algorithm driver.

use crate::config::GeneticConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::neural::{reproduce, Mutation, NeuralNet, Topology};
use crate::population::Population;
use crate::stats::{GenerationStats, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Result of one evolution run
#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// Lowest-MSE individual of the final generation
    pub best: NeuralNet,
    /// Best training MSE of the final generation
    pub train_mse: f64,
    /// Per-generation statistics, initial population first
    pub history: StatsHistory,
    /// Seed the run's generator was created from
    pub seed: u64,
}

/// Genetic algorithm over network weights
#[derive(Debug)]
pub struct GeneticAlgorithm {
    config: GeneticConfig,
    topology: Topology,
    mutation: Mutation,
    evaluator: Evaluator,
}

impl GeneticAlgorithm {
    /// Validate the configuration and prepare the evaluator
    pub fn new(config: GeneticConfig) -> Result<Self> {
        config.validate()?;
        let topology = config.topology()?;
        let mutation = Mutation::new(config.mutation_probability, config.mutation_std_dev)?;
        let evaluator = Evaluator::with_threads(config.threads)?;

        Ok(Self {
            config,
            topology,
            mutation,
            evaluator,
        })
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Run with the configured seed, or a time-derived one
    pub fn run(&self, train: &Dataset) -> Result<RunOutcome> {
        let seed = self.config.seed.unwrap_or_else(time_seed);
        log::info!(
            "Evolving {} (population {}, elitism {}, p={}, K={}) with seed {}",
            self.topology,
            self.config.population_size,
            self.config.elitism,
            self.mutation.probability(),
            self.mutation.std_dev(),
            seed
        );

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut outcome = self.run_with_rng(train, &mut rng)?;
        outcome.seed = seed;
        Ok(outcome)
    }

    /// Run with a caller-supplied generator
    ///
    /// The returned `seed` is 0 since the generator's origin is unknown.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        train: &Dataset,
        rng: &mut R,
    ) -> Result<RunOutcome> {
        let mut history = StatsHistory::with_capacity(self.config.iterations);

        let mut population = self.initial_population(train, rng)?;
        self.evaluator.evaluate(&mut population, train)?;
        history.record(GenerationStats::from_population(0, &population));

        for generation in 0..self.config.iterations {
            if self.should_report(generation) {
                log::info!("Train error @{}: {}", generation, population.best().mse());
            }

            population = self.next_generation(population, rng);
            self.evaluator.evaluate(&mut population, train)?;

            let stats = GenerationStats::from_population(generation + 1, &population);
            log::debug!("{}", stats.summary());
            history.record(stats);
        }

        let best = population.into_best();
        let train_mse = best.mse();
        log::info!("Train error @{}: {}", self.config.iterations, train_mse);

        Ok(RunOutcome {
            best,
            train_mse,
            history,
            seed: 0,
        })
    }

    /// Randomly initialised, not yet evaluated, population for `train`
    pub fn initial_population<R: Rng + ?Sized>(
        &self,
        train: &Dataset,
        rng: &mut R,
    ) -> Result<Population> {
        Population::from_topology(&self.topology, train, self.config.population_size, rng)
    }

    /// Build the next generation from an evaluated one
    ///
    /// The elites survive unchanged; the remaining slots are filled with
    /// offspring of roulette-selected parents. Offspring are not evaluated.
    pub fn next_generation<R: Rng + ?Sized>(
        &self,
        mut population: Population,
        rng: &mut R,
    ) -> Population {
        let target = self.config.population_size;
        let elite_count = population.apply_elitism(self.config.elitism).len();

        let mut offspring = Vec::with_capacity(target.saturating_sub(elite_count));
        while elite_count + offspring.len() < target {
            let parent1 = population.select_parent(rng);
            let parent2 = population.select_parent(rng);
            offspring.push(reproduce(parent1, parent2, &self.mutation, rng));
        }

        population.replace_tail(elite_count, offspring);
        population
    }

    fn should_report(&self, generation: usize) -> bool {
        let interval = self.config.report_interval;
        interval > 0 && generation > 0 && generation % interval == 0
    }
}

/// Seed derived from the wall clock
fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_else(|_| rand::thread_rng().gen())
}
