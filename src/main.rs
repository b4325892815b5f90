//! evonet - CLI Entry Point
//!
//! Runs suites of neuroevolution experiments.

use clap::{Parser, Subcommand};
use evonet::{benchmark, Config, Dataset, ExperimentConfig, GeneticAlgorithm};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "evonet")]
#[command(version)]
#[command(about = "Evolves neural network weights with a genetic algorithm")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every experiment of a suite
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Directory holding the train/test CSV files
        #[arg(short, long, default_value = "files")]
        data_dir: PathBuf,

        /// Random seed applied to every experiment
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (no progress reports)
        #[arg(short, long)]
        quiet: bool,

        /// Directory for per-experiment history (JSON)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Print the weights of each best network
        #[arg(long)]
        show_network: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of generations
        #[arg(short, long, default_value = "2000")]
        generations: usize,

        /// Population size
        #[arg(short, long, default_value = "10")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

struct RunOptions {
    data_dir: PathBuf,
    seed: Option<u64>,
    quiet: bool,
    history: Option<PathBuf>,
    show_network: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data_dir,
            seed,
            quiet,
            history,
            show_network,
        } => run_suite(
            config,
            RunOptions {
                data_dir,
                seed,
                quiet,
                history,
                show_network,
            },
        ),

        Commands::Benchmark {
            generations,
            population,
        } => run_benchmark(generations, population),

        Commands::Init { output } => generate_config(output),
    }
}

fn run_suite(config_path: PathBuf, options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = if config_path.exists() {
        log::info!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        log::info!("Using default configuration");
        Config::default()
    };

    if let Some(dir) = &options.history {
        std::fs::create_dir_all(dir)?;
    }

    let start = Instant::now();
    for experiment in &config.experiments {
        run_experiment(experiment, &options)?;
    }

    println!("Milliseconds: {}", start.elapsed().as_millis());
    Ok(())
}

fn run_experiment(
    experiment: &ExperimentConfig,
    options: &RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== {} ===", experiment.name);

    let train = load(&options.data_dir, &experiment.train_file)?;
    let test = load(&options.data_dir, &experiment.test_file)?;
    log::debug!(
        "Loaded {} training and {} test rows ({} features)",
        train.len(),
        test.len(),
        train.feature_count()
    );

    let mut genetic = experiment.genetic.clone();
    if options.seed.is_some() {
        genetic.seed = options.seed;
    }
    if options.quiet {
        genetic.report_interval = 0;
    }

    let ga = GeneticAlgorithm::new(genetic)?;
    let mut outcome = ga.run(&train)?;
    log::info!(
        "{}: {} generations of {} networks, seed {}",
        experiment.name,
        ga.config().iterations,
        ga.config().population_size,
        outcome.seed
    );

    println!("[Train error]: {:.6}", outcome.train_mse);
    let test_mse = outcome
        .best
        .try_test(&test)
        .map_err(|e| format!("{}: {}", experiment.test_file, e))?;
    println!("[Test error]: {:.6}", test_mse);

    if options.show_network {
        println!("{}", outcome.best);
    }

    if let Some(dir) = &options.history {
        let path = dir.join(format!("{}.json", experiment.name));
        outcome.history.save_json(&path)?;
        log::info!("History saved: {:?}", path);
    }

    Ok(())
}

fn load(data_dir: &Path, file: &str) -> Result<Dataset, Box<dyn std::error::Error>> {
    let path = data_dir.join(file);
    Dataset::from_csv_file(&path).map_err(|e| format!("{}: {}", path.display(), e).into())
}

fn run_benchmark(generations: usize, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== evonet Benchmark ===");
    println!("Generations: {}", generations);
    println!("Population: {}", population);
    println!();

    let result = benchmark(generations, population)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
