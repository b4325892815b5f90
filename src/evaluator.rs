//! Fitness evaluation for a whole population.
//!
//! Every individual owns its buffers, so members are evaluated in parallel
//! without locking; the dataset is shared read-only. Evaluation returns only
//! once every member has been fitted.

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::population::Population;
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};

/// How fitness tasks are scheduled
pub enum Evaluator {
    /// One task per individual on the rayon global pool
    Parallel,
    /// One task per individual on a dedicated pool
    Pool(rayon::ThreadPool),
    /// Plain loop on the calling thread
    Sequential,
}

impl Evaluator {
    /// Pick a strategy from a thread count: `0` = global pool,
    /// `1` = sequential, `n` = dedicated pool of `n` workers
    pub fn with_threads(threads: usize) -> Result<Self> {
        match threads {
            0 => Ok(Self::Parallel),
            1 => Ok(Self::Sequential),
            n => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("evonet-eval-{}", i))
                    .build()
                    .map_err(|e| Error::InvalidConfig(format!("thread pool: {}", e)))?;
                log::debug!("Evaluation pool started with {} threads", n);
                Ok(Self::Pool(pool))
            }
        }
    }

    /// Fit every member against `dataset`
    ///
    /// A panic in any task fails the whole evaluation.
    pub fn evaluate(&self, population: &mut Population, dataset: &Dataset) -> Result<()> {
        if population.is_empty() {
            return Ok(());
        }
        if dataset.feature_count() != population.input_dim() {
            return Err(Error::InvalidData(format!(
                "dataset has {} features, networks expect {}",
                dataset.feature_count(),
                population.input_dim()
            )));
        }

        let members = population.members_mut();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match self {
            Self::Parallel => fit_parallel(members, dataset),
            Self::Pool(pool) => pool.install(|| fit_parallel(members, dataset)),
            Self::Sequential => members.iter_mut().for_each(|nn| {
                nn.fit(dataset);
            }),
        }));

        outcome.map_err(|payload| Error::Evaluation(panic_message(payload.as_ref())))
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parallel => write!(f, "Parallel"),
            Self::Pool(pool) => write!(f, "Pool({} threads)", pool.current_num_threads()),
            Self::Sequential => write!(f, "Sequential"),
        }
    }
}

fn fit_parallel(members: &mut [crate::neural::NeuralNet], dataset: &Dataset) {
    members.par_iter_mut().for_each(|nn| {
        nn.fit(dataset);
    });
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "fitness task panicked".to_string()
    }
}
