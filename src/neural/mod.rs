//! Neural networks evolved by the genetic algorithm.
//!
//! - Dense layers stored as `ndarray` matrices
//! - Fast-sigmoid hidden layers, linear output
//! - Arithmetic crossover and Gaussian mutation

mod activation;
mod crossover;
mod mutations;
mod network;
mod topology;

pub use activation::fast_sigmoid;
pub use crossover::reproduce;
pub use mutations::Mutation;
pub use network::{NeuralNet, INIT_STD_DEV};
pub use topology::{Topology, LAYER_DELIMITER};
