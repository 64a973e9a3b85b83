//! Generational evolutionary search over permutations.
//!
//! A problem is any [`PermutationProblem`](crate::problem::PermutationProblem);
//! the loop is driven by an [`Operators`] set and a [`GaConfig`].
//!
//! # Operator Traits
//!
//! - [`SelectionOperator`], [`CrossoverOperator`], [`MutationOperator`]:
//!   statically dispatched, consume the run's RNG
//! - [`RepairOperator`], [`LocalSearch`]: optional, boxed
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, budgets, presets)
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Final optimization result with statistics
//! - [`Population`]: Structure-of-arrays genome/fitness store
//!
//! # Concrete Operators
//!
//! - [`Selection`]: tournament, roulette, rank
//! - [`PermutationCrossover`]: OX and PMX, see [`operators`]
//! - [`EdgeAssemblyCrossover`]: EAX for tours
//! - [`PermutationMutation`]: swap, insert, invert
//! - [`PermutationRepair`]: restores a valid permutation
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - De Jong (2006), *Evolutionary Computation: A Unified Approach*

mod config;
mod eax;
mod evaluator;
pub mod operators;
mod population;
mod runner;
mod selection;
mod types;

pub use config::GaConfig;
pub use eax::EdgeAssemblyCrossover;
pub use operators::{PermutationCrossover, PermutationMutation, PermutationRepair};
pub use population::{hamming_fraction, FitnessSummary, Population};
pub use runner::{GaResult, GaRunner, GenerationStats};
pub use selection::Selection;
pub use types::{
    CrossoverOperator, LocalSearch, MutationOperator, Operators, RepairOperator,
    SelectionOperator,
};
