//! Evolutionary search for permutation problems with cache-augmented
//! local search.
//!
//! - **Problems** ([`problem`]): the [`PermutationProblem`](problem::PermutationProblem)
//!   contract and a symmetric TSP built on a dense [`DistanceMatrix`](problem::DistanceMatrix).
//! - **Genetic Algorithm** ([`ga`]): a generational loop with elitism,
//!   pluggable selection, crossover, mutation, and repair operators,
//!   optional per-offspring local search, diversity statistics, and
//!   generation, evaluation, time, and stagnation budgets.
//! - **Local Search** ([`local`]): 2-opt (first or best improvement, full or
//!   candidate-list neighborhoods) and a depth-limited Lin-Kernighan, both
//!   backed by a small direct-mapped distance cache.
//!
//! Everything minimizes. Runs are reproducible from `GaConfig::seed`; with
//! the `parallel` feature, offspring evaluation runs on rayon without
//! changing results.

pub mod error;
pub mod ga;
pub mod local;
pub mod problem;

pub use error::{Error, Result};
