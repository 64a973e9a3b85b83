//! Cache-augmented local search for cyclic tours.
//!
//! Refines a single genome in place between generations. Every strategy
//! owns a small [`DistanceCache`] that is cleared at the start of each call,
//! and the candidate-guided variants prune their neighborhoods with a
//! [`CandidateList`] obtained from the problem.
//!
//! # Key Types
//!
//! - [`TwoOpt`]: First- or best-improvement 2-opt, full or candidate-guided
//! - [`LinKernighan`]: Depth-1 Lin-Kernighan exchange over candidate lists
//! - [`DistanceCache`]: Direct-mapped pair-distance cache
//! - [`CandidateList`]: Per-item k-nearest neighbors
//!
//! # Contract
//!
//! Local search never raises errors. Tours shorter than four items, the
//! absence of an improving move, and reaching the iteration cap all return
//! the current fitness, and the returned fitness never exceeds the starting
//! one.

mod cache;
mod candidates;
mod lin_kernighan;
pub mod two_opt;

pub use cache::{DistanceCache, DEFAULT_CACHE_CAPACITY, MAX_CACHED_INDEX};
pub use candidates::CandidateList;
pub use lin_kernighan::{LinKernighan, DEFAULT_LK_CANDIDATES};
pub use two_opt::{ImprovementStrategy, Neighborhood, TwoOpt};
