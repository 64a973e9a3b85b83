//! Problem definitions for permutation-structured optimization.
//!
//! The evolutionary loop only needs [`PermutationProblem`]: a size, an
//! evaluation function, and a way to produce random genomes. Local search
//! additionally needs pairwise distances and nearest-neighbor candidate lists,
//! which [`TourProblem`] provides.
//!
//! # Key Types
//!
//! - [`DistanceMatrix`]: Dense symmetric distance storage
//! - [`TspProblem`]: The canonical cyclic-tour problem over a distance matrix

mod distance;
mod tsp;

pub use distance::DistanceMatrix;
pub use tsp::TspProblem;

use crate::local::CandidateList;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

/// An ordered sequence of distinct item indices in `[0, n)`.
pub type Genome = Vec<usize>;

/// Symmetric pairwise-distance lookup for `n` items.
///
/// Implementations are immutable after construction.
pub trait DistanceProvider: Send + Sync {
    /// Number of items.
    fn item_count(&self) -> usize;

    /// Distance between items `i` and `j`.
    fn distance(&self, i: usize, j: usize) -> f64;
}

/// Defines a permutation optimization problem.
///
/// Lower fitness is better (minimization).
///
/// # Thread Safety
///
/// `evaluate` must be deterministic and must not touch shared mutable state:
/// the runner may call it from several rayon workers at once.
pub trait PermutationProblem: Send + Sync {
    /// Number of items in every genome.
    fn size(&self) -> usize;

    /// Computes the fitness of a genome.
    fn evaluate(&self, genome: &[usize]) -> f64;

    /// Creates a uniformly random permutation of `0..size()`.
    fn random_genome<R: Rng + ?Sized>(&self, rng: &mut R) -> Genome {
        let mut genome: Genome = (0..self.size()).collect();
        genome.shuffle(rng);
        genome
    }
}

/// A permutation problem whose genomes are cyclic tours over a distance
/// provider, with a lazily built candidate list.
pub trait TourProblem: PermutationProblem + DistanceProvider {
    /// Returns the `k`-nearest candidate list, building it on first use.
    ///
    /// `k` is clamped to `n - 1` when it is zero or at least `n`.
    fn candidate_list(&self, k: usize) -> Arc<CandidateList>;
}

/// Sum of distances along the cyclic tour (last item connects back to first).
///
/// Tours shorter than two items have length zero.
pub fn tour_length<D: DistanceProvider + ?Sized>(provider: &D, tour: &[usize]) -> f64 {
    let n = tour.len();
    if n < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    for i in 0..n {
        total += provider.distance(tour[i], tour[(i + 1) % n]);
    }
    total
}
