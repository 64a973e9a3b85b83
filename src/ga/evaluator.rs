//! Batch fitness evaluation.

use crate::problem::{Genome, PermutationProblem};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Evaluates `genomes` and returns their fitnesses in input order.
///
/// With `parallel` set (and the `parallel` feature enabled) the batch is
/// split across the rayon pool. `evaluate` only reads the problem, and
/// rayon's indexed collect writes each result to its own slot, so the
/// output is identical to the sequential path for a deterministic
/// `evaluate`.
pub(crate) fn evaluate_batch<P: PermutationProblem + ?Sized>(
    problem: &P,
    genomes: &[Genome],
    parallel: bool,
) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    if parallel {
        return genomes.par_iter().map(|g| problem.evaluate(g)).collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    genomes.iter().map(|g| problem.evaluate(g)).collect()
}
