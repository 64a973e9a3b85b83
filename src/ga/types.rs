//! Operator contracts for the evolutionary loop.
//!
//! The loop is generic over three hot, RNG-consuming operators
//! ([`SelectionOperator`], [`CrossoverOperator`], [`MutationOperator`]),
//! which are statically dispatched: their methods take a generic `R: Rng`,
//! so each concrete combination is monomorphized and the per-offspring calls
//! inline. The price is that they cannot be trait objects. Pick between
//! strategies at configuration time with the provided enums instead.
//!
//! Repair and local search are optional capabilities held as
//! `Option<Box<dyn ...>>`. They take no RNG, run once per offspring, and do
//! O(n) work or more per call, so the virtual call is noise next to the
//! work it dispatches.

use crate::problem::Genome;
use rand::Rng;

/// Chooses a parent index from the current fitnesses (lower is better).
pub trait SelectionOperator {
    /// Returns an index into `fitnesses`.
    fn select<R: Rng + ?Sized>(&self, fitnesses: &[f64], rng: &mut R) -> usize;
}

/// Recombines two parents into two children.
pub trait CrossoverOperator<P: ?Sized> {
    /// Produces two offspring. The loop drops the second one when the
    /// population is one short of full.
    fn cross<R: Rng + ?Sized>(
        &self,
        problem: &P,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> (Genome, Genome);
}

/// Perturbs a genome in place.
pub trait MutationOperator<P: ?Sized> {
    /// Mutates `genome`.
    fn mutate<R: Rng + ?Sized>(&self, problem: &P, genome: &mut Genome, rng: &mut R);
}

/// Restores the permutation invariant (or any other domain constraint) in place.
///
/// Runs after every genome construction or modification, before evaluation.
pub trait RepairOperator<P: ?Sized>: Send {
    /// Repairs `genome`.
    fn repair(&self, problem: &P, genome: &mut Genome);
}

/// Improves a freshly evaluated offspring in place.
///
/// Implementations may keep mutable scratch state (such as a distance
/// cache), hence `&mut self`.
pub trait LocalSearch<P: ?Sized>: Send {
    /// Improves `genome` and returns its resulting fitness, which replaces
    /// the evaluation result.
    fn improve(&mut self, problem: &P, genome: &mut Genome) -> f64;
}

/// The operator set driving one run.
///
/// # Examples
///
/// ```
/// use u_permevo::ga::{Operators, PermutationCrossover, PermutationMutation, Selection};
/// use u_permevo::local::TwoOpt;
/// use u_permevo::problem::TspProblem;
///
/// let ops: Operators<TspProblem, _, _, _> = Operators::new(
///     Selection::Tournament(3),
///     PermutationCrossover::Order,
///     PermutationMutation::Invert,
/// )
/// .with_local_search(TwoOpt::first_improvement().with_candidates(8));
/// assert!(ops.local_search.is_some());
/// assert!(ops.repair.is_none());
/// ```
pub struct Operators<P, S, C, M> {
    /// Parent selection.
    pub selection: S,
    /// Recombination.
    pub crossover: C,
    /// Perturbation.
    pub mutation: M,
    /// Optional repair, applied before every evaluation.
    pub repair: Option<Box<dyn RepairOperator<P>>>,
    /// Optional refinement, applied once per offspring after evaluation.
    pub local_search: Option<Box<dyn LocalSearch<P>>>,
}

impl<P, S, C, M> Operators<P, S, C, M>
where
    S: SelectionOperator,
    C: CrossoverOperator<P>,
    M: MutationOperator<P>,
{
    /// Creates an operator set without repair or local search.
    pub fn new(selection: S, crossover: C, mutation: M) -> Self {
        Self {
            selection,
            crossover,
            mutation,
            repair: None,
            local_search: None,
        }
    }

    /// Adds a repair step.
    pub fn with_repair<Rp: RepairOperator<P> + 'static>(mut self, repair: Rp) -> Self {
        self.repair = Some(Box::new(repair));
        self
    }

    /// Adds a local-search refinement step.
    pub fn with_local_search<L: LocalSearch<P> + 'static>(mut self, local_search: L) -> Self {
        self.local_search = Some(Box::new(local_search));
        self
    }
}

impl<P, S: std::fmt::Debug, C: std::fmt::Debug, M: std::fmt::Debug> std::fmt::Debug
    for Operators<P, S, C, M>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operators")
            .field("selection", &self.selection)
            .field("crossover", &self.crossover)
            .field("mutation", &self.mutation)
            .field("repair", &self.repair.is_some())
            .field("local_search", &self.local_search.is_some())
            .finish()
    }
}
