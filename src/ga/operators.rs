//! Permutation crossover, mutation, and repair operators.
//!
//! The free functions operate on plain `&[usize]` index vectors; the enums
//! wrap them as [`CrossoverOperator`] and [`MutationOperator`]
//! implementations so a strategy can be chosen at configuration time.
//!
//! # Crossover
//!
//! - [`order_crossover`] (OX): Davis (1985), preserves relative order
//! - [`pmx_crossover`] (PMX): Goldberg & Lingle (1985), preserves absolute position
//! - [`EdgeAssemblyCrossover`](super::EdgeAssemblyCrossover) (EAX), preserves edges
//!
//! # Mutation
//!
//! - [`swap_mutation`]: Exchange two random positions, O(1)
//! - [`insert_mutation`]: Remove and reinsert at random position, O(n)
//! - [`invert_mutation`]: Reverse a random segment, O(n)
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use super::types::{CrossoverOperator, MutationOperator, RepairOperator};
use crate::problem::{Genome, PermutationProblem};
use rand::Rng;

/// Configuration-time choice of a position-based permutation crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PermutationCrossover {
    /// Order crossover (OX).
    #[default]
    Order,
    /// Partially mapped crossover (PMX).
    PartiallyMapped,
}

impl<P: PermutationProblem + ?Sized> CrossoverOperator<P> for PermutationCrossover {
    fn cross<R: Rng + ?Sized>(
        &self,
        _problem: &P,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> (Genome, Genome) {
        match self {
            PermutationCrossover::Order => order_crossover(parent1, parent2, rng),
            PermutationCrossover::PartiallyMapped => pmx_crossover(parent1, parent2, rng),
        }
    }
}

/// Configuration-time choice of a permutation mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PermutationMutation {
    /// Exchange two positions.
    Swap,
    /// Move one item to another position.
    Insert,
    /// Reverse a segment (a random 2-opt move).
    #[default]
    Invert,
}

impl<P: PermutationProblem + ?Sized> MutationOperator<P> for PermutationMutation {
    fn mutate<R: Rng + ?Sized>(&self, _problem: &P, genome: &mut Genome, rng: &mut R) {
        match self {
            PermutationMutation::Swap => swap_mutation(genome, rng),
            PermutationMutation::Insert => insert_mutation(genome, rng),
            PermutationMutation::Invert => invert_mutation(genome, rng),
        }
    }
}

/// Restores a genome to a permutation of `0..problem.size()`.
///
/// Entries that are out of range or repeat an earlier entry are replaced,
/// left to right, by the missing items in ascending order. The genome is
/// truncated or extended to the problem size. A valid permutation is left
/// untouched.
///
/// # Examples
///
/// ```
/// use u_permevo::ga::{PermutationRepair, RepairOperator};
/// use u_permevo::problem::TspProblem;
///
/// let problem = TspProblem::from_coordinates(&[(0.0, 0.0); 5]).unwrap();
/// let mut genome = vec![3, 1, 3, 9, 0];
/// PermutationRepair.repair(&problem, &mut genome);
/// assert_eq!(genome, vec![3, 1, 2, 4, 0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PermutationRepair;

impl<P: PermutationProblem + ?Sized> RepairOperator<P> for PermutationRepair {
    fn repair(&self, problem: &P, genome: &mut Genome) {
        repair_permutation(genome, problem.size());
    }
}

/// Rewrites `genome` into a permutation of `0..n`, keeping every first
/// occurrence of an in-range item in place.
pub fn repair_permutation(genome: &mut Genome, n: usize) {
    genome.resize(n, usize::MAX);

    let mut seen = vec![false; n];
    let mut holes = Vec::new();
    for (pos, &item) in genome.iter().enumerate() {
        if item < n && !seen[item] {
            seen[item] = true;
        } else {
            holes.push(pos);
        }
    }
    if holes.is_empty() {
        return;
    }

    let missing = (0..n).filter(|&item| !seen[item]);
    for (pos, item) in holes.into_iter().zip(missing) {
        genome[pos] = item;
    }
}

// ============================================================================
// Crossover
// ============================================================================

/// Order Crossover (OX).
///
/// Copies a random segment from one parent and fills the remaining
/// positions with the other parent's items in their original cyclic order,
/// starting after the segment.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths or are empty.
pub fn order_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Genome, Genome) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(n > 0, "parents must not be empty");

    if n == 1 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let (start, end) = random_segment(n, rng);
    (
        ox_child(parent1, parent2, start, end),
        ox_child(parent2, parent1, start, end),
    )
}

fn ox_child(template: &[usize], donor: &[usize], start: usize, end: usize) -> Genome {
    let n = template.len();
    let mut child = vec![usize::MAX; n];
    let mut taken = vec![false; n];

    for i in start..=end {
        child[i] = template[i];
        taken[template[i]] = true;
    }

    let mut pos = (end + 1) % n;
    for offset in 0..n {
        let item = donor[(end + 1 + offset) % n];
        if !taken[item] {
            child[pos] = item;
            pos = (pos + 1) % n;
        }
    }
    child
}

/// Partially Mapped Crossover (PMX).
///
/// Copies a random segment from one parent; items of the other parent's
/// segment are relocated through the segment mapping, and the rest are
/// copied by position.
///
/// # Complexity
/// O(n²) worst case for the mapping chains, O(n) space
///
/// # Panics
/// Panics if parents have different lengths or are empty.
pub fn pmx_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Genome, Genome) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(n > 0, "parents must not be empty");

    if n == 1 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let (start, end) = random_segment(n, rng);
    (
        pmx_child(parent1, parent2, start, end),
        pmx_child(parent2, parent1, start, end),
    )
}

fn pmx_child(template: &[usize], donor: &[usize], start: usize, end: usize) -> Genome {
    let n = template.len();
    let mut child = vec![usize::MAX; n];
    let mut placed = vec![false; n];
    let mut donor_pos = vec![0usize; n];
    for (pos, &item) in donor.iter().enumerate() {
        donor_pos[item] = pos;
    }

    for i in start..=end {
        child[i] = template[i];
        placed[template[i]] = true;
    }

    for i in start..=end {
        let item = donor[i];
        if placed[item] {
            continue;
        }
        // Follow template[pos] -> its position in donor until we leave the segment.
        let mut pos = i;
        loop {
            pos = donor_pos[template[pos]];
            if pos < start || pos > end {
                child[pos] = item;
                placed[item] = true;
                break;
            }
        }
    }

    for i in 0..n {
        if child[i] == usize::MAX {
            child[i] = donor[i];
        }
    }
    child
}

// ============================================================================
// Mutation
// ============================================================================

/// Swap mutation: exchange two random positions.
pub fn swap_mutation<R: Rng + ?Sized>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let j = rng.random_range(0..n);
    perm.swap(i, j);
}

/// Insert mutation: remove an item and reinsert it at a random position.
pub fn insert_mutation<R: Rng + ?Sized>(perm: &mut Vec<usize>, rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let from = rng.random_range(0..n);
    let item = perm.remove(from);
    let to = rng.random_range(0..n);
    perm.insert(to, item);
}

/// Invert mutation: reverse a random segment.
pub fn invert_mutation<R: Rng + ?Sized>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let (start, end) = random_segment(n, rng);
    perm[start..=end].reverse();
}

/// Random segment `[start, end]` within `0..n`, `start <= end`.
fn random_segment<R: Rng + ?Sized>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    (a.min(b), a.max(b))
}

#[cfg(test)]
pub(crate) fn is_valid_permutation(perm: &[usize], n: usize) -> bool {
    let mut seen = vec![false; n];
    perm.len() == n
        && perm.iter().all(|&v| {
            if v >= n || seen[v] {
                return false;
            }
            seen[v] = true;
            true
        })
}
