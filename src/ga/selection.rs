//! Selection strategies for the GA.
//!
//! Selection determines which individuals are chosen as parents for
//! crossover. Different strategies provide different selection pressure.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::types::SelectionOperator;
use rand::Rng;
use std::cmp::Ordering;

/// Selection strategy for choosing parents.
///
/// All strategies assume **minimization** (lower fitness = better).
///
/// # Examples
///
/// ```
/// use u_permevo::ga::{Selection, SelectionOperator};
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let idx = Selection::Tournament(3).select(&[4.0, 1.0, 9.0], &mut rng);
/// assert!(idx < 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Tournament selection: pick `k` individuals at random, select the best.
    ///
    /// Higher `k` = stronger selection pressure.
    /// - k=2: light pressure (good for diversity)
    /// - k=3-5: moderate pressure (typical default)
    /// - k>5: strong pressure (risk of premature convergence)
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// Since we minimize, weights are `max_fitness - fitness + ε`.
    ///
    /// # Complexity
    /// O(n) per selection
    Roulette,

    /// Linear rank-based selection: the best of `n` gets weight `n`, the
    /// worst gets weight 1.
    ///
    /// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
    /// Algorithms"
    ///
    /// # Complexity
    /// O(n log n) per selection
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl SelectionOperator for Selection {
    /// # Panics
    /// Panics if `fitnesses` is empty.
    fn select<R: Rng + ?Sized>(&self, fitnesses: &[f64], rng: &mut R) -> usize {
        assert!(!fitnesses.is_empty(), "cannot select from empty population");

        match self {
            Selection::Tournament(k) => tournament(fitnesses, *k, rng),
            Selection::Roulette => roulette(fitnesses, rng),
            Selection::Rank => rank(fitnesses, rng),
        }
    }
}

fn tournament<R: Rng + ?Sized>(fitnesses: &[f64], k: usize, rng: &mut R) -> usize {
    let k = k.max(1);
    let n = fitnesses.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if fitnesses[idx] < fitnesses[best_idx] {
            best_idx = idx;
        }
    }
    best_idx
}

fn roulette<R: Rng + ?Sized>(fitnesses: &[f64], rng: &mut R) -> usize {
    let n = fitnesses.len();
    if n == 1 {
        return 0;
    }

    let max_fitness = fitnesses.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let epsilon = 1e-10;

    // Invert: lower fitness -> higher weight
    let weights: Vec<f64> = fitnesses
        .iter()
        .map(|&f| {
            let w = max_fitness - f + epsilon;
            if w > 0.0 {
                w
            } else {
                epsilon
            }
        })
        .collect();

    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

fn rank<R: Rng + ?Sized>(fitnesses: &[f64], rng: &mut R) -> usize {
    let n = fitnesses.len();
    if n == 1 {
        return 0;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        fitnesses[a]
            .partial_cmp(&fitnesses[b])
            .unwrap_or(Ordering::Equal)
    });

    let total: f64 = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;

    for (rank, &original_idx) in order.iter().enumerate() {
        cumulative += (n - rank) as f64;
        if cumulative > threshold {
            return original_idx;
        }
    }

    order[n - 1] // fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn counts(selection: Selection, fitnesses: &[f64]) -> Vec<u32> {
        let mut rng = rng();
        let mut counts = vec![0u32; fitnesses.len()];
        for _ in 0..10_000 {
            counts[selection.select(fitnesses, &mut rng)] += 1;
        }
        counts
    }

    #[test]
    fn test_tournament_favors_best() {
        let counts = counts(Selection::Tournament(4), &[10.0, 5.0, 1.0, 8.0]);
        assert!(
            counts[2] > 6000,
            "expected best to be selected >60% of the time, got {counts:?}"
        );
    }

    #[test]
    fn test_tournament_size_1_is_random() {
        let counts = counts(Selection::Tournament(1), &[10.0, 5.0, 1.0, 8.0]);
        for &c in &counts {
            assert!(c > 1500, "expected uniform, got counts: {counts:?}");
        }
    }

    #[test]
    fn test_roulette_favors_best() {
        let counts = counts(Selection::Roulette, &[100.0, 50.0, 1.0, 80.0]);
        assert!(counts[2] > counts[0], "{counts:?}");
    }

    #[test]
    fn test_rank_favors_best() {
        let counts = counts(Selection::Rank, &[100.0, 50.0, 1.0, 80.0]);
        assert!(counts[2] > counts[0], "{counts:?}");
    }

    #[test]
    fn test_single_individual() {
        let mut rng = rng();
        assert_eq!(Selection::Tournament(3).select(&[5.0], &mut rng), 0);
        assert_eq!(Selection::Roulette.select(&[5.0], &mut rng), 0);
        assert_eq!(Selection::Rank.select(&[5.0], &mut rng), 0);
    }

    #[test]
    fn test_equal_fitness_roughly_uniform() {
        let counts = counts(Selection::Tournament(2), &[5.0, 5.0, 5.0, 5.0]);
        for &c in &counts {
            assert!(c > 1500, "expected roughly uniform, got {counts:?}");
        }
    }

    #[test]
    fn test_roulette_non_finite_falls_back() {
        let mut rng = rng();
        let idx = Selection::Roulette.select(&[f64::INFINITY, 1.0], &mut rng);
        assert!(idx < 2);
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let mut rng = rng();
        Selection::Tournament(3).select(&[], &mut rng);
    }
}
