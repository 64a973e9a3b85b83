//! Structure-of-arrays population store.

use crate::problem::Genome;
use rand::Rng;
use std::cmp::Ordering;

/// A fixed-capacity population of `(genome, fitness)` pairs.
///
/// Genomes and fitnesses are kept in two index-aligned arrays so that
/// selection and statistics scan a dense `&[f64]`. The invariant
/// `genomes.len() == fitnesses.len() <= capacity` always holds.
///
/// A population is built fresh each generation and replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct Population {
    genomes: Vec<Genome>,
    fitnesses: Vec<f64>,
    capacity: usize,
}

/// Summary of a population's fitness distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessSummary {
    /// Lowest fitness.
    pub best: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Highest fitness.
    pub worst: f64,
}

impl Population {
    /// Creates an empty population able to hold `capacity` individuals.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            genomes: Vec::with_capacity(capacity),
            fitnesses: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Adds an individual. Returns `false`, leaving the population unchanged,
    /// when it is already full.
    pub fn push(&mut self, genome: Genome, fitness: f64) -> bool {
        if self.is_full() {
            return false;
        }
        self.genomes.push(genome);
        self.fitnesses.push(fitness);
        true
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.fitnesses.len()
    }

    /// Whether the population has no individuals.
    pub fn is_empty(&self) -> bool {
        self.fitnesses.is_empty()
    }

    /// Maximum number of individuals.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `len() == capacity()`.
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Genome of individual `i`.
    pub fn genome(&self, i: usize) -> &[usize] {
        &self.genomes[i]
    }

    /// Fitness of individual `i`.
    pub fn fitness(&self, i: usize) -> f64 {
        self.fitnesses[i]
    }

    /// All genomes, index-aligned with [`fitnesses`](Self::fitnesses).
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// All fitnesses.
    pub fn fitnesses(&self) -> &[f64] {
        &self.fitnesses
    }

    /// Index of the lowest fitness (first one on ties), or `None` if empty.
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, &f) in self.fitnesses.iter().enumerate() {
            match best {
                Some(b) if self.fitnesses[b] <= f => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Indices ordered by ascending fitness. Ties keep index order.
    pub fn ranked_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.sort_by(|&a, &b| {
            self.fitnesses[a]
                .partial_cmp(&self.fitnesses[b])
                .unwrap_or(Ordering::Equal)
        });
        indices
    }

    /// Best, mean, and worst fitness, or `None` if empty.
    pub fn summary(&self) -> Option<FitnessSummary> {
        if self.is_empty() {
            return None;
        }
        let mut best = f64::INFINITY;
        let mut worst = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &f in &self.fitnesses {
            best = best.min(f);
            worst = worst.max(f);
            sum += f;
        }
        let mut mean = sum / self.len() as f64;
        // Rounding can push the mean of equal values one ulp past them.
        if best <= worst {
            mean = mean.clamp(best, worst);
        }
        Some(FitnessSummary {
            best,
            mean,
            worst,
        })
    }

    /// Mean pairwise Hamming distance between genomes, as a fraction of
    /// differing positions in `[0, 1]`.
    ///
    /// Uses every pair when `len() <= exhaustive_threshold`; otherwise draws
    /// `max_samples` random pairs of distinct individuals, which keeps the
    /// cost independent of population size.
    pub fn diversity<R: Rng + ?Sized>(
        &self,
        exhaustive_threshold: usize,
        max_samples: usize,
        rng: &mut R,
    ) -> f64 {
        let n = self.len();
        if n < 2 {
            return 0.0;
        }

        if n <= exhaustive_threshold {
            let mut total = 0.0;
            let mut pairs = 0usize;
            for a in 0..n {
                for b in (a + 1)..n {
                    total += hamming_fraction(&self.genomes[a], &self.genomes[b]);
                    pairs += 1;
                }
            }
            return total / pairs as f64;
        }

        let samples = max_samples.max(1);
        let mut total = 0.0;
        for _ in 0..samples {
            let a = rng.random_range(0..n);
            let mut b = rng.random_range(0..n - 1);
            if b >= a {
                b += 1;
            }
            total += hamming_fraction(&self.genomes[a], &self.genomes[b]);
        }
        total / samples as f64
    }
}

/// Fraction of positions at which `a` and `b` differ.
///
/// Positions beyond the shorter genome count as differing.
pub fn hamming_fraction(a: &[usize], b: &[usize]) -> f64 {
    let len = a.len().max(b.len());
    if len == 0 {
        return 0.0;
    }
    let same = a.iter().zip(b).filter(|(x, y)| x == y).count();
    (len - same) as f64 / len as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn population(fitnesses: &[f64]) -> Population {
        let mut pop = Population::with_capacity(fitnesses.len());
        for (i, &f) in fitnesses.iter().enumerate() {
            assert!(pop.push(vec![i], f));
        }
        pop
    }

    #[test]
    fn test_push_respects_capacity() {
        let mut pop = Population::with_capacity(2);
        assert!(pop.push(vec![0, 1], 1.0));
        assert!(pop.push(vec![1, 0], 2.0));
        assert!(!pop.push(vec![0, 1], 3.0));
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.genomes().len(), pop.fitnesses().len());
        assert!(pop.is_full());
    }

    #[test]
    fn test_best_index_first_on_ties() {
        let pop = population(&[3.0, 1.0, 2.0, 1.0]);
        assert_eq!(pop.best_index(), Some(1));
        assert_eq!(Population::default().best_index(), None);
    }

    #[test]
    fn test_ranked_indices_stable() {
        let pop = population(&[2.0, 1.0, 2.0, 0.5, 1.0]);
        assert_eq!(pop.ranked_indices(), vec![3, 1, 4, 0, 2]);
    }

    #[test]
    fn test_summary() {
        let pop = population(&[2.0, 4.0, 6.0]);
        let s = pop.summary().unwrap();
        assert_eq!(s.best, 2.0);
        assert_eq!(s.worst, 6.0);
        assert!((s.mean - 4.0).abs() < 1e-12);
        assert!(Population::default().summary().is_none());
    }

    #[test]
    fn test_summary_mean_within_bounds_for_equal_fitnesses() {
        let pop = population(&[8.410485950839155; 21]);
        let s = pop.summary().unwrap();
        assert!(s.best <= s.mean && s.mean <= s.worst);
        assert_eq!(s.mean, 8.410485950839155);
    }

    #[test]
    fn test_hamming_fraction() {
        assert_eq!(hamming_fraction(&[0, 1, 2, 3], &[0, 1, 2, 3]), 0.0);
        assert_eq!(hamming_fraction(&[0, 1, 2, 3], &[1, 0, 2, 3]), 0.5);
        assert_eq!(hamming_fraction(&[], &[]), 0.0);
    }

    #[test]
    fn test_diversity_identical_is_zero() {
        let mut pop = Population::with_capacity(4);
        for _ in 0..4 {
            pop.push(vec![0, 1, 2, 3], 1.0);
        }
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pop.diversity(100, 10, &mut rng), 0.0);
        assert_eq!(pop.diversity(2, 10, &mut rng), 0.0);
    }

    #[test]
    fn test_diversity_exhaustive() {
        let mut pop = Population::with_capacity(3);
        pop.push(vec![0, 1, 2, 3], 1.0);
        pop.push(vec![1, 0, 2, 3], 1.0);
        pop.push(vec![0, 1, 3, 2], 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        // pairs: 0.5, 0.5, 1.0
        let d = pop.diversity(10, 1, &mut rng);
        assert!((d - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_diversity_sampled_never_pairs_with_self() {
        // Two distinct genomes: any pair of distinct individuals differs fully.
        let mut pop = Population::with_capacity(2);
        pop.push(vec![0, 1], 1.0);
        pop.push(vec![1, 0], 1.0);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pop.diversity(1, 500, &mut rng), 1.0);
    }

    #[test]
    fn test_single_individual_diversity() {
        let pop = population(&[1.0]);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pop.diversity(10, 10, &mut rng), 0.0);
    }
}
