//! 2-opt local search with cached delta evaluation.
//!
//! A 2-opt move removes edges `(t[i], t[i+1])` and `(t[j], t[j+1])` (indices
//! modulo `n`, `i < j`) and reconnects the tour by reversing `t[i+1..=j]`.
//! Its gain is
//!
//! ```text
//! gain = d(t[i], t[i+1]) + d(t[j], t[j+1]) - d(t[i], t[j]) - d(t[i+1], t[j+1])
//! ```
//!
//! Positive gain shortens the tour by exactly that amount.
//!
//! # Reference
//!
//! Croes (1958), "A Method for Solving Traveling-Salesman Problems"

use super::cache::DistanceCache;
use super::candidates::CandidateList;
use crate::ga::LocalSearch;
use crate::problem::{DistanceProvider, Genome, TourProblem};
use tracing::trace;

/// Minimum gain for a move to count as improving. Guards against
/// floating-point noise cycling the search.
pub const IMPROVEMENT_EPSILON: f64 = 1e-10;

/// Whether `(i, j)` names two non-adjacent edges of an `n`-item tour.
///
/// Requires `i < j < n`. Rejects neighboring edges (`j == i + 1`) and the
/// wraparound pair `(0, n - 1)`, which share a city.
#[inline]
pub fn is_two_opt_move(n: usize, i: usize, j: usize) -> bool {
    i < j && j < n && j != i + 1 && !(i == 0 && j == n - 1)
}

/// Gain of the 2-opt move `(i, j)`, computed directly from the provider.
#[inline]
pub fn two_opt_gain<D: DistanceProvider + ?Sized>(
    provider: &D,
    tour: &[usize],
    i: usize,
    j: usize,
) -> f64 {
    let n = tour.len();
    let (a, b) = (tour[i], tour[(i + 1) % n]);
    let (c, d) = (tour[j], tour[(j + 1) % n]);
    provider.distance(a, b) + provider.distance(c, d)
        - provider.distance(a, c)
        - provider.distance(b, d)
}

/// Gain of the 2-opt move `(i, j)`, with lookups served from `cache`.
#[inline]
pub fn two_opt_gain_cached<D: DistanceProvider + ?Sized>(
    provider: &D,
    cache: &mut DistanceCache,
    tour: &[usize],
    i: usize,
    j: usize,
) -> f64 {
    let n = tour.len();
    let (a, b) = (tour[i], tour[(i + 1) % n]);
    let (c, d) = (tour[j], tour[(j + 1) % n]);
    cache.distance(provider, a, b) + cache.distance(provider, c, d)
        - cache.distance(provider, a, c)
        - cache.distance(provider, b, d)
}

/// Applies the 2-opt move `(i, j)` by reversing `tour[i+1..=j]`.
#[inline]
pub fn apply_two_opt(tour: &mut [usize], i: usize, j: usize) {
    debug_assert!(i < j && j < tour.len());
    tour[i + 1..=j].reverse();
}

/// Writes the position of every item of `tour` into `positions`.
pub(crate) fn rebuild_positions(tour: &[usize], positions: &mut Vec<usize>) {
    positions.clear();
    positions.resize(tour.len(), 0);
    for (pos, &item) in tour.iter().enumerate() {
        positions[item] = pos;
    }
}

/// How moves are picked within one scan of the neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImprovementStrategy {
    /// Apply the first improving move, then restart the scan.
    FirstImprovement,
    /// Scan everything, apply only the single best move.
    #[default]
    BestImprovement,
}

/// Which `j` are examined for a given `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Neighborhood {
    /// All eligible pairs: O(n²) per scan.
    #[default]
    Full,
    /// Only positions of the `k` nearest candidates of `t[i]`: O(n·k) per scan.
    Candidates(usize),
}

/// 2-opt local search.
///
/// Owns the [`DistanceCache`] it uses; the cache is cleared at the start of
/// every call, so one `TwoOpt` must not be shared between threads.
///
/// # Examples
///
/// ```
/// use u_permevo::local::TwoOpt;
/// use u_permevo::problem::TspProblem;
///
/// let problem = TspProblem::from_coordinates(
///     &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
/// ).unwrap();
/// let mut tour = vec![0, 2, 1, 3];
/// let length = TwoOpt::best_improvement().optimize(&problem, &mut tour);
/// assert!((length - 4.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct TwoOpt {
    strategy: ImprovementStrategy,
    neighborhood: Neighborhood,
    max_iterations: Option<usize>,
    cache: DistanceCache,
}

impl Default for TwoOpt {
    fn default() -> Self {
        Self::best_improvement()
    }
}

impl TwoOpt {
    /// Creates a search with the given strategy and the full neighborhood.
    pub fn new(strategy: ImprovementStrategy) -> Self {
        Self {
            strategy,
            neighborhood: Neighborhood::Full,
            max_iterations: None,
            cache: DistanceCache::default(),
        }
    }

    /// First-improvement 2-opt over all pairs.
    pub fn first_improvement() -> Self {
        Self::new(ImprovementStrategy::FirstImprovement)
    }

    /// Best-improvement 2-opt over all pairs.
    pub fn best_improvement() -> Self {
        Self::new(ImprovementStrategy::BestImprovement)
    }

    /// Restricts the scan to the `k` nearest candidates of each city.
    pub fn with_candidates(mut self, k: usize) -> Self {
        self.neighborhood = Neighborhood::Candidates(k);
        self
    }

    /// Caps the number of applied moves per call.
    ///
    /// Defaults to `max(1000, 10 * n)`.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Replaces the distance cache with one of `capacity` slots.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = DistanceCache::new(capacity);
        self
    }

    /// The move selection strategy.
    pub fn strategy(&self) -> ImprovementStrategy {
        self.strategy
    }

    /// The scanned neighborhood.
    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    /// The cache, with counters from the most recent call.
    pub fn cache(&self) -> &DistanceCache {
        &self.cache
    }

    /// Improves `tour` in place and returns its resulting fitness.
    ///
    /// Tours shorter than four items are evaluated and returned unchanged.
    pub fn optimize<P: TourProblem + ?Sized>(&mut self, problem: &P, tour: &mut [usize]) -> f64 {
        if tour.len() >= 4 {
            let moves = self.run(problem, tour);
            trace!(
                event = "two_opt_end",
                moves = moves,
                cache_hits = self.cache.hits(),
                cache_misses = self.cache.misses(),
            );
        }
        problem.evaluate(tour)
    }

    /// Applies moves until none improves or the cap is reached.
    /// Returns the number of moves applied.
    fn run<P: TourProblem + ?Sized>(&mut self, problem: &P, tour: &mut [usize]) -> usize {
        self.cache.clear();
        let n = tour.len();
        let cap = self.max_iterations.unwrap_or_else(|| (10 * n).max(1000));

        let candidates = match self.neighborhood {
            Neighborhood::Full => None,
            Neighborhood::Candidates(k) => Some(problem.candidate_list(k)),
        };
        let mut positions = Vec::with_capacity(n);

        let mut moves = 0;
        while moves < cap {
            let found = match candidates.as_deref() {
                None => self.scan_full(problem, tour),
                Some(list) => {
                    rebuild_positions(tour, &mut positions);
                    self.scan_candidates(problem, tour, list, &positions)
                }
            };
            match found {
                Some((i, j)) => {
                    apply_two_opt(tour, i, j);
                    moves += 1;
                }
                None => break,
            }
        }
        moves
    }

    fn scan_full<D: DistanceProvider + ?Sized>(
        &mut self,
        provider: &D,
        tour: &[usize],
    ) -> Option<(usize, usize)> {
        let n = tour.len();
        let mut best: Option<(usize, usize)> = None;
        let mut best_gain = IMPROVEMENT_EPSILON;

        for i in 0..n - 2 {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let gain = two_opt_gain_cached(provider, &mut self.cache, tour, i, j);
                if gain > best_gain {
                    if self.strategy == ImprovementStrategy::FirstImprovement {
                        return Some((i, j));
                    }
                    best_gain = gain;
                    best = Some((i, j));
                }
            }
        }
        best
    }

    fn scan_candidates<D: DistanceProvider + ?Sized>(
        &mut self,
        provider: &D,
        tour: &[usize],
        list: &CandidateList,
        positions: &[usize],
    ) -> Option<(usize, usize)> {
        let n = tour.len();
        let mut best: Option<(usize, usize)> = None;
        let mut best_gain = IMPROVEMENT_EPSILON;

        for i in 0..n {
            for &c in list.candidates(tour[i]) {
                let p = positions[c];
                let (lo, hi) = if i < p { (i, p) } else { (p, i) };
                if !is_two_opt_move(n, lo, hi) {
                    continue;
                }
                let gain = two_opt_gain_cached(provider, &mut self.cache, tour, lo, hi);
                if gain > best_gain {
                    if self.strategy == ImprovementStrategy::FirstImprovement {
                        return Some((lo, hi));
                    }
                    best_gain = gain;
                    best = Some((lo, hi));
                }
            }
        }
        best
    }
}

impl<P: TourProblem> LocalSearch<P> for TwoOpt {
    fn improve(&mut self, problem: &P, genome: &mut Genome) -> f64 {
        self.optimize(problem, genome)
    }
}
