//! Depth-limited Lin-Kernighan edge exchange.
//!
//! Each step starts from a tour edge `(t1, t2)`, tries to add an edge
//! `(t2, t3)` to one of `t2`'s nearest candidates, and closes the exchange
//! with the unique 2-opt reconnection. Every candidate that yields a valid
//! move is evaluated; there is no partial-gain cutoff on `d(t2, t3)`. The
//! first exchange with positive total gain is applied and the pass restarts.
//!
//! Only depth-1 exchanges are performed. Deeper chains (extending from `t4`
//! while the cumulative gain stays positive) would slot in where the closing
//! move is evaluated.
//!
//! # Reference
//!
//! Lin & Kernighan (1973), "An Effective Heuristic Algorithm for the
//! Traveling-Salesman Problem"

use super::cache::DistanceCache;
use super::candidates::CandidateList;
use super::two_opt::{
    apply_two_opt, is_two_opt_move, rebuild_positions, two_opt_gain_cached, IMPROVEMENT_EPSILON,
};
use crate::ga::LocalSearch;
use crate::problem::{DistanceProvider, Genome, TourProblem};
use tracing::trace;

/// Default number of candidates per city.
pub const DEFAULT_LK_CANDIDATES: usize = 8;

/// Limited-depth Lin-Kernighan local search.
///
/// Runs at most `5 * n` exchange passes per call. Owns its
/// [`DistanceCache`], cleared at the start of every call.
///
/// # Examples
///
/// ```
/// use u_permevo::local::LinKernighan;
/// use u_permevo::problem::TspProblem;
///
/// let problem = TspProblem::from_coordinates(
///     &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
/// ).unwrap();
/// let mut tour = vec![0, 2, 1, 3];
/// let length = LinKernighan::new(3).optimize(&problem, &mut tour);
/// assert!((length - 4.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct LinKernighan {
    candidates: usize,
    cache: DistanceCache,
}

impl Default for LinKernighan {
    fn default() -> Self {
        Self::new(DEFAULT_LK_CANDIDATES)
    }
}

impl LinKernighan {
    /// Creates a search over the `candidates` nearest neighbors of each city.
    pub fn new(candidates: usize) -> Self {
        Self {
            candidates,
            cache: DistanceCache::default(),
        }
    }

    /// Replaces the distance cache with one of `capacity` slots.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = DistanceCache::new(capacity);
        self
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
            self.cache.clear();
            let list = problem.candidate_list(self.candidates);
            let n = tour.len();
            let mut positions = Vec::with_capacity(n);

            let mut exchanges = 0;
            while exchanges < 5 * n {
                rebuild_positions(tour, &mut positions);
                match self.find_exchange(problem, tour, &list, &positions) {
                    Some((i, j)) => {
                        apply_two_opt(tour, i, j);
                        exchanges += 1;
                    }
                    None => break,
                }
            }

            trace!(
                event = "lin_kernighan_end",
                exchanges = exchanges,
                cache_hits = self.cache.hits(),
                cache_misses = self.cache.misses(),
            );
        }
        problem.evaluate(tour)
    }

    /// First improving depth-1 exchange, as a normalized 2-opt move.
    fn find_exchange<D: DistanceProvider + ?Sized>(
        &mut self,
        provider: &D,
        tour: &[usize],
        list: &CandidateList,
        positions: &[usize],
    ) -> Option<(usize, usize)> {
        let n = tour.len();
        for i in 0..n {
            let t1 = tour[i];
            let succ = (i + 1) % n;
            let pred = (i + n - 1) % n;

            // (t2 position, whether t2 follows t1)
            for (t2_pos, forward) in [(succ, true), (pred, false)] {
                let t2 = tour[t2_pos];

                for &t3 in list.candidates(t2) {
                    let p = positions[t3];
                    // Edges (a, a+1) and (b, b+1) whose reconnection adds (t2, t3).
                    let (a, b) = if forward {
                        (i, (p + n - 1) % n)
                    } else {
                        (pred, p)
                    };
                    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                    if !is_two_opt_move(n, lo, hi) {
                        continue;
                    }
                    let gain = two_opt_gain_cached(provider, &mut self.cache, tour, lo, hi);
                    if gain > IMPROVEMENT_EPSILON {
                        return Some((lo, hi));
                    }
                }
            }
        }
        None
    }
}

impl<P: TourProblem> LocalSearch<P> for LinKernighan {
    fn improve(&mut self, problem: &P, genome: &mut Genome) -> f64 {
        self.optimize(problem, genome)
    }
}
