//! Edge Assembly Crossover (EAX) for tours.
//!
//! The child starts from parent A's edge set. Edges present in exactly one
//! parent are decomposed into AB-cycles, closed walks that alternate
//! between A-only and B-only edges. Each AB-cycle is applied with an
//! independent probability of one half: its A edges are removed from the
//! child and its B edges added. The result keeps every node at degree two
//! but may fall apart into several subtours, which are then merged greedily
//! (smallest first) with the cheapest 2-exchange reachable through the
//! candidate list.
//!
//! # Reference
//!
//! Nagata & Kobayashi (1997), "Edge Assembly Crossover: A High-power
//! Genetic Algorithm for the Traveling Salesman Problem"

use super::types::CrossoverOperator;
use crate::local::CandidateList;
use crate::problem::{DistanceProvider, Genome, TourProblem};
use rand::Rng;

/// Probability of applying each AB-cycle.
const CYCLE_APPLY_PROB: f64 = 0.5;

const NONE: usize = usize::MAX;

/// Up to two neighbors per node; `NONE` marks an empty slot.
type Adjacency = Vec<[usize; 2]>;

/// Edge Assembly Crossover.
///
/// Produces `eax(A, B)` and `eax(B, A)`. Tours shorter than four items are
/// returned as copies of the parents.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use u_permevo::ga::{CrossoverOperator, EdgeAssemblyCrossover};
/// use u_permevo::problem::TspProblem;
///
/// let points: Vec<(f64, f64)> = (0..8).map(|i| (i as f64, (i * i % 5) as f64)).collect();
/// let problem = TspProblem::from_coordinates(&points).unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(3);
/// let a: Vec<usize> = (0..8).collect();
/// let b = vec![0, 2, 4, 6, 1, 3, 5, 7];
/// let (c1, c2) = EdgeAssemblyCrossover::default().cross(&problem, &a, &b, &mut rng);
/// assert_eq!(c1.len(), 8);
/// assert_eq!(c2.len(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeAssemblyCrossover {
    /// Neighbors considered per node when merging subtours.
    pub candidate_k: usize,
}

impl Default for EdgeAssemblyCrossover {
    fn default() -> Self {
        Self { candidate_k: 10 }
    }
}

impl EdgeAssemblyCrossover {
    /// Creates an EAX that merges subtours over `candidate_k` neighbors.
    pub fn new(candidate_k: usize) -> Self {
        Self { candidate_k }
    }
}

impl<P: TourProblem + ?Sized> CrossoverOperator<P> for EdgeAssemblyCrossover {
    fn cross<R: Rng + ?Sized>(
        &self,
        problem: &P,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> (Genome, Genome) {
        let n = parent1.len();
        if n < 4 || parent2.len() != n {
            return (parent1.to_vec(), parent2.to_vec());
        }

        let list = problem.candidate_list(self.candidate_k);
        let a = adjacency(parent1);
        let b = adjacency(parent2);
        (
            assemble(problem, &list, &a, &b, rng),
            assemble(problem, &list, &b, &a, rng),
        )
    }
}

fn assemble<D: DistanceProvider + ?Sized, R: Rng + ?Sized>(
    provider: &D,
    list: &CandidateList,
    a: &[[usize; 2]],
    b: &[[usize; 2]],
    rng: &mut R,
) -> Genome {
    let mut child = a.to_vec();
    let cycles = ab_cycles(a, b, rng);
    apply_cycles(&mut child, &cycles, rng);
    merge_subtours(provider, list, &mut child);
    to_tour(&child)
}

/// Swaps the A edges of each cycle for its B edges with probability
/// `CYCLE_APPLY_PROB`, independently per cycle. Returns how many were applied.
fn apply_cycles<R: Rng + ?Sized>(
    child: &mut [[usize; 2]],
    cycles: &[Vec<usize>],
    rng: &mut R,
) -> usize {
    let mut applied = 0;
    for cycle in cycles {
        if !rng.random_bool(CYCLE_APPLY_PROB) {
            continue;
        }
        let len = cycle.len();
        for i in (0..len).step_by(2) {
            unlink(child, cycle[i], cycle[i + 1]);
        }
        for i in (1..len).step_by(2) {
            link(child, cycle[i], cycle[(i + 1) % len]);
        }
        applied += 1;
    }
    applied
}

fn adjacency(tour: &[usize]) -> Adjacency {
    let n = tour.len();
    let mut adj = vec![[NONE; 2]; n];
    for p in 0..n {
        adj[tour[p]] = [tour[(p + n - 1) % n], tour[(p + 1) % n]];
    }
    adj
}

/// Edges of `x` that `y` lacks, per node.
fn exclusive(x: &[[usize; 2]], y: &[[usize; 2]]) -> Adjacency {
    x.iter()
        .zip(y)
        .map(|(xs, ys)| xs.map(|v| if ys.contains(&v) { NONE } else { v }))
        .collect()
}

fn link(adj: &mut [[usize; 2]], u: usize, v: usize) {
    if let Some(slot) = adj[u].iter_mut().find(|s| **s == NONE) {
        *slot = v;
    }
    if let Some(slot) = adj[v].iter_mut().find(|s| **s == NONE) {
        *slot = u;
    }
}

fn unlink(adj: &mut [[usize; 2]], u: usize, v: usize) {
    if let Some(slot) = adj[u].iter_mut().find(|s| **s == v) {
        *slot = NONE;
    }
    if let Some(slot) = adj[v].iter_mut().find(|s| **s == u) {
        *slot = NONE;
    }
}

fn pick<R: Rng + ?Sized>(slots: [usize; 2], rng: &mut R) -> Option<usize> {
    match slots {
        [NONE, NONE] => None,
        [v, NONE] | [NONE, v] => Some(v),
        [v, w] => Some(if rng.random_bool(0.5) { v } else { w }),
    }
}

/// Decomposes the symmetric difference of `a` and `b` into AB-cycles.
///
/// Each cycle `c` is a node sequence of even length where `(c[2i], c[2i+1])`
/// are A edges and `(c[2i+1], c[2i+2])` (cyclically) are B edges.
fn ab_cycles<R: Rng + ?Sized>(a: &[[usize; 2]], b: &[[usize; 2]], rng: &mut R) -> Vec<Vec<usize>> {
    let n = a.len();
    let mut remaining = [exclusive(a, b), exclusive(b, a)];
    // Path position at which a node waits to leave along an A edge.
    let mut ready_a = vec![NONE; n];
    let mut cycles = Vec::new();
    let mut path: Vec<usize> = Vec::new();

    for start in 0..n {
        while remaining[0][start] != [NONE, NONE] {
            path.clear();
            path.push(start);
            ready_a[start] = 0;

            loop {
                let pos = path.len() - 1;
                let u = path[pos];
                let side = pos % 2;
                let Some(v) = pick(remaining[side][u], rng) else {
                    break;
                };
                unlink(&mut remaining[side], u, v);

                if side == 1 && ready_a[v] != NONE {
                    let k = ready_a[v];
                    cycles.push(path[k..].to_vec());
                    for p in ((k + 2)..path.len()).step_by(2) {
                        ready_a[path[p]] = NONE;
                    }
                    path.truncate(k + 1);
                } else {
                    if side == 1 {
                        ready_a[v] = path.len();
                    }
                    path.push(v);
                }
            }

            for p in (0..path.len()).step_by(2) {
                ready_a[path[p]] = NONE;
            }
        }
    }
    cycles
}

/// Node sequences of every cycle in `adj`.
fn subtours(adj: &[[usize; 2]]) -> Vec<Vec<usize>> {
    let n = adj.len();
    let mut seen = vec![false; n];
    let mut tours = Vec::new();
    for start in 0..n {
        if seen[start] {
            continue;
        }
        let mut tour = Vec::new();
        let mut prev = NONE;
        let mut cur = start;
        loop {
            seen[cur] = true;
            tour.push(cur);
            let [x, y] = adj[cur];
            let next = if x != prev { x } else { y };
            prev = cur;
            cur = next;
            if cur == NONE || cur == start || seen[cur] {
                break;
            }
        }
        tours.push(tour);
    }
    tours
}

/// A 2-exchange that removes `(u, u2)` and `(x, y)` and adds `(u, x)` and
/// `(u2, y)`.
#[derive(Debug, Clone, Copy)]
struct Join {
    delta: f64,
    u: usize,
    u2: usize,
    x: usize,
    y: usize,
}

fn merge_subtours<D: DistanceProvider + ?Sized>(
    provider: &D,
    list: &CandidateList,
    adj: &mut [[usize; 2]],
) {
    let n = adj.len();
    loop {
        let tours = subtours(adj);
        let Some(smallest) = tours.iter().min_by_key(|t| t.len()) else {
            return;
        };
        if tours.len() <= 1 {
            return;
        }

        let mut inside = vec![false; n];
        for &v in smallest {
            inside[v] = true;
        }

        let join = best_join(provider, adj, smallest, &inside, |u| {
            list.candidates(u).iter().copied()
        })
        .or_else(|| best_join(provider, adj, smallest, &inside, |_| 0..n));
        let Some(Join { u, u2, x, y, .. }) = join else {
            return;
        };

        unlink(adj, u, u2);
        unlink(adj, x, y);
        link(adj, u, x);
        link(adj, u2, y);
    }
}

fn best_join<D, F, I>(
    provider: &D,
    adj: &[[usize; 2]],
    subtour: &[usize],
    inside: &[bool],
    targets: F,
) -> Option<Join>
where
    D: DistanceProvider + ?Sized,
    F: Fn(usize) -> I,
    I: Iterator<Item = usize>,
{
    let d = |i: usize, j: usize| provider.distance(i, j);
    let mut best: Option<Join> = None;
    let mut consider = |join: Join| {
        match best {
            Some(b) if b.delta <= join.delta => {}
            _ => best = Some(join),
        }
    };

    for &u in subtour {
        for &u2 in &adj[u] {
            if u2 == NONE {
                continue;
            }
            for v in targets(u).filter(|&v| !inside[v]) {
                for &v2 in &adj[v] {
                    if v2 == NONE {
                        continue;
                    }
                    let removed = d(u, u2) + d(v, v2);
                    consider(Join {
                        delta: d(u, v) + d(u2, v2) - removed,
                        u,
                        u2,
                        x: v,
                        y: v2,
                    });
                    consider(Join {
                        delta: d(u, v2) + d(u2, v) - removed,
                        u,
                        u2,
                        x: v2,
                        y: v,
                    });
                }
            }
        }
    }
    best
}

/// Walks a single-cycle adjacency from item 0.
fn to_tour(adj: &[[usize; 2]]) -> Genome {
    subtours(adj).into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::operators::is_valid_permutation;
    use crate::problem::{tour_length, TspProblem};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn random_instance(n: usize, seed: u64) -> TspProblem {
        let mut rng = StdRng::seed_from_u64(seed);
        let points: Vec<(f64, f64)> = (0..n)
            .map(|_| (rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
            .collect();
        TspProblem::from_coordinates(&points).unwrap()
    }

    fn random_tour(n: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut tour: Vec<usize> = (0..n).collect();
        tour.shuffle(rng);
        tour
    }

    fn has_edge(adj: &[[usize; 2]], u: usize, v: usize) -> bool {
        adj[u].contains(&v)
    }

    #[test]
    fn test_children_are_permutations() {
        let problem = random_instance(30, 1);
        let mut rng = StdRng::seed_from_u64(2);
        let eax = EdgeAssemblyCrossover::default();
        for _ in 0..50 {
            let a = random_tour(30, &mut rng);
            let b = random_tour(30, &mut rng);
            let (c1, c2) = eax.cross(&problem, &a, &b, &mut rng);
            assert!(is_valid_permutation(&c1, 30), "{c1:?}");
            assert!(is_valid_permutation(&c2, 30), "{c2:?}");
        }
    }

    #[test]
    fn test_identical_parents_keep_tour() {
        let problem = random_instance(12, 4);
        let mut rng = StdRng::seed_from_u64(5);
        let a = random_tour(12, &mut rng);
        let (c1, c2) = EdgeAssemblyCrossover::default().cross(&problem, &a, &a, &mut rng);
        let expected = tour_length(&problem, &a);
        assert!((tour_length(&problem, &c1) - expected).abs() < 1e-9);
        assert!((tour_length(&problem, &c2) - expected).abs() < 1e-9);
        assert_eq!(c1[0], 0);
    }

    #[test]
    fn test_short_tours_are_copied() {
        let problem = random_instance(3, 6);
        let mut rng = StdRng::seed_from_u64(7);
        let (c1, c2) =
            EdgeAssemblyCrossover::default().cross(&problem, &[0, 1, 2], &[2, 1, 0], &mut rng);
        assert_eq!(c1, vec![0, 1, 2]);
        assert_eq!(c2, vec![2, 1, 0]);
    }

    #[test]
    fn test_ab_cycles_partition_differing_edges() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..20 {
            let a = adjacency(&random_tour(20, &mut rng));
            let b = adjacency(&random_tour(20, &mut rng));
            let cycles = ab_cycles(&a, &b, &mut rng);

            let differing: usize = (0..20)
                .flat_map(|u| a[u].iter().map(move |&v| (u, v)))
                .filter(|&(u, v)| !has_edge(&b, u, v))
                .count();
            // Counted from both endpoints, which matches A-only plus B-only.
            let cycle_edges: usize = cycles.iter().map(Vec::len).sum();
            assert_eq!(cycle_edges, differing);

            for cycle in &cycles {
                assert_eq!(cycle.len() % 2, 0);
                let len = cycle.len();
                for i in 0..len {
                    let (u, v) = (cycle[i], cycle[(i + 1) % len]);
                    if i % 2 == 0 {
                        assert!(has_edge(&a, u, v) && !has_edge(&b, u, v));
                    } else {
                        assert!(has_edge(&b, u, v) && !has_edge(&a, u, v));
                    }
                }
            }
        }
    }

    #[test]
    fn test_cycles_applied_independently_at_half_rate() {
        let mut rng = StdRng::seed_from_u64(9);
        let (a, b, cycles) = (0..50)
            .map(|_| {
                let a = adjacency(&random_tour(40, &mut rng));
                let b = adjacency(&random_tour(40, &mut rng));
                let cycles = ab_cycles(&a, &b, &mut rng);
                (a, b, cycles)
            })
            .find(|(_, _, cycles)| cycles.len() >= 3)
            .unwrap();

        let draws = 400;
        let mut applied_total = 0;
        let mut partial = 0;
        for _ in 0..draws {
            let mut child = a.clone();
            let applied = apply_cycles(&mut child, &cycles, &mut rng);
            applied_total += applied;
            if applied > 0 && applied < cycles.len() {
                partial += 1;
            }
            for u in 0..40 {
                for &v in child[u].iter().filter(|&&v| v != NONE) {
                    assert!(has_edge(&a, u, v) || has_edge(&b, u, v));
                }
            }
        }

        assert!(partial > 0);
        let rate = applied_total as f64 / (draws * cycles.len()) as f64;
        assert!((0.4..0.6).contains(&rate), "rate {rate}");
    }

    #[test]
    fn test_merge_joins_two_triangles() {
        let points = [
            (0.0, 0.0),
            (1.0, 0.0),
            (0.0, 1.0),
            (10.0, 0.0),
            (11.0, 0.0),
            (10.0, 1.0),
        ];
        let problem = TspProblem::from_coordinates(&points).unwrap();
        let list = problem.candidate_list(2);
        let mut adj: Adjacency = vec![[NONE; 2]; 6];
        for (u, v) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
            link(&mut adj, u, v);
        }
        assert_eq!(subtours(&adj).len(), 2);

        merge_subtours(&problem, &list, &mut adj);
        assert_eq!(subtours(&adj).len(), 1);
        assert!(is_valid_permutation(&to_tour(&adj), 6));
    }
}
