//! Precomputed k-nearest-neighbor candidate lists.

use crate::problem::DistanceProvider;
use std::cmp::Ordering;

/// For every item, its `k` nearest other items in ascending distance order.
///
/// Lists are stored back to back in one flat array, `k` entries per item.
/// Ties are broken by item index. The relation is not symmetric: `a` may list
/// `b` without `b` listing `a`.
///
/// # Examples
///
/// ```
/// use u_permevo::local::CandidateList;
/// use u_permevo::problem::DistanceMatrix;
///
/// let m = DistanceMatrix::from_coordinates(&[(0.0, 0.0), (1.0, 0.0), (5.0, 0.0)]);
/// let list = CandidateList::build(&m, 1);
/// assert_eq!(list.candidates(2), &[1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateList {
    k: usize,
    neighbors: Vec<usize>,
}

impl CandidateList {
    /// Builds the list for every item of `provider`.
    ///
    /// A `k` of zero, or at least the item count, is clamped to `n - 1`.
    ///
    /// # Complexity
    /// O(n² log n)
    pub fn build<D: DistanceProvider + ?Sized>(provider: &D, k: usize) -> Self {
        let n = provider.item_count();
        let k = Self::effective_k(n, k);
        let mut neighbors = Vec::with_capacity(n * k);
        let mut row: Vec<(usize, f64)> = Vec::with_capacity(n.saturating_sub(1));

        for i in 0..n {
            row.clear();
            row.extend((0..n).filter(|&j| j != i).map(|j| (j, provider.distance(i, j))));
            row.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
            neighbors.extend(row.iter().take(k).map(|&(j, _)| j));
        }

        Self { k, neighbors }
    }

    /// The list length actually used for `n` items when `requested` is asked for.
    pub fn effective_k(n: usize, requested: usize) -> usize {
        let max = n.saturating_sub(1);
        if requested == 0 || requested >= n {
            max
        } else {
            requested
        }
    }

    /// Entries per item.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of items covered.
    pub fn len(&self) -> usize {
        if self.k == 0 {
            0
        } else {
            self.neighbors.len() / self.k
        }
    }

    /// Whether the list covers no items (or every list is empty).
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Candidates of `item`, nearest first.
    #[inline]
    pub fn candidates(&self, item: usize) -> &[usize] {
        &self.neighbors[item * self.k..(item + 1) * self.k]
    }

    /// Whether either item lists the other.
    ///
    /// This is the looser OR relation, not mutual membership.
    pub fn are_mutual(&self, a: usize, b: usize) -> bool {
        self.candidates(a).contains(&b) || self.candidates(b).contains(&a)
    }
}
