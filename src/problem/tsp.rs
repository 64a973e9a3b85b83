//! Symmetric Traveling Salesman Problem.

use super::{tour_length, DistanceMatrix, DistanceProvider, PermutationProblem, TourProblem};
use crate::error::{Error, Result};
use crate::local::CandidateList;
use std::sync::{Arc, PoisonError, RwLock};

/// Symmetric TSP over a [`DistanceMatrix`].
///
/// Fitness is the cyclic tour length. The matrix is immutable for the life of
/// the problem; the candidate list is built lazily and replaced whenever a
/// different `k` is requested.
///
/// # Examples
///
/// ```
/// use u_permevo::problem::{PermutationProblem, TspProblem};
///
/// let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
/// let problem = TspProblem::from_coordinates(&square).unwrap();
/// assert_eq!(problem.size(), 4);
/// assert!((problem.evaluate(&[0, 1, 2, 3]) - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct TspProblem {
    distances: DistanceMatrix,
    candidates: RwLock<Option<Arc<CandidateList>>>,
}

impl TspProblem {
    /// Creates a problem from a distance matrix.
    pub fn new(distances: DistanceMatrix) -> Result<Self> {
        if distances.item_count() == 0 {
            return Err(Error::EmptyProblem);
        }
        Ok(Self {
            distances,
            candidates: RwLock::new(None),
        })
    }

    /// Creates a Euclidean problem from 2-D coordinates.
    pub fn from_coordinates(points: &[(f64, f64)]) -> Result<Self> {
        Self::new(DistanceMatrix::from_coordinates(points))
    }

    /// Creates a problem from nested distance rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        Self::new(DistanceMatrix::from_rows(rows)?)
    }

    /// Returns the underlying distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Cyclic tour length of `tour`.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        tour_length(&self.distances, tour)
    }
}

impl DistanceProvider for TspProblem {
    fn item_count(&self) -> usize {
        self.distances.item_count()
    }

    #[inline]
    fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances.distance(i, j)
    }
}

impl PermutationProblem for TspProblem {
    fn size(&self) -> usize {
        self.distances.item_count()
    }

    fn evaluate(&self, genome: &[usize]) -> f64 {
        self.tour_length(genome)
    }
}

impl TourProblem for TspProblem {
    fn candidate_list(&self, k: usize) -> Arc<CandidateList> {
        let k = CandidateList::effective_k(self.size(), k);

        {
            let cached = self.candidates.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(list) = cached.as_ref() {
                if list.k() == k {
                    return Arc::clone(list);
                }
            }
        }

        let mut slot = self
            .candidates
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Another thread may have rebuilt it while we waited for the lock.
        if let Some(list) = slot.as_ref() {
            if list.k() == k {
                return Arc::clone(list);
            }
        }
        let list = Arc::new(CandidateList::build(&self.distances, k));
        *slot = Some(Arc::clone(&list));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> TspProblem {
        TspProblem::from_coordinates(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap()
    }

    #[test]
    fn test_empty_problem_rejected() {
        assert_eq!(
            TspProblem::from_coordinates(&[]).unwrap_err(),
            Error::EmptyProblem
        );
    }

    #[test]
    fn test_from_rows_propagates_validation() {
        let rows = vec![vec![0.0, 1.0, 2.0], vec![1.0, 0.0]];
        assert!(matches!(
            TspProblem::from_rows(&rows),
            Err(Error::RaggedDistanceRow { row: 0, .. })
        ));
    }

    #[test]
    fn test_square_tours() {
        let p = square();
        assert!((p.evaluate(&[0, 1, 2, 3]) - 4.0).abs() < 1e-12);
        let crossing = p.evaluate(&[0, 2, 1, 3]);
        assert!((crossing - (2.0 + 2.0 * 2f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_candidate_list_reused_for_same_k() {
        let p = square();
        let a = p.candidate_list(2);
        let b = p.candidate_list(2);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_candidate_list_rebuilt_for_new_k() {
        let p = square();
        let a = p.candidate_list(1);
        let b = p.candidate_list(2);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.k(), 1);
        assert_eq!(b.k(), 2);
    }

    #[test]
    fn test_candidate_list_clamped_k_shares_entry() {
        let p = square();
        let a = p.candidate_list(0);
        let b = p.candidate_list(10);
        assert_eq!(a.k(), 3);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
