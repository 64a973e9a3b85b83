//! Dense distance matrix.

use super::DistanceProvider;
use crate::error::{Error, Result};

/// Row-major `n × n` distance matrix.
///
/// Values are taken as given: symmetry, a zero diagonal, and non-negative
/// finite entries are the caller's responsibility. NaN or negative values
/// propagate into fitness unchanged.
///
/// # Examples
///
/// ```
/// use u_permevo::problem::{DistanceMatrix, DistanceProvider};
///
/// let m = DistanceMatrix::from_coordinates(&[(0.0, 0.0), (3.0, 4.0)]);
/// assert_eq!(m.item_count(), 2);
/// assert!((m.distance(0, 1) - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds a matrix from flat row-major data of length `n * n`.
    pub fn from_flat(n: usize, data: Vec<f64>) -> Result<Self> {
        if n == 0 {
            return Err(Error::EmptyProblem);
        }
        let expected = n * n;
        if data.len() != expected {
            return Err(Error::DistanceDataSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { n, data })
    }

    /// Builds a matrix from nested rows. Every row must have `rows.len()` entries.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(Error::EmptyProblem);
        }
        let mut data = Vec::with_capacity(n * n);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != n {
                return Err(Error::RaggedDistanceRow {
                    row,
                    expected: n,
                    actual: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Ok(Self { n, data })
    }

    /// Builds a Euclidean distance matrix from 2-D coordinates.
    ///
    /// An empty slice yields an empty matrix, which [`TspProblem`](super::TspProblem)
    /// rejects.
    pub fn from_coordinates(points: &[(f64, f64)]) -> Self {
        let n = points.len();
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = points[i].0 - points[j].0;
                let dy = points[i].1 - points[j].1;
                let d = (dx * dx + dy * dy).sqrt();
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        Self { n, data }
    }

    /// Returns row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }
}

impl DistanceProvider for DistanceMatrix {
    fn item_count(&self) -> usize {
        self.n
    }

    #[inline]
    fn distance(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }
}
