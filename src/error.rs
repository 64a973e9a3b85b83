//! Error types for u-permevo.

use thiserror::Error;

/// Errors raised while building a problem or starting a run.
///
/// Local search and the evolutionary loop handle their own edge cases
/// (short genomes, no improving move, iteration caps) by returning the best
/// known result, so they never produce one of these mid-run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A problem with no items.
    #[error("problem must contain at least one item")]
    EmptyProblem,

    /// Flat distance data whose length is not a square of the item count.
    #[error("distance data has {actual} entries, expected {expected}")]
    DistanceDataSize { expected: usize, actual: usize },

    /// A row of a nested distance matrix with the wrong length.
    #[error("distance row {row} has {actual} entries, expected {expected}")]
    RaggedDistanceRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Invalid GA configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A genome whose length does not match the problem size.
    #[error("genome has {actual} items, problem has {expected}")]
    GenomeLength { expected: usize, actual: usize },
}

/// Result type alias for u-permevo operations.
pub type Result<T> = std::result::Result<T, Error>;
