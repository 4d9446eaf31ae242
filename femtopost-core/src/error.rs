//! Error types for femtopost-core.

use thiserror::Error;

/// Result type alias for femtopost operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for femtopost operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A column does not have the row count of its table.
    #[error("{table}.{column} has {found} rows, expected {expected}")]
    ColumnLength {
        table: &'static str,
        column: &'static str,
        expected: usize,
        found: usize,
    },

    /// Particle and particle-debug tables are not row aligned.
    #[error("particle table has {particles} rows but debug table has {debug}")]
    TableMismatch { particles: usize, debug: usize },

    /// Collision back-reference points outside the event table.
    #[error("row {row} references collision {index}, event table has {collisions} rows")]
    CollisionIndex {
        row: usize,
        index: i32,
        collisions: usize,
    },

    /// Invalid histogram axis.
    #[error("invalid axis: {0}")]
    InvalidAxis(String),

    /// Two histograms with different binning were merged.
    #[error("cannot merge histogram {name}: binning differs")]
    BinningMismatch { name: String },

    /// Decay triplet rows do not follow the V0/daughter layout.
    #[error("partition {partition}, row {row}: {reason}")]
    TripletLayout {
        partition: String,
        row: usize,
        reason: String,
    },
}
