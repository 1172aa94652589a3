//! Error type used by the crate.

use thiserror::Error;

/// Grid error type.
#[derive(Debug, Error)]
pub enum GridError {
    /// Saddle cell could not be resolved within the maximum subdivision depth.
    #[error(
        "input data must be more detailed: saddle at cell ({column}, {row}) is not resolved \
         after {depth} subdivisions"
    )]
    InsufficientDetail {
        /// Column of the cell window.
        column: usize,
        /// Row of the cell window.
        row: usize,
        /// Subdivision depth reached.
        depth: u32,
    },
    /// No exit side for the contour entering a cell. Indicates a broken invariant of the tracer.
    #[error("contour entering cell ({column}, {row}) has no exit")]
    UnresolvedCell {
        /// Column of the cell window.
        column: usize,
        /// Row of the cell window.
        row: usize,
    },
    /// Extent or cell size of the grid is not valid.
    #[error("invalid grid definition: {0}")]
    InvalidDefinition(String),
    /// Error reading or writing grid files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed grid file.
    #[error("failed to parse grid: {0}")]
    Parse(String),
}
