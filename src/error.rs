use thiserror::Error;

/// Errors raised by grid construction, depot distances, and overlay runs.
#[derive(Debug, Error)]
pub enum GridError {
    /// Upper-left corner does not lie north and west of the bottom-right corner.
    #[error("invalid bounding box: upper-left corner must lie north and west of bottom-right corner")]
    InvalidBounds,

    /// `poly_size` must be a positive number of raster cells.
    #[error("poly_size must be at least 1")]
    ZeroPolySize,

    /// The (adjusted) coverage area does not fit inside the reference raster.
    #[error("coverage area falls outside the reference raster")]
    OutsideReference,

    /// A raster slice does not align with the grid's covered cells.
    #[error("raster slice for {variable:?} has {got} values, expected {expected}")]
    SliceLength {
        variable: String,
        got: usize,
        expected: usize,
    },

    /// A line feature with zero or non-finite geodesic length reached
    /// proportional attribution.
    #[error("feature {0} has zero or non-finite geodesic length")]
    DegenerateGeometry(usize),

    /// Depot distances were requested against zero depots.
    #[error("no depot locations supplied")]
    NoDepots,
}

pub type Result<T> = std::result::Result<T, GridError>;
