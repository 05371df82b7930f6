use thiserror::Error;

/// Errors surfaced by a tessellation call.
///
/// Numerical degeneracies (collinear or coincident sites, sites on the border) are resolved
/// internally and never show up here. Only malformed input and internal consistency failures do.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TessellationError {
    /// The bounding rectangle does not have a positive, finite extent on both axes.
    #[error("invalid bounds: min ({min_x}, {min_y}) must lie strictly below max ({max_x}, {max_y})")]
    InvalidBounds {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    /// A site has a NaN or infinite coordinate.
    #[error("site {index} has a non-finite coordinate")]
    NonFiniteSite {
        /// Position of the site in the input.
        index: usize,
    },
    /// The generator array does not hold whole (x, y) pairs.
    #[error("generator array length {len} is not a multiple of 2")]
    OddGeneratorArray { len: usize },
    /// An edge between two distinct sites ended up without a direction.
    #[error("edge between sites {left} and {right} has a zero-length direction")]
    ZeroLengthDirection { left: usize, right: usize },
    /// The boundary edges of a cell do not form a single closed cycle.
    #[error("cell of site {site} does not close: {reason}")]
    CellNotClosed { site: usize, reason: String },
    /// A site touches its own cell boundary in an impossible way.
    #[error("site {site} touches {count} edges of its own cell")]
    AmbiguousSitePlacement { site: usize, count: usize },
}

impl TessellationError {
    /// Whether this error indicates an algorithmic bug rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            TessellationError::ZeroLengthDirection { .. }
                | TessellationError::CellNotClosed { .. }
                | TessellationError::AmbiguousSitePlacement { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TessellationError>;
