//! Error types for the greenwave library.

use thiserror::Error;

/// Result type alias for phenology pipeline operations.
pub type Result<T> = std::result::Result<T, PhenologyError>;

/// Errors that can occur while extracting phenology transitions.
///
/// All variants raised by a pipeline stage are terminal for the current
/// run: later stages must not execute after one of these is returned.
/// Per-event detection misses are not errors; they surface as `None`
/// indices in the detection result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhenologyError {
    /// No usable observation falls inside the requested date range.
    #[error("insufficient data: no usable observations in range")]
    DataInsufficient,

    /// The smoothing window cannot be reduced to a valid odd size.
    #[error("smoothing window too small: got {window}, need at least {min}")]
    WindowTooSmall { window: usize, min: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Derived initial guess or parameter bounds are malformed.
    #[error("fit bounds invalid: {0}")]
    FitBoundsInvalid(String),

    /// The optimizer exhausted its iteration budget without converging.
    #[error("fit did not converge after {iterations} iterations")]
    FitDidNotConverge { iterations: usize },

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },
}
