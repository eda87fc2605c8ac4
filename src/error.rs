//! Error types for skops

use thiserror::Error;

/// Result type alias using skops' Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in skops operations
///
/// Every variant is a precondition violation in the sense of the library's
/// fail-fast contract: operations are pure given their inputs, so an error
/// here is a caller bug, never a transient condition worth retrying.
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Leading dimension smaller than the minor-axis extent of an operand
    #[error("Leading dimension of '{name}' is {ld}, must be at least {min}")]
    LeadingDimTooSmall {
        /// The operand name
        name: &'static str,
        /// The leading dimension that was passed
        ld: usize,
        /// The minimum admissible value under the requested layout
        min: usize,
    },

    /// Requested submatrix window does not fit inside the operator
    #[error(
        "Submatrix of shape {rows}x{cols} at offset ({ro}, {co}) does not fit \
         in operator of shape {op_rows}x{op_cols}"
    )]
    SubmatrixOutOfBounds {
        /// Rows of the operator
        op_rows: usize,
        /// Columns of the operator
        op_cols: usize,
        /// Row offset of the window
        ro: usize,
        /// Column offset of the window
        co: usize,
        /// Rows of the window
        rows: usize,
        /// Columns of the window
        cols: usize,
    },

    /// A buffer is too short for the matrix it is supposed to hold
    #[error("Buffer '{name}' has length {len}, needs at least {required}")]
    BufferTooSmall {
        /// The buffer name
        name: &'static str,
        /// Actual length
        len: usize,
        /// Required length
        required: usize,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: i64,
        /// Size of the dimension
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Attempt to fill an operator that already holds a materialized buffer
    #[error("Operator is already materialized; operators are filled at most once")]
    AlreadyMaterialized,

    /// Sparse kernel invoked on a matrix with a one-based index convention
    #[error("Operation '{op}' requires zero-based indices")]
    UnsupportedIndexBase {
        /// The operation name
        op: &'static str,
    },
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_arg(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a leading dimension error
    pub fn leading_dim(name: &'static str, ld: usize, min: usize) -> Self {
        Self::LeadingDimTooSmall { name, ld, min }
    }

    /// Create a buffer length error
    pub fn buffer_too_small(name: &'static str, len: usize, required: usize) -> Self {
        Self::BufferTooSmall {
            name,
            len,
            required,
        }
    }
}
