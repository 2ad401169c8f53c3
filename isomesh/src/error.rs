//! Module containing the universal error type
use thiserror::Error;

/// Universal error type for mesh extraction
#[derive(Error, Debug)]
pub enum Error {
    /// Byte length does not divide into whole elements of the target type
    #[error("cannot reinterpret {len} bytes as elements of {size} bytes")]
    SizeMismatch {
        /// Length of the source buffer, in bytes
        len: usize,
        /// Size of a single target element, in bytes
        size: usize,
    },

    /// Byte buffer is not aligned for the target type
    #[error("buffer is not aligned to {align} bytes")]
    Misaligned {
        /// Alignment required by the target type
        align: usize,
    },

    /// Vertex count does not fit in the index buffer or reserved storage
    ///
    /// Both values are counted in vertices (three per triangle).
    #[error("{required} vertices exceed the available capacity of {available}")]
    CapacityExceeded {
        /// Number of vertices that would be written
        required: usize,
        /// Number of vertices that can be addressed
        available: usize,
    },

    /// Sample count does not match the grid size
    #[error("field has {actual} samples but its grid requires {expected}")]
    BadFieldLength {
        /// Number of samples implied by the grid size
        expected: usize,
        /// Number of samples provided
        actual: usize,
    },

    /// IO error; see inner code for details
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}
