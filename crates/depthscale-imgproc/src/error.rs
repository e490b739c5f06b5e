use thiserror::Error;

/// Errors that can occur while rendering a depth map.
#[derive(Error, Debug, PartialEq)]
pub enum ImgprocError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// Input and output sizes do not match.
    #[error("source and destination slices must have the same length ({0} != {1})")]
    SizeMismatch(usize, usize),

    /// The normalization factor must be finite and strictly positive.
    #[error("invalid normalization factor {0}")]
    InvalidNormalization(f32),
}
