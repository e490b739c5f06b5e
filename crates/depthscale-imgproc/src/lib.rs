#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the visualization module.
pub mod error;
pub use error::ImgprocError;

/// Bounded parallel execution over flat buffers.
pub mod parallel;

/// Depth map quantization.
pub mod quantize;
