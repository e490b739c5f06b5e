#![deny(missing_docs)]
//! # Depth scale calibration
//!
//! Converts the unitless output of a monocular depth network into metric distances by
//! comparing it with the sparse point cloud of a visual-inertial tracker.
//!
//! - [`weighted`]: confidence weighted mean of per-point scale estimates
//! - [`ransac`]: robust scale estimate with consensus sets
//! - [`least_squares`]: affine `scale * predicted + shift` fit
//! - [`single`]: one-point calibration from a world point or a screen tap
//! - [`calibrator`]: per-frame facade holding the camera configuration
//!
//! Every estimator takes the previous [`CalibrationState`] and returns the next one. A pass
//! that fails numerically returns the previous scale untouched.

/// Per-frame calibration facade.
pub mod calibrator;

/// Calibration configuration and parameter objects.
pub mod config;

/// Dense depth prediction buffer.
pub mod depth;

/// Projection round-trip diagnostics.
pub mod diagnostics;

mod error;
pub use error::CalibrationError;

/// Weighted least-squares scale and shift estimator.
pub mod least_squares;

/// RANSAC scale estimator.
pub mod ransac;

/// Depth samples pairing tracked distances with predictions.
pub mod sample;

/// Single-point calibration.
pub mod single;

/// Calibration state threaded across frames.
pub mod state;

/// Synthetic frames for demos, tests and benchmarks.
pub mod synthetic;

/// Weighted-average scale estimator.
pub mod weighted;

pub use calibrator::ScaleCalibrator;
pub use config::{CalibratorConfig, PredictionPolarity, RansacParams};
pub use depth::DepthPrediction;
pub use sample::DepthSample;
pub use state::{CalibrationState, Extent};
