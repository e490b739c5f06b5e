#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Camera pose, camera matrices and display rotation.
pub mod camera;

mod error;
pub use error::GeometryError;

/// Geometric operations on 3D points.
pub mod ops;

/// Point cloud types produced by the tracker.
pub mod pointcloud;

/// World to screen-space projection.
pub mod projection;

/// Tracked entities a calibration point can be taken from.
pub mod trackable;
