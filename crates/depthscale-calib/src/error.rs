use depthscale_3d::GeometryError;

/// An error type for the calibration module.
///
/// Per-point failures (off-screen points, missing predictions, non-finite estimates) are
/// never reported here: they only exclude the point from the estimate.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CalibrationError {
    /// RANSAC dividers must satisfy `possible_inlier > best_consensus > 0`.
    #[error("Bad RANSAC dividers ({possible_inlier}, {best_consensus}), need possible > best > 0")]
    InvalidDividers {
        /// Divider giving the size of the random subset.
        possible_inlier: usize,
        /// Divider giving the minimum consensus set size.
        best_consensus: usize,
    },

    /// Buffer data length does not match its declared size.
    #[error("Data length ({0}) does not match the depth size ({1}x{2})")]
    InvalidShape(usize, usize, usize),

    /// The view or projection matrix has not been set for the frame.
    #[error("Camera {0} matrix not configured")]
    CameraNotConfigured(&'static str),

    /// Geometry error.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
