/// An error type for the geometry module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GeometryError {
    /// Display rotation code is not one of 0, 90, 180, 270.
    #[error("Invalid display rotation {0}, expected one of 0, 90, 180, 270")]
    InvalidRotation(i32),

    /// Matrix data does not hold 16 elements.
    #[error("Matrix data length ({0}) does not match 4x4 (16)")]
    InvalidMatrixLength(usize),
}
