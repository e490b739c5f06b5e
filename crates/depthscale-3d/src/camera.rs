use glam::{Mat4, Vec2};
use serde::{Deserialize, Serialize};

use crate::GeometryError;

/// Rotation of the display relative to the sensor's native orientation.
///
/// The depth buffer is always captured at the sensor orientation, so screen-space
/// coordinates have to be permuted before they can index into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayRotation {
    /// Portrait, origin top-right in sensor space.
    #[default]
    Deg0,
    /// Landscape with the right side up, origin top-left in sensor space.
    Deg90,
    /// Upside down portrait, origin bottom-left in sensor space.
    Deg180,
    /// Landscape with the left side up, origin bottom-right in sensor space.
    Deg270,
}

impl DisplayRotation {
    /// The rotation code in degrees.
    pub fn degrees(&self) -> i32 {
        match self {
            DisplayRotation::Deg0 => 0,
            DisplayRotation::Deg90 => 90,
            DisplayRotation::Deg180 => 180,
            DisplayRotation::Deg270 => 270,
        }
    }

    /// Map a UV coordinate with bottom-left origin to the depth buffer orientation.
    ///
    /// | rotation | output |
    /// |---|---|
    /// | 0 | `(1 - v, 1 - u)` |
    /// | 90 | `(u, 1 - v)` |
    /// | 180 | `(v, u)` |
    /// | 270 | `(1 - u, v)` |
    pub fn transform_bottom_left(&self, uv: Vec2) -> Vec2 {
        let (u, v) = (uv.x, uv.y);
        match self {
            DisplayRotation::Deg0 => Vec2::new(1.0 - v, 1.0 - u),
            DisplayRotation::Deg90 => Vec2::new(u, 1.0 - v),
            DisplayRotation::Deg180 => Vec2::new(v, u),
            DisplayRotation::Deg270 => Vec2::new(1.0 - u, v),
        }
    }

    /// Map a UV coordinate with top-left origin (touch events) to the depth buffer orientation.
    ///
    /// | rotation | output |
    /// |---|---|
    /// | 0 | `(v, 1 - u)` |
    /// | 90 | `(u, v)` |
    /// | 180 | `(1 - v, u)` |
    /// | 270 | `(1 - u, 1 - v)` |
    pub fn transform_top_left(&self, uv: Vec2) -> Vec2 {
        let (u, v) = (uv.x, uv.y);
        match self {
            DisplayRotation::Deg0 => Vec2::new(v, 1.0 - u),
            DisplayRotation::Deg90 => Vec2::new(u, v),
            DisplayRotation::Deg180 => Vec2::new(1.0 - v, u),
            DisplayRotation::Deg270 => Vec2::new(1.0 - u, 1.0 - v),
        }
    }
}

impl TryFrom<i32> for DisplayRotation {
    type Error = GeometryError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(DisplayRotation::Deg0),
            90 => Ok(DisplayRotation::Deg90),
            180 => Ok(DisplayRotation::Deg180),
            270 => Ok(DisplayRotation::Deg270),
            other => Err(GeometryError::InvalidRotation(other)),
        }
    }
}

/// Position of the camera in the point cloud reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    /// Camera translation (tx, ty, tz).
    pub translation: [f32; 3],
}

impl CameraPose {
    /// Create a new camera pose from its translation.
    pub fn new(tx: f32, ty: f32, tz: f32) -> Self {
        Self {
            translation: [tx, ty, tz],
        }
    }
}

/// View and projection matrices of a rendered frame.
///
/// Matrices are column-major as delivered by the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
    rotation: DisplayRotation,
}

impl CameraFrame {
    /// Create a camera frame from column-major view and projection matrices.
    pub fn new(view: &[f32; 16], projection: &[f32; 16], rotation: DisplayRotation) -> Self {
        Self::from_mat4(
            Mat4::from_cols_array(view),
            Mat4::from_cols_array(projection),
            rotation,
        )
    }

    /// Create a camera frame from matrix slices, checking that both hold 16 elements.
    pub fn from_slices(
        view: &[f32],
        projection: &[f32],
        rotation: DisplayRotation,
    ) -> Result<Self, GeometryError> {
        let view: &[f32; 16] = view
            .try_into()
            .map_err(|_| GeometryError::InvalidMatrixLength(view.len()))?;
        let projection: &[f32; 16] = projection
            .try_into()
            .map_err(|_| GeometryError::InvalidMatrixLength(projection.len()))?;
        Ok(Self::new(view, projection, rotation))
    }

    /// Create a camera frame from `glam` matrices.
    pub fn from_mat4(view: Mat4, projection: Mat4, rotation: DisplayRotation) -> Self {
        Self {
            view,
            projection,
            view_projection: projection * view,
            rotation,
        }
    }

    /// The world to view matrix.
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// The view to clip matrix.
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// The combined world to clip matrix `P * V`.
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    /// The display rotation of the frame.
    pub fn rotation(&self) -> DisplayRotation {
        self.rotation
    }
}
