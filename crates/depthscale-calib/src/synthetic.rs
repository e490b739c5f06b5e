//! Synthetic frames with a known scale factor.
//!
//! Points are laid on a regular grid in normalized device coordinates at random depths, so
//! that no two points share a pixel. The depth buffer holds `distance / true_scale` under
//! inliers and a corrupted prediction under outliers.

use depthscale_3d::{
    camera::{CameraFrame, CameraPose, DisplayRotation},
    ops::euclidean_distance,
    pointcloud::{CloudPoint, PointCloud},
    projection::{lookup_index, ImageSize, ScreenLookup},
};
use glam::{Mat4, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{depth::DepthPrediction, CalibrationError};

/// Description of a synthetic scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticScene {
    /// Resolution of the depth prediction.
    pub size: ImageSize,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Display rotation of the frame.
    pub rotation: DisplayRotation,
    /// Camera position in world coordinates; the camera looks down -z.
    pub camera_position: [f32; 3],
    /// Number of cloud points to generate.
    pub num_points: usize,
    /// Range of point depths along the viewing direction.
    pub depth_range: (f32, f32),
    /// Scale factor the predictions are generated with.
    pub true_scale: f32,
    /// Fraction of points whose prediction is corrupted, clamped to `[0, 1]`.
    pub outlier_ratio: f64,
    /// Multiplier applied to the implied scale of outliers.
    pub outlier_factor: f32,
    /// Relative uniform noise added to every prediction under a point.
    pub prediction_noise: f32,
    /// Prediction value of pixels without a point.
    pub background: f32,
}

impl Default for SyntheticScene {
    fn default() -> Self {
        Self {
            size: ImageSize::new(128, 96),
            fov_y_deg: 60.0,
            rotation: DisplayRotation::Deg90,
            camera_position: [0.0, 0.0, 0.0],
            num_points: 100,
            depth_range: (0.5, 4.0),
            true_scale: 0.25,
            outlier_ratio: 0.0,
            outlier_factor: 6.0,
            prediction_noise: 0.0,
            background: 1.0,
        }
    }
}

/// A generated frame: everything a calibration pass consumes.
#[derive(Debug, Clone)]
pub struct SyntheticFrame {
    /// Camera matrices and display rotation.
    pub frame: CameraFrame,
    /// Depth prediction of the frame.
    pub depth: DepthPrediction,
    /// Tracked point cloud of the frame.
    pub cloud: PointCloud,
    /// Camera pose the distances are measured from.
    pub camera_pose: CameraPose,
    /// Per-point outlier flags, in cloud order.
    pub outliers: Vec<bool>,
}

impl SyntheticScene {
    /// The camera frame of the scene.
    pub fn camera_frame(&self) -> CameraFrame {
        let eye = Vec3::from_array(self.camera_position);
        let view = Mat4::look_at_rh(eye, eye - Vec3::Z, Vec3::Y);
        let aspect = self.size.width as f32 / self.size.height as f32;
        let projection = Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), aspect, 0.1, 100.0);
        CameraFrame::from_mat4(view, projection, self.rotation)
    }

    /// Generate a frame with `timestamp`.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        timestamp: i64,
    ) -> Result<SyntheticFrame, CalibrationError> {
        let frame = self.camera_frame();
        let mut depth =
            DepthPrediction::from_value(self.size.width, self.size.height, self.background)?;
        let camera_pose = CameraPose {
            translation: self.camera_position,
        };

        let focal = 1.0 / (self.fov_y_deg.to_radians() / 2.0).tan();
        let aspect = self.size.width as f32 / self.size.height as f32;
        let side = (self.num_points as f64).sqrt().ceil().max(1.0) as usize;
        let (a, b) = self.depth_range;
        let (near, far) = (a.min(b), a.max(b));

        let mut taken = vec![false; depth.len()];
        let mut points = Vec::with_capacity(self.num_points);
        let mut outliers = Vec::with_capacity(self.num_points);

        for i in 0..self.num_points {
            let (gx, gy) = (i % side, i / side);
            let nx = -0.8 + 1.6 * (gx as f32 + 0.5) / side as f32;
            let ny = -0.8 + 1.6 * (gy as f32 + 0.5) / side as f32;
            let d = rng.random_range(near..=far);

            let position = [
                self.camera_position[0] + nx * d * aspect / focal,
                self.camera_position[1] + ny * d / focal,
                self.camera_position[2] - d,
            ];

            let ScreenLookup::Visible { index, .. } =
                lookup_index(&frame, &position, depth.size(), depth.len())
            else {
                continue;
            };
            if taken[index] {
                continue;
            }
            taken[index] = true;

            let is_outlier = rng.random_bool(self.outlier_ratio.clamp(0.0, 1.0));
            let implied = if is_outlier {
                self.true_scale * self.outlier_factor
            } else {
                self.true_scale
            };
            let noise = if self.prediction_noise > 0.0 {
                rng.random_range(-self.prediction_noise..=self.prediction_noise)
            } else {
                0.0
            };
            let distance = euclidean_distance(&position, &self.camera_position);
            depth.as_slice_mut()[index] = distance / implied * (1.0 + noise);

            let confidence = rng.random_range(0.5..=1.0);
            points.push(CloudPoint {
                position,
                confidence,
            });
            outliers.push(is_outlier);
        }

        Ok(SyntheticFrame {
            frame,
            depth,
            cloud: PointCloud::new(points, timestamp),
            camera_pose,
            outliers,
        })
    }
}
