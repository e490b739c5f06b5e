//! Round-trip checks of the projection math.
//!
//! These mirror what a user does on device: tap where an anchor is drawn and compare.

use depthscale_3d::{
    camera::{CameraFrame, CameraPose},
    projection::{lookup_surface_index, ndc_to_surface, project_to_ndc_unclipped, ImageSize},
};
use glam::Vec2;

use crate::{
    config::CalibratorConfig, depth::DepthPrediction, single::scale_at, state::CalibrationState,
};

/// Project a world point to surface pixels with top-left origin.
///
/// No clipping is applied. Returns `None` when the perspective divide is degenerate.
pub fn project_to_surface(
    frame: &CameraFrame,
    surface: ImageSize,
    point: &[f32; 3],
) -> Option<Vec2> {
    project_to_ndc_unclipped(frame, point).map(|ndc| ndc_to_surface(ndc, surface))
}

/// Pixel distance between the projection of `point` and a surface coordinate.
///
/// A value close to zero means the projection agrees with where the point was seen.
pub fn xy_test(
    frame: &CameraFrame,
    surface: ImageSize,
    point: &[f32; 3],
    raw: Vec2,
) -> Option<f32> {
    let projected = project_to_surface(frame, surface, point)?;
    log::debug!("XY test: projected {:?}, expected {:?}", projected, raw);
    Some(projected.distance(raw))
}

/// Difference between the scale implied by a tap and the scale held by `state`.
///
/// Returns `None` when the tap does not land on a usable prediction.
#[allow(clippy::too_many_arguments)]
pub fn calibration_test(
    depth: &DepthPrediction,
    frame: &CameraFrame,
    surface: ImageSize,
    point: &[f32; 3],
    camera_pose: &CameraPose,
    raw: Vec2,
    state: &CalibrationState,
    config: &CalibratorConfig,
) -> Option<f32> {
    let lookup = lookup_surface_index(frame.rotation(), surface, raw, depth.size(), depth.len());
    let scale = scale_at(depth, lookup, point, camera_pose, config)?;
    Some((scale - state.scale_factor() as f64).abs() as f32)
}
