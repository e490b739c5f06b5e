use depthscale_3d::{
    camera::{CameraFrame, CameraPose, DisplayRotation},
    ops::euclidean_distance,
    projection::{lookup_index, lookup_surface_index, ImageSize, ScreenLookup},
};
use glam::Vec2;

use crate::{
    config::CalibratorConfig, depth::DepthPrediction, sample::prediction_at,
    state::CalibrationState,
};

/// Scale implied by one world point and the prediction under `lookup`.
pub(crate) fn scale_at(
    depth: &DepthPrediction,
    lookup: ScreenLookup,
    point: &[f32; 3],
    camera_pose: &CameraPose,
    config: &CalibratorConfig,
) -> Option<f64> {
    let index = match lookup {
        ScreenLookup::Visible { index, .. } => index,
        ScreenLookup::OffScreen => {
            log::warn!("Calibration point is off screen");
            return None;
        }
        ScreenLookup::OutOfBounds => {
            log::warn!("Prediction not found for calibration point");
            return None;
        }
    };
    let Some(predicted) = prediction_at(depth, index, config.polarity) else {
        log::warn!("Unusable prediction at index {}", index);
        return None;
    };
    let distance = euclidean_distance(point, &camera_pose.translation);
    Some(distance as f64 / predicted as f64)
}

fn commit(
    state: &CalibrationState,
    scale: Option<f64>,
    config: &CalibratorConfig,
) -> CalibrationState {
    match scale {
        Some(scale) if config.accepts_scale(scale) => state.with_scale(scale as f32),
        Some(scale) => {
            log::info!("Invalid scale factor {}, keeping {}", scale, state.scale_factor());
            *state
        }
        None => *state,
    }
}

/// Set the scale from a single world point, e.g. an anchor placed by the user.
///
/// The point is projected through `frame` and its distance to the camera is divided by the
/// prediction under it. No weighting is applied.
pub fn single_point(
    depth: &DepthPrediction,
    frame: &CameraFrame,
    point: &[f32; 3],
    camera_pose: &CameraPose,
    state: &CalibrationState,
    config: &CalibratorConfig,
) -> CalibrationState {
    let lookup = lookup_index(frame, point, depth.size(), depth.len());
    commit(state, scale_at(depth, lookup, point, camera_pose, config), config)
}

/// Set the scale from a screen tap on a tracked point.
///
/// `tap` is in surface pixels with top-left origin. The prediction is read under the tap
/// instead of under the projection of `point`.
#[allow(clippy::too_many_arguments)]
pub fn from_screen_tap(
    depth: &DepthPrediction,
    rotation: DisplayRotation,
    surface: ImageSize,
    tap: Vec2,
    point: &[f32; 3],
    camera_pose: &CameraPose,
    state: &CalibrationState,
    config: &CalibratorConfig,
) -> CalibrationState {
    let lookup = lookup_surface_index(rotation, surface, tap, depth.size(), depth.len());
    commit(state, scale_at(depth, lookup, point, camera_pose, config), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    fn identity_frame() -> CameraFrame {
        CameraFrame::from_mat4(Mat4::IDENTITY, Mat4::IDENTITY, DisplayRotation::Deg90)
    }

    #[test]
    fn test_single_point() -> Result<(), crate::CalibrationError> {
        let depth = DepthPrediction::from_value(8, 8, 4.0)?;
        let config = CalibratorConfig::default();
        let state = CalibrationState::new(0.2);

        let next = single_point(
            &depth,
            &identity_frame(),
            &[0.0, 0.0, 2.0],
            &CameraPose::default(),
            &state,
            &config,
        );
        assert_eq!(next.scale_factor(), 0.5);

        // off screen keeps the previous scale
        let next = single_point(
            &depth,
            &identity_frame(),
            &[3.0, 0.0, 2.0],
            &CameraPose::default(),
            &state,
            &config,
        );
        assert_eq!(next, state);
        Ok(())
    }

    #[test]
    fn test_single_point_zero_prediction() -> Result<(), crate::CalibrationError> {
        let depth = DepthPrediction::from_value(8, 8, 0.0)?;
        let state = CalibrationState::new(0.2);
        let next = single_point(
            &depth,
            &identity_frame(),
            &[0.0, 0.0, 2.0],
            &CameraPose::default(),
            &state,
            &CalibratorConfig::default(),
        );
        assert_eq!(next, state);
        Ok(())
    }

    #[test]
    fn test_from_screen_tap() -> Result<(), crate::CalibrationError> {
        let mut depth = DepthPrediction::from_value(10, 10, 1.0)?;
        // tap (20, 10) on a 200x100 surface at rotation 270 reads the last pixel
        depth.as_slice_mut()[99] = 8.0;
        let state = CalibrationState::new(0.2);

        let next = from_screen_tap(
            &depth,
            DisplayRotation::Deg270,
            ImageSize::new(200, 100),
            Vec2::new(20.0, 10.0),
            &[0.0, 0.0, -2.0],
            &CameraPose::default(),
            &state,
            &CalibratorConfig::default(),
        );
        assert_eq!(next.scale_factor(), 0.25);

        let next = from_screen_tap(
            &depth,
            DisplayRotation::Deg270,
            ImageSize::new(200, 100),
            Vec2::new(500.0, 10.0),
            &[0.0, 0.0, -2.0],
            &CameraPose::default(),
            &state,
            &CalibratorConfig::default(),
        );
        assert_eq!(next, state);
        Ok(())
    }
}
