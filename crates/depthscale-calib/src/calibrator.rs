use depthscale_3d::{
    camera::{CameraFrame, CameraPose, DisplayRotation},
    pointcloud::PointCloud,
    projection::ImageSize,
    trackable::Trackable,
};
use glam::{Mat4, Vec2};
use rand::Rng;

use crate::{
    config::{CalibratorConfig, RansacParams},
    depth::DepthPrediction,
    diagnostics,
    least_squares::least_squares,
    ransac::ransac,
    sample::{collect_samples, DepthSample},
    single,
    state::CalibrationState,
    weighted::weighted_average,
    CalibrationError,
};

/// Per-frame entry point of the calibration.
///
/// Holds the camera configuration set by the render loop before each calibration call.
/// The calibration result itself is not stored here: every method takes the previous
/// [`CalibrationState`] and returns the next one.
///
/// Example:
/// ```
/// use depthscale_calib::{CalibratorConfig, DepthPrediction, ScaleCalibrator};
/// use depthscale_3d::{camera::CameraPose, pointcloud::{CloudPoint, PointCloud}};
///
/// let identity = glam::Mat4::IDENTITY.to_cols_array();
/// let mut calibrator = ScaleCalibrator::new(CalibratorConfig::default());
/// calibrator.set_camera_view(&identity);
/// calibrator.set_camera_perspective(&identity);
/// calibrator.set_display_rotation(90)?;
///
/// let depth = DepthPrediction::from_value(8, 8, 2.0)?;
/// let cloud = PointCloud::new(vec![CloudPoint::new(0.0, 0.0, 1.0, 1.0); 5], 1);
///
/// let state = calibrator.initial_state();
/// let state = calibrator.calibrate_scale_factor(&state, &depth, &cloud, &CameraPose::default())?;
/// assert_eq!(state.scale_factor(), 0.5);
/// # Ok::<(), depthscale_calib::CalibrationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ScaleCalibrator {
    config: CalibratorConfig,
    view: Option<Mat4>,
    projection: Option<Mat4>,
    rotation: DisplayRotation,
    surface: ImageSize,
}

impl ScaleCalibrator {
    /// Create a calibrator with no camera configured.
    pub fn new(config: CalibratorConfig) -> Self {
        Self {
            config,
            view: None,
            projection: None,
            rotation: DisplayRotation::default(),
            surface: ImageSize::default(),
        }
    }

    /// The calibrator configuration.
    pub fn config(&self) -> &CalibratorConfig {
        &self.config
    }

    /// A state holding the configured default scale factor.
    pub fn initial_state(&self) -> CalibrationState {
        CalibrationState::new(self.config.default_scale_factor)
    }

    /// Set the column-major world to view matrix of the current frame.
    pub fn set_camera_view(&mut self, view: &[f32; 16]) {
        self.view = Some(Mat4::from_cols_array(view));
    }

    /// Set the column-major projection matrix of the current frame.
    pub fn set_camera_perspective(&mut self, projection: &[f32; 16]) {
        self.projection = Some(Mat4::from_cols_array(projection));
    }

    /// Set the display rotation in degrees, one of 0, 90, 180, 270.
    pub fn set_display_rotation(&mut self, degrees: i32) -> Result<(), CalibrationError> {
        self.rotation = DisplayRotation::try_from(degrees)?;
        Ok(())
    }

    /// Set the size of the render surface, used to interpret screen taps.
    pub fn set_surface_size(&mut self, width: usize, height: usize) {
        self.surface = ImageSize::new(width, height);
    }

    /// The camera frame assembled from the configured matrices.
    pub fn frame(&self) -> Result<CameraFrame, CalibrationError> {
        let view = self.view.ok_or(CalibrationError::CameraNotConfigured("view"))?;
        let projection = self
            .projection
            .ok_or(CalibrationError::CameraNotConfigured("projection"))?;
        Ok(CameraFrame::from_mat4(view, projection, self.rotation))
    }

    // The cloud was already consumed by a previous pass.
    fn is_redundant(state: &CalibrationState, cloud: &PointCloud) -> bool {
        cloud.timestamp() != 0 && cloud.timestamp() == state.timestamp()
    }

    fn samples(
        &self,
        depth: &DepthPrediction,
        cloud: &PointCloud,
        camera_pose: &CameraPose,
        limit: usize,
    ) -> Result<Vec<DepthSample>, CalibrationError> {
        let frame = self.frame()?;
        Ok(collect_samples(
            depth,
            cloud,
            camera_pose,
            &frame,
            self.config.polarity,
            limit,
        ))
    }

    /// Calibrate with the confidence weighted average over the point cloud.
    ///
    /// Fails only when the camera is not configured. A pass without usable points, or with
    /// an invalid mean, returns the previous scale.
    pub fn calibrate_scale_factor(
        &self,
        state: &CalibrationState,
        depth: &DepthPrediction,
        cloud: &PointCloud,
        camera_pose: &CameraPose,
    ) -> Result<CalibrationState, CalibrationError> {
        if Self::is_redundant(state, cloud) {
            log::debug!("Point cloud {} already consumed", cloud.timestamp());
            return Ok(*state);
        }
        let samples = self.samples(depth, cloud, camera_pose, self.config.max_points)?;
        let observed = state.observe(&samples, cloud.timestamp());
        Ok(weighted_average(&samples, &observed, &self.config))
    }

    /// Calibrate with RANSAC, seeding the generator from `params.random_seed`.
    ///
    /// # Errors
    ///
    /// [`CalibrationError::InvalidDividers`] when the dividers are not ordered, or
    /// [`CalibrationError::CameraNotConfigured`].
    pub fn calibrate_scale_factor_ransac(
        &self,
        state: &CalibrationState,
        depth: &DepthPrediction,
        cloud: &PointCloud,
        camera_pose: &CameraPose,
        params: &RansacParams,
    ) -> Result<CalibrationState, CalibrationError> {
        let mut rng = params.rng();
        self.calibrate_scale_factor_ransac_with_rng(
            state,
            depth,
            cloud,
            camera_pose,
            params,
            &mut rng,
        )
    }

    /// Calibrate with RANSAC using a caller supplied random source.
    pub fn calibrate_scale_factor_ransac_with_rng<R: Rng + ?Sized>(
        &self,
        state: &CalibrationState,
        depth: &DepthPrediction,
        cloud: &PointCloud,
        camera_pose: &CameraPose,
        params: &RansacParams,
        rng: &mut R,
    ) -> Result<CalibrationState, CalibrationError> {
        params.validate()?;
        if Self::is_redundant(state, cloud) {
            log::debug!("Point cloud {} already consumed", cloud.timestamp());
            return Ok(*state);
        }
        // ranking needs every visible point, the cap is applied afterwards
        let samples = self.samples(depth, cloud, camera_pose, usize::MAX)?;
        let observed = state.observe(&samples, cloud.timestamp());
        ransac(&samples, &observed, &self.config, params, rng)
    }

    /// Calibrate scale and shift with a weighted least-squares fit over the point cloud.
    pub fn calibrate_scale_shift(
        &self,
        state: &CalibrationState,
        depth: &DepthPrediction,
        cloud: &PointCloud,
        camera_pose: &CameraPose,
    ) -> Result<CalibrationState, CalibrationError> {
        if Self::is_redundant(state, cloud) {
            log::debug!("Point cloud {} already consumed", cloud.timestamp());
            return Ok(*state);
        }
        let samples = self.samples(depth, cloud, camera_pose, self.config.max_points)?;
        let observed = state.observe(&samples, cloud.timestamp());
        Ok(least_squares(&samples, &observed, &self.config))
    }

    /// Set the scale from one world point, e.g. a placed anchor.
    pub fn calibrate_from_point(
        &self,
        state: &CalibrationState,
        depth: &DepthPrediction,
        point: &[f32; 3],
        camera_pose: &CameraPose,
    ) -> Result<CalibrationState, CalibrationError> {
        let frame = self.frame()?;
        Ok(single::single_point(
            depth,
            &frame,
            point,
            camera_pose,
            state,
            &self.config,
        ))
    }

    /// Set the scale from a tap at `(raw_x, raw_y)` that hit `target`.
    ///
    /// Only the display rotation and surface size are needed, not the camera matrices.
    pub fn calibrate_from_tap(
        &self,
        state: &CalibrationState,
        depth: &DepthPrediction,
        target: &Trackable,
        camera_pose: &CameraPose,
        raw_x: f32,
        raw_y: f32,
    ) -> CalibrationState {
        log::debug!(
            "Tap at ({}, {}) on a {} with normal {:?}",
            raw_x,
            raw_y,
            if target.is_plane() { "plane" } else { "point" },
            target.normal()
        );
        single::from_screen_tap(
            depth,
            self.rotation,
            self.surface,
            Vec2::new(raw_x, raw_y),
            &target.position(),
            camera_pose,
            state,
            &self.config,
        )
    }

    /// Pixel distance between the projection of `point` and a surface coordinate.
    pub fn xy_test(
        &self,
        point: &[f32; 3],
        raw_x: f32,
        raw_y: f32,
    ) -> Result<Option<f32>, CalibrationError> {
        let frame = self.frame()?;
        Ok(diagnostics::xy_test(
            &frame,
            self.surface,
            point,
            Vec2::new(raw_x, raw_y),
        ))
    }

    /// Difference between the scale implied by a tap and the scale held by `state`.
    pub fn calibration_test(
        &self,
        state: &CalibrationState,
        depth: &DepthPrediction,
        point: &[f32; 3],
        camera_pose: &CameraPose,
        raw_x: f32,
        raw_y: f32,
    ) -> Result<Option<f32>, CalibrationError> {
        let frame = self.frame()?;
        Ok(diagnostics::calibration_test(
            depth,
            &frame,
            self.surface,
            point,
            camera_pose,
            Vec2::new(raw_x, raw_y),
            state,
            &self.config,
        ))
    }
}
