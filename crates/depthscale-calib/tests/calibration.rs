use approx::assert_relative_eq;
use depthscale_3d::{
    camera::{CameraPose, DisplayRotation},
    pointcloud::{CloudPoint, PointCloud},
    projection::{lookup_index, lookup_surface_index, ImageSize, ScreenLookup},
};
use depthscale_calib::{
    diagnostics::project_to_surface, synthetic::SyntheticScene,
    CalibrationError, CalibratorConfig, DepthPrediction, RansacParams, ScaleCalibrator,
};
use glam::Mat4;
use rand::{rngs::StdRng, SeedableRng};

const ROTATIONS: [DisplayRotation; 4] = [
    DisplayRotation::Deg0,
    DisplayRotation::Deg90,
    DisplayRotation::Deg180,
    DisplayRotation::Deg270,
];

// identity camera: normalized device coordinates equal world xy
fn identity_calibrator() -> ScaleCalibrator {
    let identity = Mat4::IDENTITY.to_cols_array();
    let mut calibrator = ScaleCalibrator::new(CalibratorConfig::default());
    calibrator.set_camera_view(&identity);
    calibrator.set_camera_perspective(&identity);
    calibrator
}

fn scene_calibrator(scene: &SyntheticScene) -> Result<ScaleCalibrator, CalibrationError> {
    let frame = scene.camera_frame();
    let mut calibrator = ScaleCalibrator::new(CalibratorConfig::default());
    calibrator.set_camera_view(&frame.view().to_cols_array());
    calibrator.set_camera_perspective(&frame.projection().to_cols_array());
    calibrator.set_display_rotation(scene.rotation.degrees())?;
    calibrator.set_surface_size(scene.size.width * 10, scene.size.height * 10);
    Ok(calibrator)
}

#[test]
fn five_point_scenario() -> Result<(), CalibrationError> {
    let calibrator = identity_calibrator();
    let depth = DepthPrediction::from_value(16, 16, 2.0)?;
    let cloud = PointCloud::new(
        vec![
            CloudPoint::new(0.0, 0.0, 1.0, 1.0),
            CloudPoint::new(0.6, 0.0, 0.8, 1.0),
            CloudPoint::new(0.0, -0.6, 0.8, 1.0),
            CloudPoint::new(-0.6, 0.0, 0.8, 1.0),
            CloudPoint::new(0.0, 0.6, 0.8, 1.0),
        ],
        1,
    );
    let pose = CameraPose::default();

    let initial = calibrator.initial_state();
    let state = calibrator.calibrate_scale_factor(&initial, &depth, &cloud, &pose)?;
    assert_relative_eq!(state.scale_factor(), 0.5, epsilon = 1e-6);
    assert_eq!(state.num_visible_points(), 5);

    // one-sample subsets have a zero threshold: no consensus, the previous scale is kept
    let state = calibrator.calibrate_scale_factor_ransac(
        &initial,
        &depth,
        &cloud,
        &pose,
        &RansacParams {
            random_seed: Some(0),
            ..Default::default()
        },
    )?;
    assert_eq!(state.scale_factor(), initial.scale_factor());
    assert_eq!(state.best_mse(), None);
    assert_eq!(state.num_visible_points(), 5);
    Ok(())
}

#[test]
fn projection_round_trip() -> Result<(), CalibrationError> {
    for rotation in ROTATIONS {
        let scene = SyntheticScene {
            rotation,
            camera_position: [0.2, 1.4, 0.5],
            ..Default::default()
        };
        let calibrator = scene_calibrator(&scene)?;
        let frame = calibrator.frame()?;
        let surface = ImageSize::new(scene.size.width * 10, scene.size.height * 10);

        let generated = scene.generate(&mut StdRng::seed_from_u64(2), 0)?;
        for point in generated.cloud.points() {
            let raw = project_to_surface(&frame, surface, &point.position).expect("projects");
            let err = calibrator
                .xy_test(&point.position, raw.x, raw.y)?
                .expect("projects");
            assert!(err < 1e-3, "{rotation:?}: {err}");

            // the tap path through the top-left table lands on the same pixel
            let size = generated.depth.size();
            let len = generated.depth.len();
            let from_world = lookup_index(&frame, &point.position, size, len);
            let from_tap = lookup_surface_index(rotation, surface, raw, size, len);
            match (from_world, from_tap) {
                (
                    ScreenLookup::Visible { x: x0, y: y0, .. },
                    ScreenLookup::Visible { x: x1, y: y1, .. },
                ) => {
                    assert!(x0.abs_diff(x1) <= 1 && y0.abs_diff(y1) <= 1, "{rotation:?}");
                }
                other => panic!("{rotation:?}: {other:?}"),
            }
        }
    }
    Ok(())
}

#[test]
fn retention_on_failure() -> Result<(), CalibrationError> {
    let calibrator = identity_calibrator();
    let depth = DepthPrediction::from_value(16, 16, 2.0)?;
    let pose = CameraPose::default();
    let state = calibrator.initial_state();

    let empty = PointCloud::new(vec![], 1);
    let next = calibrator.calibrate_scale_factor(&state, &depth, &empty, &pose)?;
    assert_eq!(next.scale_factor(), state.scale_factor());

    let offscreen = PointCloud::new(
        vec![
            CloudPoint::new(1.5, 0.0, 1.0, 1.0),
            CloudPoint::new(0.0, -3.0, 1.0, 1.0),
        ],
        2,
    );
    let next = calibrator.calibrate_scale_factor(&state, &depth, &offscreen, &pose)?;
    assert_eq!(next.scale_factor(), state.scale_factor());
    assert_eq!(next.num_visible_points(), 0);

    let next = calibrator.calibrate_scale_shift(&state, &depth, &offscreen, &pose)?;
    assert_eq!(next.scale_factor(), state.scale_factor());

    let zero = DepthPrediction::from_value(16, 16, 0.0)?;
    let visible = PointCloud::new(vec![CloudPoint::new(0.0, 0.0, 1.0, 1.0); 4], 3);
    let next = calibrator.calibrate_scale_factor(&state, &zero, &visible, &pose)?;
    assert_eq!(next.scale_factor(), state.scale_factor());
    Ok(())
}

#[test]
fn weighted_average_is_independent_of_count() -> Result<(), CalibrationError> {
    let calibrator = identity_calibrator();
    let (distance, predicted) = (3.0f32, 1.5f32);
    let depth = DepthPrediction::from_value(32, 32, predicted)?;

    for n in [1usize, 4, 9, 25] {
        // points spread over the screen, all at the same distance from the camera
        let points = (0..n)
            .map(|i| {
                let x = -0.5 + (i % 5) as f32 * 0.25;
                let y = -0.5 + (i / 5) as f32 * 0.25;
                let z = (distance * distance - x * x - y * y).sqrt();
                CloudPoint::new(x, y, z, 1.0)
            })
            .collect();
        let cloud = PointCloud::new(points, n as i64);
        let state = calibrator.calibrate_scale_factor(
            &calibrator.initial_state(),
            &depth,
            &cloud,
            &CameraPose::default(),
        )?;
        assert_eq!(state.num_visible_points(), n);
        assert_relative_eq!(state.scale_factor(), distance / predicted, epsilon = 1e-5);
    }
    Ok(())
}

#[test]
fn ransac_is_robust_to_outliers() -> Result<(), CalibrationError> {
    let scene = SyntheticScene {
        outlier_ratio: 0.2,
        prediction_noise: 0.01,
        true_scale: 0.25,
        ..Default::default()
    };
    let calibrator = scene_calibrator(&scene)?;
    let frame = scene.generate(&mut StdRng::seed_from_u64(11), 1)?;
    let num_outliers = frame.outliers.iter().filter(|o| **o).count();
    assert!(num_outliers > 5, "{num_outliers}");

    let params = RansacParams {
        iterations: 100,
        possible_inlier_divider: 20,
        best_consensus_divider: 4,
        random_seed: Some(5),
    };
    let ransac = calibrator.calibrate_scale_factor_ransac(
        &calibrator.initial_state(),
        &frame.depth,
        &frame.cloud,
        &frame.camera_pose,
        &params,
    )?;
    assert!(
        (ransac.scale_factor() - 0.25).abs() < 0.05 * 0.25,
        "{}",
        ransac.scale_factor()
    );
    assert!(ransac.best_mse().is_some());
    assert!(ransac.num_inliers() >= ransac.num_visible_points() / 4);

    let average = calibrator.calibrate_scale_factor(
        &calibrator.initial_state(),
        &frame.depth,
        &frame.cloud,
        &frame.camera_pose,
    )?;
    assert!(
        (average.scale_factor() - 0.25).abs() > 0.2 * 0.25,
        "{}",
        average.scale_factor()
    );
    Ok(())
}

#[test]
fn ransac_rejects_invalid_dividers() -> Result<(), CalibrationError> {
    let calibrator = identity_calibrator();
    let depth = DepthPrediction::from_value(16, 16, 2.0)?;
    let cloud = PointCloud::new(vec![CloudPoint::new(0.0, 0.0, 1.0, 1.0); 8], 1);
    let state = calibrator.initial_state();

    for (possible, best) in [(2, 2), (2, 4), (4, 0)] {
        let params = RansacParams {
            possible_inlier_divider: possible,
            best_consensus_divider: best,
            ..Default::default()
        };
        let res = calibrator.calibrate_scale_factor_ransac(
            &state,
            &depth,
            &cloud,
            &CameraPose::default(),
            &params,
        );
        assert_eq!(
            res,
            Err(CalibrationError::InvalidDividers {
                possible_inlier: possible,
                best_consensus: best,
            })
        );
    }
    assert_eq!(state, calibrator.initial_state());
    Ok(())
}

#[test]
fn least_squares_recovers_scale() -> Result<(), CalibrationError> {
    let scene = SyntheticScene::default();
    let calibrator = scene_calibrator(&scene)?;
    let frame = scene.generate(&mut StdRng::seed_from_u64(4), 1)?;
    let state = calibrator.calibrate_scale_shift(
        &calibrator.initial_state(),
        &frame.depth,
        &frame.cloud,
        &frame.camera_pose,
    )?;
    assert_relative_eq!(state.scale_factor(), scene.true_scale, epsilon = 1e-3);
    assert_relative_eq!(state.shift_factor(), 0.0, epsilon = 1e-3);
    Ok(())
}

#[test]
fn anchor_and_tap_agree_with_cloud_calibration() -> Result<(), CalibrationError> {
    let scene = SyntheticScene::default();
    let calibrator = scene_calibrator(&scene)?;
    let frame = scene.generate(&mut StdRng::seed_from_u64(9), 1)?;
    let state = calibrator.calibrate_scale_factor(
        &calibrator.initial_state(),
        &frame.depth,
        &frame.cloud,
        &frame.camera_pose,
    )?;
    assert_relative_eq!(state.scale_factor(), scene.true_scale, epsilon = 1e-4);

    // placing an anchor on a cloud point gives the same scale
    let point = frame.cloud.points()[0].position;
    let anchored =
        calibrator.calibrate_from_point(&state, &frame.depth, &point, &frame.camera_pose)?;
    assert_relative_eq!(anchored.scale_factor(), scene.true_scale, epsilon = 1e-4);

    // and so does tapping where the point is drawn
    let surface = ImageSize::new(scene.size.width * 10, scene.size.height * 10);
    let raw = project_to_surface(&calibrator.frame()?, surface, &point).expect("projects");
    let diff = calibrator
        .calibration_test(&state, &frame.depth, &point, &frame.camera_pose, raw.x, raw.y)?
        .expect("tap hits the buffer");
    assert!(diff < 1e-4, "{diff}");
    Ok(())
}
