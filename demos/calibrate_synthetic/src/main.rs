use std::path::PathBuf;

use argh::FromArgs;
use rand::{rngs::StdRng, SeedableRng};

use depthscale::calib::{
    diagnostics::project_to_surface, synthetic::SyntheticScene, CalibrationState,
    CalibratorConfig, RansacParams, ScaleCalibrator,
};
use depthscale::k3d::{camera::CameraPose, projection::ImageSize, trackable::Trackable};
use depthscale::imgproc::{parallel::ExecutionStrategy, quantize};

#[derive(FromArgs, Debug)]
/// Calibrate the scale of a synthetic depth prediction against its point cloud.
struct Args {
    /// path to a JSON file with the calibrator configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// random seed for the scene and RANSAC
    #[argh(option, short = 's', default = "42")]
    seed: u64,

    /// number of frames to calibrate
    #[argh(option, short = 'f', default = "5")]
    frames: usize,

    /// fraction of points with corrupted predictions
    #[argh(option, default = "0.2")]
    outlier_ratio: f64,

    /// relative noise added to every prediction
    #[argh(option, default = "0.01")]
    noise: f32,

    /// number of RANSAC iterations
    #[argh(option, short = 'i', default = "100")]
    iterations: usize,

    /// divider giving the size of the random subset
    #[argh(option, default = "20")]
    possible_inlier_divider: usize,

    /// divider giving the minimum consensus size
    #[argh(option, default = "4")]
    best_consensus_divider: usize,

    /// number of grey levels of the quantized depth map
    #[argh(option, short = 'l', default = "16")]
    levels: u32,

    /// number of threads used to quantize the depth map
    #[argh(option, short = 'n', default = "4")]
    num_threads: usize,
}

fn report(name: &str, state: &CalibrationState) {
    println!(
        "{name:>14}: scale {:.4} shift {:.4} mse {:?} inliers {} visible {}",
        state.scale_factor(),
        state.shift_factor(),
        state.best_mse(),
        state.num_inliers(),
        state.num_visible_points(),
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config: CalibratorConfig = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => CalibratorConfig::default(),
    };
    log::info!("calibrator config: {config:?}");

    let scene = SyntheticScene {
        outlier_ratio: args.outlier_ratio,
        prediction_noise: args.noise,
        ..Default::default()
    };
    let params = RansacParams {
        iterations: args.iterations,
        possible_inlier_divider: args.possible_inlier_divider,
        best_consensus_divider: args.best_consensus_divider,
        random_seed: Some(args.seed),
    };

    let probe = scene.camera_frame();
    let mut calibrator = ScaleCalibrator::new(config);
    calibrator.set_camera_view(&probe.view().to_cols_array());
    calibrator.set_camera_perspective(&probe.projection().to_cols_array());
    calibrator.set_display_rotation(probe.rotation().degrees())?;
    let surface = ImageSize::new(scene.size.width * 8, scene.size.height * 8);
    calibrator.set_surface_size(surface.width, surface.height);

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut weighted = calibrator.initial_state();
    let mut robust = calibrator.initial_state();
    let mut affine = calibrator.initial_state();
    let mut last_depth = None;

    println!("true scale: {:.4}", scene.true_scale);
    for timestamp in 1..=args.frames as i64 {
        let frame = scene.generate(&mut rng, timestamp)?;
        let num_outliers = frame.outliers.iter().filter(|&&o| o).count();
        println!(
            "frame {timestamp}: {} points, {num_outliers} outliers",
            frame.cloud.len()
        );

        let pose = &frame.camera_pose;
        weighted = calibrator.calibrate_scale_factor(&weighted, &frame.depth, &frame.cloud, pose)?;
        robust = calibrator.calibrate_scale_factor_ransac(
            &robust,
            &frame.depth,
            &frame.cloud,
            pose,
            &params,
        )?;
        affine = calibrator.calibrate_scale_shift(&affine, &frame.depth, &frame.cloud, pose)?;

        report("weighted", &weighted);
        report("ransac", &robust);
        report("least squares", &affine);

        // tap where the most confident point is drawn, as a user placing an anchor would
        if let Some(best) = frame
            .cloud
            .points()
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
        {
            let target = Trackable::Point {
                pose: CameraPose {
                    translation: best.position,
                },
                normal: [0.0, 0.0, 1.0],
            };
            if let Some(raw) = project_to_surface(&probe, surface, &best.position) {
                let tapped = calibrator.calibrate_from_tap(
                    &calibrator.initial_state(),
                    &frame.depth,
                    &target,
                    pose,
                    raw.x,
                    raw.y,
                );
                report("tap", &tapped);
                if let Some(diff) = calibrator.calibration_test(
                    &robust,
                    &frame.depth,
                    &best.position,
                    pose,
                    raw.x,
                    raw.y,
                )? {
                    println!("{:>14}: |tap - ransac| = {diff:.4}", "check");
                }
            }
        }

        last_depth = Some(frame.depth);
    }

    let (Some(depth), Some(max_predicted)) = (last_depth, robust.max_predicted_distance()) else {
        println!("no frame produced a visible point, nothing to quantize");
        return Ok(());
    };

    let mut grey = vec![0u8; depth.len()];
    quantize::quantize_depth(
        depth.as_slice(),
        max_predicted,
        args.levels,
        ExecutionStrategy::Fixed(args.num_threads),
        &mut grey,
    )?;

    let mut histogram = [0usize; 256];
    grey.iter().for_each(|&g| histogram[g as usize] += 1);
    println!("quantized depth map ({} levels):", quantize::normalize_levels(args.levels));
    for (value, count) in histogram.iter().enumerate().filter(|(_, c)| **c > 0) {
        println!("  grey {value:>3}: {count} px");
    }

    Ok(())
}
