use crate::{config::CalibratorConfig, sample::DepthSample, state::CalibrationState};

/// Confidence weighted mean of the per-sample scale factors.
///
/// Samples with a non-finite scale are ignored. Returns `None` when the total weight is
/// not positive or the mean is not finite.
pub fn weighted_scale(samples: &[DepthSample]) -> Option<f64> {
    let (sum_scale, sum_weight) = samples
        .iter()
        .filter_map(|s| {
            let scale = s.scale();
            scale.is_finite().then_some((scale, s.confidence as f64))
        })
        .fold((0.0f64, 0.0f64), |(acc_s, acc_w), (scale, weight)| {
            (acc_s + scale * weight, acc_w + weight)
        });

    if sum_weight <= 0.0 {
        return None;
    }
    let scale = sum_scale / sum_weight;
    scale.is_finite().then_some(scale)
}

/// Update the scale factor with the confidence weighted mean of the samples.
///
/// At most `config.max_points` samples are used. With fewer than `config.min_points`
/// samples, or when the mean is not an acceptable scale, the previous scale is kept.
///
/// Example:
/// ```
/// use depthscale_calib::{
///     weighted::weighted_average, CalibrationState, CalibratorConfig, DepthSample,
/// };
///
/// let samples = vec![DepthSample::new(1.0, 2.0, 1.0); 5];
/// let config = CalibratorConfig::default();
/// let state = weighted_average(&samples, &CalibrationState::new(0.2), &config);
/// assert_eq!(state.scale_factor(), 0.5);
/// ```
pub fn weighted_average(
    samples: &[DepthSample],
    state: &CalibrationState,
    config: &CalibratorConfig,
) -> CalibrationState {
    let samples = &samples[..samples.len().min(config.max_points)];

    if samples.is_empty() || samples.len() < config.min_points {
        log::debug!(
            "Not enough samples for calibration: {} < {}",
            samples.len(),
            config.min_points.max(1)
        );
        return *state;
    }

    match weighted_scale(samples) {
        Some(scale) if config.accepts_scale(scale) => state.with_scale(scale as f32),
        other => {
            log::info!(
                "Invalid scale factor {:?}, keeping {}",
                other,
                state.scale_factor()
            );
            *state
        }
    }
}
