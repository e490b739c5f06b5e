use crate::{config::CalibratorConfig, sample::DepthSample, state::CalibrationState};

/// Weighted least-squares fit of `predicted * scale + shift = distance`.
///
/// Solves the 2x2 normal equations in closed form with the confidences as weights.
/// Returns `None` when fewer than two distinct predictions carry weight, or the solution
/// is not finite.
///
/// Example:
/// ```
/// use depthscale_calib::{least_squares::fit_scale_shift, DepthSample};
///
/// let samples = [
///     DepthSample::new(2.5, 1.0, 1.0),
///     DepthSample::new(4.5, 2.0, 1.0),
///     DepthSample::new(6.5, 3.0, 1.0),
/// ];
/// let (scale, shift) = fit_scale_shift(&samples).unwrap();
/// assert!((scale - 2.0).abs() < 1e-9);
/// assert!((shift - 0.5).abs() < 1e-9);
/// ```
pub fn fit_scale_shift(samples: &[DepthSample]) -> Option<(f64, f64)> {
    let mut sw = 0.0f64;
    let mut sp = 0.0f64;
    let mut sd = 0.0f64;
    let mut spp = 0.0f64;
    let mut spd = 0.0f64;

    for s in samples {
        let (p, d, w) = (s.predicted as f64, s.distance as f64, s.confidence as f64);
        if !(p.is_finite() && d.is_finite() && w.is_finite()) {
            continue;
        }
        sw += w;
        sp += w * p;
        sd += w * d;
        spp += w * p * p;
        spd += w * p * d;
    }

    let det = sw * spp - sp * sp;
    // relative test: the determinant scales with the square of the weights
    if sw <= 0.0 || det.abs() <= f64::EPSILON * sw * spp {
        return None;
    }

    let scale = (sw * spd - sp * sd) / det;
    let shift = (spp * sd - sp * spd) / det;

    (scale.is_finite() && shift.is_finite()).then_some((scale, shift))
}

/// Update scale and shift with a weighted least-squares fit.
///
/// At most `config.max_points` samples are used. The previous state is kept when the
/// fit is degenerate or the scale is not acceptable.
pub fn least_squares(
    samples: &[DepthSample],
    state: &CalibrationState,
    config: &CalibratorConfig,
) -> CalibrationState {
    let samples = &samples[..samples.len().min(config.max_points)];

    if samples.len() < config.min_points.max(2) {
        log::debug!("Not enough samples for least squares: {}", samples.len());
        return *state;
    }

    match fit_scale_shift(samples) {
        Some((scale, shift)) if config.accepts_scale(scale) => {
            log::debug!("Least squares scale {} shift {}", scale, shift);
            state.with_scale_shift(scale as f32, shift as f32)
        }
        other => {
            log::info!(
                "Invalid least squares fit {:?}, keeping {}",
                other,
                state.scale_factor()
            );
            *state
        }
    }
}
