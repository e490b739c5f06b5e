//! RANSAC scale estimation.
//!
//! Each trial draws a random subset of samples, averages their scale estimates, and grows
//! a consensus set with every other sample whose squared deviation from that average is
//! strictly below the subset's own mean squared deviation. The consensus set with the lowest mean
//! squared error wins.

use rand::Rng;

use crate::{
    config::{CalibratorConfig, RansacParams},
    sample::DepthSample,
    state::CalibrationState,
    CalibrationError,
};

/// Best model found by [`ransac_scale`].
#[derive(Debug, Clone, PartialEq)]
pub struct RansacModel {
    /// Confidence weighted scale of the consensus set.
    pub scale: f64,
    /// Unweighted mean squared deviation of the consensus set from `scale`.
    pub mse: f64,
    /// Indices of the consensus set into the input samples, in admission order.
    pub inliers: Vec<usize>,
}

/// Order samples by decreasing confidence and keep at most `max_points`.
///
/// The sort is stable so equally confident samples keep their cloud order.
pub fn rank_by_confidence(samples: &[DepthSample], max_points: usize) -> Vec<DepthSample> {
    let mut ranked = samples.to_vec();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked.truncate(max_points);
    ranked
}

/// Run the RANSAC trials over samples.
///
/// Returns `Ok(None)` when the samples are too few for a subset or no trial produced a
/// large enough consensus set.
///
/// # Arguments
///
/// * `samples` - Samples to estimate the scale from. Indices in the result refer to it.
/// * `params` - Iterations and subset dividers. `random_seed` is ignored, use `rng`.
/// * `rng` - Random source for subset selection.
///
/// # Errors
///
/// [`CalibrationError::InvalidDividers`] when the dividers are not ordered.
pub fn ransac_scale<R: Rng + ?Sized>(
    samples: &[DepthSample],
    params: &RansacParams,
    rng: &mut R,
) -> Result<Option<RansacModel>, CalibrationError> {
    params.validate()?;

    // per-sample scale and weight; unusable samples never enter a set
    let mut origin = Vec::with_capacity(samples.len());
    let mut scales = Vec::with_capacity(samples.len());
    let mut weights = Vec::with_capacity(samples.len());
    for (i, s) in samples.iter().enumerate() {
        let (scale, weight) = (s.scale(), s.confidence as f64);
        if scale.is_finite() && weight.is_finite() {
            origin.push(i);
            scales.push(scale);
            weights.push(weight);
        }
    }
    let n = scales.len();

    let subset_size = n / params.possible_inlier_divider;
    let min_consensus = n / params.best_consensus_divider;

    if subset_size == 0 {
        log::debug!(
            "Not enough samples for RANSAC: {} with divider {}",
            n,
            params.possible_inlier_divider
        );
        return Ok(None);
    }

    let mut best: Option<RansacModel> = None;
    let mut in_subset = vec![false; n];
    let mut consensus: Vec<usize> = Vec::with_capacity(n);

    for _ in 0..params.iterations {
        let subset = rand::seq::index::sample(rng, n, subset_size);

        in_subset.fill(false);
        consensus.clear();

        let mut sum_scale = 0.0;
        let mut sum_weight = 0.0;
        for idx in subset.iter() {
            in_subset[idx] = true;
            consensus.push(idx);
            sum_scale += scales[idx] * weights[idx];
            sum_weight += weights[idx];
        }

        if sum_weight <= 0.0 {
            continue;
        }
        let candidate = sum_scale / sum_weight;
        if !candidate.is_finite() {
            continue;
        }

        // admission threshold: the subset's own mean squared deviation, fixed for the trial
        let threshold = subset
            .iter()
            .map(|idx| (candidate - scales[idx]).powi(2))
            .sum::<f64>()
            / subset_size as f64;

        for idx in 0..n {
            if in_subset[idx] {
                continue;
            }
            if (candidate - scales[idx]).powi(2) < threshold {
                consensus.push(idx);
                sum_scale += scales[idx] * weights[idx];
                sum_weight += weights[idx];
            }
        }

        if consensus.len() < min_consensus {
            continue;
        }

        let refined = sum_scale / sum_weight;
        let mse = consensus
            .iter()
            .map(|&idx| (refined - scales[idx]).powi(2))
            .sum::<f64>()
            / consensus.len() as f64;

        if !refined.is_finite() || !mse.is_finite() {
            continue;
        }

        // ties keep the earlier model
        if best.as_ref().map_or(true, |b| mse < b.mse) {
            best = Some(RansacModel {
                scale: refined,
                mse,
                inliers: consensus.iter().map(|&idx| origin[idx]).collect(),
            });
        }
    }

    Ok(best)
}

/// Update the scale factor with a RANSAC estimate.
///
/// Samples are ranked by confidence and capped to `config.max_points` before the trials.
/// The divider contract is checked first; any other failure keeps the previous scale.
///
/// # Errors
///
/// [`CalibrationError::InvalidDividers`] when `possible_inlier_divider` is not greater
/// than `best_consensus_divider`, or the latter is zero.
pub fn ransac<R: Rng + ?Sized>(
    samples: &[DepthSample],
    state: &CalibrationState,
    config: &CalibratorConfig,
    params: &RansacParams,
    rng: &mut R,
) -> Result<CalibrationState, CalibrationError> {
    params.validate()?;

    let ranked = rank_by_confidence(samples, config.max_points);
    let state = state.with_num_visible_points(ranked.len());

    if ranked.is_empty() || ranked.len() < config.min_points {
        log::debug!("Not enough samples for RANSAC: {}", ranked.len());
        return Ok(state);
    }

    match ransac_scale(&ranked, params, rng)? {
        Some(model) if config.accepts_scale(model.scale) => {
            log::debug!(
                "RANSAC scale {} with {} inliers, mse {}",
                model.scale,
                model.inliers.len(),
                model.mse
            );
            Ok(state
                .with_scale(model.scale as f32)
                .with_consensus(model.mse as f32, model.inliers.len()))
        }
        other => {
            log::info!(
                "Invalid RANSAC scale factor {:?}, keeping {}",
                other.map(|m| m.scale),
                state.scale_factor()
            );
            Ok(state)
        }
    }
}
