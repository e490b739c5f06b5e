use crate::{
    error::ImgprocError,
    parallel::{ExecuteExt, ExecutionStrategy},
};

/// Fewest grey levels a quantized map may use.
pub const MIN_LEVELS: u32 = 2;

/// Most grey levels a quantized map may use.
pub const MAX_LEVELS: u32 = 256;

const LEVEL_MASK: u32 = 0xFF;

/// Clamp a requested level count to an even value in `[MIN_LEVELS, MAX_LEVELS]`.
///
/// Odd counts are rounded down and counts above the maximum are halved until they fit.
///
/// # Example
///
/// ```
/// use depthscale_imgproc::quantize::normalize_levels;
///
/// assert_eq!(normalize_levels(0), 2);
/// assert_eq!(normalize_levels(7), 6);
/// assert_eq!(normalize_levels(1000), 250);
/// ```
pub fn normalize_levels(levels: u32) -> u32 {
    let mut levels = levels.max(MIN_LEVELS);
    levels -= levels % 2;
    while levels > MAX_LEVELS {
        levels /= 2;
    }
    levels
}

/// Quantize one prediction to a grey value.
///
/// `levels` must already be normalized.
pub fn quantize_value(prediction: f32, max_predicted: f32, levels: u32) -> u8 {
    let steps = levels - 1;
    let step = (MAX_LEVELS - 1) as f32 / steps as f32;

    let normalized = (prediction / max_predicted).max(0.0);
    // truncation picks the level
    let level = (normalized * steps as f32) as u32;
    let grey = (level as f32 * step) as u32;
    (grey & LEVEL_MASK) as u8
}

/// Pack a grey value into an opaque ARGB pixel.
pub fn to_argb(grey: u8) -> u32 {
    let g = grey as u32;
    0xFF00_0000 | (g << 16) | (g << 8) | g
}

/// Quantize a depth prediction buffer into `levels` evenly spaced grey values.
///
/// Predictions are normalized by `max_predicted` and clipped below at zero.
/// Values above `max_predicted` wrap through the 8-bit mask.
///
/// # Arguments
///
/// * `data` - The row-major depth prediction buffer.
/// * `max_predicted` - The normalization factor, usually the largest prediction
///   seen by the calibrator.
/// * `levels` - The requested number of grey levels, see [`normalize_levels`].
/// * `strategy` - How to distribute the work.
/// * `out` - The grey value per pixel, same length as `data`.
pub fn quantize_depth(
    data: &[f32],
    max_predicted: f32,
    levels: u32,
    strategy: ExecutionStrategy,
    out: &mut [u8],
) -> Result<(), ImgprocError> {
    if !max_predicted.is_finite() || max_predicted <= 0.0 {
        return Err(ImgprocError::InvalidNormalization(max_predicted));
    }

    let levels = normalize_levels(levels);
    log::debug!("quantizing {} predictions to {} levels", data.len(), levels);

    data.execute_with(strategy, out, |(&p, q)| {
        *q = quantize_value(p, max_predicted, levels);
    })
}

/// Quantize a depth prediction buffer straight into opaque ARGB pixels.
pub fn quantize_depth_argb(
    data: &[f32],
    max_predicted: f32,
    levels: u32,
    strategy: ExecutionStrategy,
    out: &mut [u32],
) -> Result<(), ImgprocError> {
    if !max_predicted.is_finite() || max_predicted <= 0.0 {
        return Err(ImgprocError::InvalidNormalization(max_predicted));
    }

    let levels = normalize_levels(levels);
    data.execute_with(strategy, out, |(&p, q)| {
        *q = to_argb(quantize_value(p, max_predicted, levels));
    })
}
