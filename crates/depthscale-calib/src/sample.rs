use depthscale_3d::{
    camera::{CameraFrame, CameraPose},
    ops::euclidean_distance,
    pointcloud::PointCloud,
    projection::{lookup_index, ScreenLookup},
};
use serde::{Deserialize, Serialize};

use crate::{config::PredictionPolarity, depth::DepthPrediction};

/// A tracked distance paired with the prediction at the same pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthSample {
    /// Metric distance between the point and the camera.
    pub distance: f32,
    /// Polarity-corrected prediction at the point's pixel.
    pub predicted: f32,
    /// Tracking confidence of the point, used as weight.
    pub confidence: f32,
}

impl DepthSample {
    /// Create a new sample.
    pub fn new(distance: f32, predicted: f32, confidence: f32) -> Self {
        Self {
            distance,
            predicted,
            confidence,
        }
    }

    /// The scale factor implied by this sample alone, `distance / predicted`.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.distance as f64 / self.predicted as f64
    }
}

/// Read the polarity-corrected prediction at `index`.
///
/// Missing, non-finite and non-positive predictions yield `None`: dividing by them cannot
/// give a meaningful scale.
pub(crate) fn prediction_at(
    depth: &DepthPrediction,
    index: usize,
    polarity: PredictionPolarity,
) -> Option<f32> {
    let predicted = polarity.apply(depth.get(index)?);
    (predicted.is_finite() && predicted > 0.0).then_some(predicted)
}

/// Pair every usable cloud point with its prediction.
///
/// Points are visited in cloud order and collection stops after `limit` samples. A point
/// is skipped when it projects off screen, past the end of the buffer, onto an unusable
/// prediction, or carries a non-finite confidence. Confidences are clamped to `[0, 1]`.
///
/// # Arguments
///
/// * `depth` - Depth prediction of the frame.
/// * `cloud` - Point cloud of the frame.
/// * `camera_pose` - Camera position the distances are measured from.
/// * `frame` - Camera matrices and display rotation of the frame.
/// * `polarity` - Polarity transform applied to predictions.
/// * `limit` - Maximum number of samples.
pub fn collect_samples(
    depth: &DepthPrediction,
    cloud: &PointCloud,
    camera_pose: &CameraPose,
    frame: &CameraFrame,
    polarity: PredictionPolarity,
    limit: usize,
) -> Vec<DepthSample> {
    let mut samples = Vec::with_capacity(cloud.len().min(limit));
    let mut num_offscreen = 0usize;
    let mut num_missing = 0usize;

    for point in cloud.points() {
        if samples.len() >= limit {
            break;
        }
        if !point.confidence.is_finite() {
            continue;
        }

        let index = match lookup_index(frame, &point.position, depth.size(), depth.len()) {
            ScreenLookup::Visible { index, .. } => index,
            ScreenLookup::OffScreen => {
                num_offscreen += 1;
                continue;
            }
            ScreenLookup::OutOfBounds => {
                num_missing += 1;
                continue;
            }
        };

        let Some(predicted) = prediction_at(depth, index, polarity) else {
            num_missing += 1;
            continue;
        };

        let distance = euclidean_distance(&point.position, &camera_pose.translation);
        samples.push(DepthSample::new(
            distance,
            predicted,
            point.confidence.clamp(0.0, 1.0),
        ));
    }

    if num_missing > 0 {
        log::debug!("Prediction not found for {} points", num_missing);
    }
    log::trace!(
        "Collected {} samples, {} points off screen",
        samples.len(),
        num_offscreen
    );

    samples
}
