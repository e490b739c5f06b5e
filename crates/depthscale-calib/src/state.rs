use serde::{Deserialize, Serialize};

use crate::sample::DepthSample;

/// Closed interval of observed values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Smallest observed value.
    pub min: f32,
    /// Largest observed value.
    pub max: f32,
}

impl Extent {
    /// Extent of a sequence of values, `None` if it is empty.
    pub fn from_values(values: impl IntoIterator<Item = f32>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Extent { min: v, max: v }),
            Some(e) => Some(Extent {
                min: e.min.min(v),
                max: e.max.max(v),
            }),
        })
    }
}

/// Calibration result threaded from one frame to the next.
///
/// The state is an immutable value: estimators return a new state instead of mutating
/// the previous one. When a pass fails, the returned scale factor is the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    scale_factor: f32,
    shift_factor: f32,
    best_mse: Option<f32>,
    num_visible_points: usize,
    num_inliers: usize,
    predicted_range: Option<Extent>,
    distance_range: Option<Extent>,
    timestamp: i64,
}

impl CalibrationState {
    /// A fresh state with the given scale factor and no observations.
    pub fn new(scale_factor: f32) -> Self {
        Self {
            scale_factor,
            shift_factor: 0.0,
            best_mse: None,
            num_visible_points: 0,
            num_inliers: 0,
            predicted_range: None,
            distance_range: None,
            timestamp: 0,
        }
    }

    /// Multiplicative factor from predicted to metric distance.
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Additive offset of the affine fit, 0 for the purely multiplicative estimators.
    pub fn shift_factor(&self) -> f32 {
        self.shift_factor
    }

    /// Mean squared error of the best RANSAC consensus set, if RANSAC ever succeeded.
    pub fn best_mse(&self) -> Option<f32> {
        self.best_mse
    }

    /// Number of samples used by the last pass.
    pub fn num_visible_points(&self) -> usize {
        self.num_visible_points
    }

    /// Size of the consensus set behind the last committed RANSAC estimate.
    pub fn num_inliers(&self) -> usize {
        self.num_inliers
    }

    /// Range of (polarity-corrected) predictions seen by the last pass with samples.
    pub fn predicted_range(&self) -> Option<Extent> {
        self.predicted_range
    }

    /// Range of tracked distances seen by the last pass with samples.
    pub fn distance_range(&self) -> Option<Extent> {
        self.distance_range
    }

    /// Largest prediction seen, used to normalize depth visualizations.
    pub fn max_predicted_distance(&self) -> Option<f32> {
        self.predicted_range.map(|e| e.max)
    }

    /// Timestamp of the last point cloud consumed, 0 if none.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Metric distance for a prediction: `predicted * scale + shift`.
    pub fn to_metric(&self, predicted: f32) -> f32 {
        predicted * self.scale_factor + self.shift_factor
    }

    /// Record the samples of a pass. The scale is left untouched.
    ///
    /// Ranges are only replaced when at least one sample was observed.
    pub(crate) fn observe(&self, samples: &[DepthSample], timestamp: i64) -> Self {
        let predicted_range = Extent::from_values(samples.iter().map(|s| s.predicted));
        let distance_range = Extent::from_values(samples.iter().map(|s| s.distance));
        Self {
            num_visible_points: samples.len(),
            predicted_range: predicted_range.or(self.predicted_range),
            distance_range: distance_range.or(self.distance_range),
            timestamp,
            ..*self
        }
    }

    pub(crate) fn with_scale(&self, scale_factor: f32) -> Self {
        Self {
            scale_factor,
            shift_factor: 0.0,
            ..*self
        }
    }

    pub(crate) fn with_scale_shift(&self, scale_factor: f32, shift_factor: f32) -> Self {
        Self {
            scale_factor,
            shift_factor,
            ..*self
        }
    }

    pub(crate) fn with_consensus(&self, best_mse: f32, num_inliers: usize) -> Self {
        Self {
            best_mse: Some(best_mse),
            num_inliers,
            ..*self
        }
    }

    pub(crate) fn with_num_visible_points(&self, num_visible_points: usize) -> Self {
        Self {
            num_visible_points,
            ..*self
        }
    }
}
