use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::CalibrationError;

/// Default scale factor used until a calibration pass succeeds.
pub const DEFAULT_SCALE_FACTOR: f32 = 0.2;

/// Maximum number of cloud points considered per frame.
pub const MAX_POINTS: usize = 250;

/// How a raw prediction is turned into a value proportional to distance.
///
/// Depth models disagree on polarity: some emit larger values for farther pixels, others
/// emit larger values for closer ones. The estimators always divide the tracked distance
/// by the transformed prediction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionPolarity {
    /// Use the prediction as is.
    #[default]
    Direct,
    /// Use `max_level - prediction`.
    Inverted {
        /// The largest value the model can emit.
        max_level: f32,
    },
}

impl PredictionPolarity {
    /// Apply the polarity to a raw prediction.
    #[inline]
    pub fn apply(&self, predicted: f32) -> f32 {
        match self {
            PredictionPolarity::Direct => predicted,
            PredictionPolarity::Inverted { max_level } => max_level - predicted,
        }
    }
}

/// Configuration of a [`crate::ScaleCalibrator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibratorConfig {
    /// Scale factor of a fresh calibration state.
    pub default_scale_factor: f32,
    /// Maximum number of samples used per pass.
    pub max_points: usize,
    /// Minimum number of samples for a pass to update the state.
    pub min_points: usize,
    /// A committed scale factor must be strictly greater than this value.
    pub min_scale_factor: f32,
    /// Polarity transform applied to every prediction.
    pub polarity: PredictionPolarity,
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            default_scale_factor: DEFAULT_SCALE_FACTOR,
            max_points: MAX_POINTS,
            min_points: 1,
            min_scale_factor: 0.0,
            polarity: PredictionPolarity::Direct,
        }
    }
}

impl CalibratorConfig {
    /// Whether `scale` may be committed to the state.
    pub(crate) fn accepts_scale(&self, scale: f64) -> bool {
        scale.is_finite() && scale > self.min_scale_factor as f64
    }
}

/// Parameters for RANSAC scale estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacParams {
    /// Number of random trials.
    pub iterations: usize,
    /// The random subset holds `num_points / possible_inlier_divider` samples.
    pub possible_inlier_divider: usize,
    /// A consensus set needs at least `num_points / best_consensus_divider` samples.
    pub best_consensus_divider: usize,
    /// Optional RNG seed for deterministic runs.
    pub random_seed: Option<u64>,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            iterations: 100,
            possible_inlier_divider: 4,
            best_consensus_divider: 2,
            random_seed: None,
        }
    }
}

impl RansacParams {
    /// Check `possible_inlier_divider > best_consensus_divider > 0`.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.best_consensus_divider == 0
            || self.possible_inlier_divider <= self.best_consensus_divider
        {
            return Err(CalibrationError::InvalidDividers {
                possible_inlier: self.possible_inlier_divider,
                best_consensus: self.best_consensus_divider,
            });
        }
        Ok(())
    }

    /// Build the random generator described by `random_seed`.
    pub fn rng(&self) -> StdRng {
        match self.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                let mut tr = rand::rng();
                StdRng::from_rng(&mut tr)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity() {
        assert_eq!(PredictionPolarity::Direct.apply(3.0), 3.0);
        assert_eq!(
            PredictionPolarity::Inverted { max_level: 255.0 }.apply(55.0),
            200.0
        );
    }

    #[test]
    fn test_ransac_params_validate() {
        assert!(RansacParams::default().validate().is_ok());
        let params = RansacParams {
            possible_inlier_divider: 2,
            best_consensus_divider: 2,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(CalibrationError::InvalidDividers {
                possible_inlier: 2,
                best_consensus: 2
            })
        );
        let params = RansacParams {
            possible_inlier_divider: 3,
            best_consensus_divider: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_config_from_json() -> Result<(), serde_json::Error> {
        let config: CalibratorConfig = serde_json::from_str(
            r#"{"max_points": 20, "polarity": {"kind": "inverted", "max_level": 1.0}}"#,
        )?;
        assert_eq!(config.max_points, 20);
        assert_eq!(config.default_scale_factor, DEFAULT_SCALE_FACTOR);
        assert_eq!(config.polarity, PredictionPolarity::Inverted { max_level: 1.0 });
        Ok(())
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        use rand::Rng;
        let params = RansacParams {
            random_seed: Some(3),
            ..Default::default()
        };
        let a: u64 = params.rng().random();
        let b: u64 = params.rng().random();
        assert_eq!(a, b);
    }
}
