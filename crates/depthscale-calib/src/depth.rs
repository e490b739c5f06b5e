use depthscale_3d::projection::ImageSize;

use crate::CalibrationError;

/// Depth prediction of a single inference cycle.
///
/// A dense row-major buffer with one relative distance per pixel of the model's output
/// resolution. Values have no unit until scaled by a calibrated scale factor.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthPrediction {
    size: ImageSize,
    data: Vec<f32>,
}

impl DepthPrediction {
    /// Create a depth prediction, checking that `data` holds `width * height` values.
    ///
    /// Example:
    /// ```
    /// use depthscale_calib::DepthPrediction;
    ///
    /// let depth = DepthPrediction::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(depth.get(3), Some(4.0));
    /// assert!(DepthPrediction::new(2, 2, vec![1.0]).is_err());
    /// ```
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, CalibrationError> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(CalibrationError::InvalidShape(data.len(), width, height));
        }
        Ok(Self {
            size: ImageSize::new(width, height),
            data,
        })
    }

    /// Create a depth prediction with every pixel set to `value`.
    pub fn from_value(width: usize, height: usize, value: f32) -> Result<Self, CalibrationError> {
        Self::new(width, height, vec![value; width * height])
    }

    /// The resolution of the prediction.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Width of the prediction.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Height of the prediction.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Number of values in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The value at a flat index, if in bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.data.get(index).copied()
    }

    /// The raw row-major buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to the raw row-major buffer.
    pub fn as_slice_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }
}
