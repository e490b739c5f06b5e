use serde::{Deserialize, Serialize};

/// Number of floats per point in the tracker's packed layout: X, Y, Z, confidence.
pub const FLOATS_PER_POINT: usize = 4;

/// A tracked feature point with its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudPoint {
    /// Position in world coordinates.
    pub position: [f32; 3],
    /// Tracking confidence in `[0, 1]`.
    pub confidence: f32,
}

impl CloudPoint {
    /// Create a new point.
    pub fn new(x: f32, y: f32, z: f32, confidence: f32) -> Self {
        Self {
            position: [x, y, z],
            confidence,
        }
    }
}

/// The sparse point cloud of a single tracked frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    // The points of the frame in tracker order.
    points: Vec<CloudPoint>,
    // Timestamp of the frame, 0 when unknown.
    timestamp: i64,
}

impl PointCloud {
    /// Create a new point cloud from points and a frame timestamp.
    pub fn new(points: Vec<CloudPoint>, timestamp: i64) -> Self {
        Self { points, timestamp }
    }

    /// Create a point cloud from the packed `X, Y, Z, C` float layout.
    ///
    /// A trailing partial record is ignored.
    pub fn from_flat(data: &[f32], timestamp: i64) -> Self {
        let points = data
            .chunks_exact(FLOATS_PER_POINT)
            .map(|p| CloudPoint::new(p[0], p[1], p[2], p[3]))
            .collect();
        Self { points, timestamp }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[CloudPoint] {
        &self.points
    }

    /// Timestamp of the frame the cloud was captured in.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
