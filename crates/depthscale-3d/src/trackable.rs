use crate::camera::CameraPose;

/// A tracked entity hit by a tap, carrying only what anchoring needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trackable {
    /// A detected plane; the normal is the plane normal.
    Plane {
        /// Pose of the hit on the plane.
        pose: CameraPose,
        /// Plane normal in world coordinates.
        normal: [f32; 3],
    },
    /// A single feature point; the normal is its estimated surface normal.
    Point {
        /// Pose of the feature point.
        pose: CameraPose,
        /// Estimated surface normal in world coordinates.
        normal: [f32; 3],
    },
}

impl Trackable {
    /// World position of the hit.
    pub fn position(&self) -> [f32; 3] {
        match self {
            Trackable::Plane { pose, .. } | Trackable::Point { pose, .. } => pose.translation,
        }
    }

    /// Normal of the hit surface.
    pub fn normal(&self) -> [f32; 3] {
        match self {
            Trackable::Plane { normal, .. } | Trackable::Point { normal, .. } => *normal,
        }
    }

    /// Whether the hit lies on a detected plane.
    pub fn is_plane(&self) -> bool {
        matches!(self, Trackable::Plane { .. })
    }
}
