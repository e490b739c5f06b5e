use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::camera::{CameraFrame, DisplayRotation};

/// Width and height of a buffer or a render surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl ImageSize {
    /// Create a new size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of pixels, `width * height`.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Outcome of looking up a world point in a depth buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenLookup {
    /// The point is on screen and maps to a valid buffer element.
    Visible {
        /// Flat row-major index into the buffer.
        index: usize,
        /// Column in the buffer.
        x: usize,
        /// Row in the buffer.
        y: usize,
    },
    /// The point falls outside the clip volume.
    OffScreen,
    /// The point is on screen but the computed index is past the end of the buffer.
    OutOfBounds,
}

impl ScreenLookup {
    /// The buffer index, if the point is visible.
    pub fn index(&self) -> Option<usize> {
        match self {
            ScreenLookup::Visible { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Project a world point to normalized device coordinates.
///
/// Returns `None` when the point lies outside `[-1, 1]` on either axis or when
/// the perspective divide is degenerate.
pub fn project_to_ndc(frame: &CameraFrame, point: &[f32; 3]) -> Option<Vec2> {
    let ndc = project_to_ndc_unclipped(frame, point)?;
    if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
        return None;
    }
    Some(ndc)
}

/// Project a world point to normalized device coordinates without clipping.
pub fn project_to_ndc_unclipped(frame: &CameraFrame, point: &[f32; 3]) -> Option<Vec2> {
    let clip = *frame.view_projection() * Vec4::new(point[0], point[1], point[2], 1.0);
    if clip.w == 0.0 {
        return None;
    }
    let ndc = Vec2::new(clip.x / clip.w, clip.y / clip.w);
    ndc.is_finite().then_some(ndc)
}

/// Viewport transform from `[-1, 1]` to UV in `[0, 1]` with bottom-left origin.
#[inline]
pub fn ndc_to_uv(ndc: Vec2) -> Vec2 {
    ndc * 0.5 + 0.5
}

/// Viewport transform from `[-1, 1]` to surface pixels with top-left origin.
///
/// The result is not rounded.
pub fn ndc_to_surface(ndc: Vec2, surface: ImageSize) -> Vec2 {
    let half_w = surface.width as f32 / 2.0;
    let half_h = surface.height as f32 / 2.0;
    Vec2::new(ndc.x * half_w + half_w, -ndc.y * half_h + half_h)
}

/// Convert a UV coordinate already aligned with the buffer into a flat index.
///
/// `x = round(u * width)`, `y = round(v * height)`, `index = y * width + x`.
pub fn uv_to_index(uv: Vec2, size: ImageSize, len: usize) -> ScreenLookup {
    if !uv.is_finite() || uv.x < 0.0 || uv.y < 0.0 {
        return ScreenLookup::OutOfBounds;
    }
    let x = (uv.x * size.width as f32).round() as usize;
    let y = (uv.y * size.height as f32).round() as usize;
    let index = y * size.width + x;
    if index >= len {
        return ScreenLookup::OutOfBounds;
    }
    ScreenLookup::Visible { index, x, y }
}

/// Look up the buffer element a world point projects onto.
///
/// # Arguments
///
/// * `frame` - Camera matrices and display rotation of the frame.
/// * `point` - The point in world coordinates.
/// * `size` - Size of the buffer.
/// * `len` - Number of elements in the buffer.
pub fn lookup_index(
    frame: &CameraFrame,
    point: &[f32; 3],
    size: ImageSize,
    len: usize,
) -> ScreenLookup {
    let Some(ndc) = project_to_ndc(frame, point) else {
        return ScreenLookup::OffScreen;
    };
    let uv = frame.rotation().transform_bottom_left(ndc_to_uv(ndc));
    uv_to_index(uv, size, len)
}

/// Look up the buffer element under a surface coordinate with top-left origin.
///
/// Coordinates outside the surface are reported as [`ScreenLookup::OffScreen`].
pub fn lookup_surface_index(
    rotation: DisplayRotation,
    surface: ImageSize,
    raw: Vec2,
    size: ImageSize,
    len: usize,
) -> ScreenLookup {
    if surface.width == 0 || surface.height == 0 {
        return ScreenLookup::OffScreen;
    }
    let uv = raw / Vec2::new(surface.width as f32, surface.height as f32);
    if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
        return ScreenLookup::OffScreen;
    }
    uv_to_index(rotation.transform_top_left(uv), size, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DisplayRotation;
    use approx::assert_relative_eq;
    use glam::{Mat4, Vec3};

    fn frame(rotation: DisplayRotation) -> CameraFrame {
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        let projection = Mat4::perspective_rh_gl(60f32.to_radians(), 1.0, 0.1, 100.0);
        CameraFrame::from_mat4(view, projection, rotation)
    }

    #[test]
    fn test_project_center() {
        let frame = frame(DisplayRotation::Deg90);
        let ndc = project_to_ndc(&frame, &[0.0, 0.0, -2.0]).unwrap();
        assert_relative_eq!(ndc.x, 0.0);
        assert_relative_eq!(ndc.y, 0.0);
        assert_eq!(ndc_to_uv(ndc), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_project_offscreen() {
        let frame = frame(DisplayRotation::Deg90);
        // far to the side of a 60 degree frustum
        assert!(project_to_ndc(&frame, &[10.0, 0.0, -1.0]).is_none());
        assert!(project_to_ndc_unclipped(&frame, &[10.0, 0.0, -1.0]).is_some());
        assert_eq!(
            lookup_index(&frame, &[0.0, 10.0, -1.0], ImageSize::new(4, 4), 16),
            ScreenLookup::OffScreen
        );
    }

    #[test]
    fn test_lookup_index() {
        let frame = frame(DisplayRotation::Deg90);
        let lookup = lookup_index(&frame, &[0.0, 0.0, -2.0], ImageSize::new(4, 4), 16);
        // (0.5, 0.5) -> (2, 2) with rotation 90 inverting v only
        assert_eq!(lookup, ScreenLookup::Visible { index: 10, x: 2, y: 2 });
        assert_eq!(lookup.index(), Some(10));
    }

    #[test]
    fn test_uv_to_index_bounds() {
        let size = ImageSize::new(4, 3);
        assert_eq!(
            uv_to_index(Vec2::new(0.0, 0.0), size, 12),
            ScreenLookup::Visible { index: 0, x: 0, y: 0 }
        );
        // v = 1 lands one row past the end
        assert_eq!(
            uv_to_index(Vec2::new(0.0, 1.0), size, 12),
            ScreenLookup::OutOfBounds
        );
        assert_eq!(
            uv_to_index(Vec2::new(0.5, 0.5), size, 12).index(),
            Some(2 * 4 + 2)
        );
    }

    #[test]
    fn test_ndc_to_surface() {
        let surface = ImageSize::new(640, 480);
        let px = ndc_to_surface(Vec2::new(-1.0, 1.0), surface);
        assert_eq!(px, Vec2::new(0.0, 0.0));
        let px = ndc_to_surface(Vec2::new(0.0, 0.0), surface);
        assert_eq!(px, Vec2::new(320.0, 240.0));
        let px = ndc_to_surface(Vec2::new(1.0, -1.0), surface);
        assert_eq!(px, Vec2::new(640.0, 480.0));
    }

    #[test]
    fn test_lookup_surface_index() {
        let surface = ImageSize::new(200, 100);
        let size = ImageSize::new(10, 10);
        // center of the surface maps to the center of the buffer for every rotation
        for rotation in [
            DisplayRotation::Deg0,
            DisplayRotation::Deg90,
            DisplayRotation::Deg180,
            DisplayRotation::Deg270,
        ] {
            let lookup = lookup_surface_index(rotation, surface, Vec2::new(100.0, 50.0), size, 100);
            assert_eq!(lookup, ScreenLookup::Visible { index: 55, x: 5, y: 5 });
        }
        // top-left corner at rotation 270 flips to the far corner
        let lookup = lookup_surface_index(
            DisplayRotation::Deg270,
            surface,
            Vec2::new(20.0, 10.0),
            size,
            100,
        );
        assert_eq!(lookup, ScreenLookup::Visible { index: 99, x: 9, y: 9 });
        assert_eq!(
            lookup_surface_index(DisplayRotation::Deg90, surface, Vec2::new(-1.0, 0.0), size, 100),
            ScreenLookup::OffScreen
        );
    }
}
