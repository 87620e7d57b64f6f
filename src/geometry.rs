//! Page and viewport geometry.
//!
//! PDF pages describe their size in document units (points, 1/72 inch).
//! A [`Viewport`] maps that intrinsic size onto two pixel rectangles:
//!
//! * **device** dimensions — what the pixel surface is actually allocated
//!   at: `floor(points × density)`. Rendering happens here, so the page is
//!   drawn once at full resolution instead of drawn small and stretched
//!   (which blurs text on high-density displays).
//! * **logical** dimensions — what the thumbnail displays at:
//!   `floor(points)`, independent of density. The same document always
//!   occupies the same apparent size no matter the screen.

use serde::{Deserialize, Serialize};

/// Intrinsic page size in document units (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The device-pixel rectangle a page is rendered into, derived from the
/// page's intrinsic size at logical scale 1.0 and an output-density
/// multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Surface allocation width in device pixels.
    pub device_width: u32,
    /// Surface allocation height in device pixels.
    pub device_height: u32,
    /// Displayed (CSS) width in logical pixels.
    pub logical_width: u32,
    /// Displayed (CSS) height in logical pixels.
    pub logical_height: u32,
}

impl Viewport {
    /// Compute the viewport for a page at the given output-density
    /// multiplier.
    ///
    /// A non-finite or non-positive density falls back to 1.0 rather than
    /// failing: density is a rendering-quality concern, not a correctness
    /// one.
    pub fn new(size: PageSize, density: f32) -> Self {
        let density = if density.is_finite() && density > 0.0 {
            density
        } else {
            1.0
        };
        Self {
            device_width: (size.width * density).floor() as u32,
            device_height: (size.height * density).floor() as u32,
            logical_width: size.width.floor() as u32,
            logical_height: size.height.floor() as u32,
        }
    }

    /// The 6-term affine transform `[dx, 0, 0, dy, 0, 0]` that maps
    /// document-space drawing onto the device-pixel surface. Backends that
    /// render through a drawing context apply this before painting; backends
    /// that rasterise straight to a target size achieve the same thing by
    /// rendering at [`Viewport::device_width`] × [`Viewport::device_height`].
    pub fn density_transform(&self) -> [f32; 6] {
        let dx = if self.logical_width == 0 {
            1.0
        } else {
            self.device_width as f32 / self.logical_width as f32
        };
        let dy = if self.logical_height == 0 {
            1.0
        } else {
            self.device_height as f32 / self.logical_height as f32
        };
        [dx, 0.0, 0.0, dy, 0.0, 0.0]
    }

    /// True when the surface would have no pixels to draw into.
    pub fn is_degenerate(&self) -> bool {
        self.device_width == 0 || self.device_height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_doubles_device_but_not_logical() {
        // US Letter at density 2.
        let vp = Viewport::new(PageSize::new(612.0, 792.0), 2.0);
        assert_eq!((vp.device_width, vp.device_height), (1224, 1584));
        assert_eq!((vp.logical_width, vp.logical_height), (612, 792));
    }

    #[test]
    fn fractional_dimensions_floor() {
        let vp = Viewport::new(PageSize::new(612.5, 791.9), 1.5);
        assert_eq!(vp.device_width, (612.5f32 * 1.5).floor() as u32); // 918
        assert_eq!(vp.device_height, (791.9f32 * 1.5).floor() as u32); // 1187
        assert_eq!((vp.logical_width, vp.logical_height), (612, 791));
    }

    #[test]
    fn bad_density_falls_back_to_one() {
        for d in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            let vp = Viewport::new(PageSize::new(100.0, 200.0), d);
            assert_eq!((vp.device_width, vp.device_height), (100, 200), "density {d}");
        }
    }

    #[test]
    fn transform_matches_density() {
        let vp = Viewport::new(PageSize::new(612.0, 792.0), 2.0);
        assert_eq!(vp.density_transform(), [2.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_page_is_degenerate() {
        assert!(Viewport::new(PageSize::new(0.0, 792.0), 1.0).is_degenerate());
        assert!(!Viewport::new(PageSize::new(1.0, 1.0), 1.0).is_degenerate());
    }
}
