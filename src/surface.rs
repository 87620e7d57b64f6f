//! Rasterisation: a decoded page → a density-correct pixel surface.

use crate::backend::PageSource;
use crate::document::DecodedDocument;
use crate::error::ThumbnailError;
use crate::geometry::Viewport;
use image::RgbaImage;
use tracing::debug;

/// A fully painted 2D pixel target, sized to its viewport's device
/// dimensions. Owned by one conversion call; never shared.
#[derive(Debug)]
pub struct PixelSurface {
    pixels: RgbaImage,
    viewport: Viewport,
}

impl PixelSurface {
    /// The rendered pixels, `device_width × device_height`.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// The geometry this surface was allocated for.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Allocation size in device pixels.
    pub fn device_dimensions(&self) -> (u32, u32) {
        (self.viewport.device_width, self.viewport.device_height)
    }

    /// Displayed size in logical pixels, independent of density.
    pub fn logical_dimensions(&self) -> (u32, u32) {
        (self.viewport.logical_width, self.viewport.logical_height)
    }
}

/// Render one page of a decoded document into a [`PixelSurface`].
///
/// The viewport is computed at logical scale 1.0 from the page's intrinsic
/// size; `density` scales only the device allocation. The surface is
/// guaranteed fully painted on success.
pub fn rasterize<D: PageSource>(
    doc: &DecodedDocument<D>,
    page_index: usize,
    density: f32,
) -> Result<PixelSurface, ThumbnailError> {
    let total = doc.page_count()?;
    if page_index >= total {
        return Err(ThumbnailError::PageNotFound {
            page: page_index + 1,
            total,
        });
    }

    let size = doc.page_size(page_index)?;
    let viewport = Viewport::new(size, density);
    if viewport.is_degenerate() {
        return Err(ThumbnailError::SurfaceUnavailable {
            width: viewport.device_width,
            height: viewport.device_height,
        });
    }

    let pixels = doc.render_page(page_index, &viewport)?;
    debug!(
        "Rasterised page {}: {}x{} device px ({}x{} logical)",
        page_index + 1,
        viewport.device_width,
        viewport.device_height,
        viewport.logical_width,
        viewport.logical_height
    );

    Ok(PixelSurface { pixels, viewport })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PageSize;

    struct StubSource {
        pages: Vec<PageSize>,
    }

    impl PageSource for StubSource {
        fn page_count(&self) -> usize {
            self.pages.len()
        }
        fn page_size(&self, index: usize) -> Result<PageSize, ThumbnailError> {
            Ok(self.pages[index])
        }
        fn render(
            &self,
            _index: usize,
            viewport: &Viewport,
        ) -> Result<RgbaImage, ThumbnailError> {
            Ok(RgbaImage::new(viewport.device_width, viewport.device_height))
        }
        fn close(&mut self) {}
    }

    fn doc_with(pages: Vec<PageSize>) -> DecodedDocument<StubSource> {
        DecodedDocument::new(StubSource { pages })
    }

    #[test]
    fn surface_matches_viewport_dimensions() {
        let doc = doc_with(vec![PageSize::new(612.0, 792.0)]);
        let surface = rasterize(&doc, 0, 2.0).unwrap();
        assert_eq!(surface.device_dimensions(), (1224, 1584));
        assert_eq!(surface.logical_dimensions(), (612, 792));
        assert_eq!(surface.pixels().dimensions(), (1224, 1584));
    }

    #[test]
    fn out_of_range_page_is_page_not_found() {
        let doc = doc_with(vec![PageSize::new(612.0, 792.0)]);
        let err = rasterize(&doc, 3, 1.0).unwrap_err();
        assert!(matches!(
            err,
            ThumbnailError::PageNotFound { page: 4, total: 1 }
        ));
    }

    #[test]
    fn zero_sized_page_is_surface_unavailable() {
        let doc = doc_with(vec![PageSize::new(0.0, 792.0)]);
        let err = rasterize(&doc, 0, 1.0).unwrap_err();
        assert!(matches!(err, ThumbnailError::SurfaceUnavailable { .. }));
    }

    #[test]
    fn tiny_page_survives_density_scaling() {
        // 0.6 pt page floors to 0 logical px but renders at density 2.
        let doc = doc_with(vec![PageSize::new(0.6, 0.6)]);
        let surface = rasterize(&doc, 0, 2.0).unwrap();
        assert_eq!(surface.device_dimensions(), (1, 1));
    }
}
