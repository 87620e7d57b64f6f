//! Scoped ownership of a decoded document handle.
//!
//! Backend documents hold memory on the decoder side that must be freed
//! exactly once — releasing twice or using a handle after release is
//! undefined behaviour in the underlying library. [`DecodedDocument`] owns
//! that discipline: the orchestrator calls [`DecodedDocument::release`] in
//! its cleanup phase on every exit path, and `Drop` backstops the panic
//! path. The inner `Option` makes the second close structurally impossible.

use crate::backend::PageSource;
use crate::error::ThumbnailError;
use crate::geometry::{PageSize, Viewport};
use image::RgbaImage;

/// An exclusively owned, decoded document. Lives for one conversion call.
pub struct DecodedDocument<D: PageSource> {
    inner: Option<D>,
}

impl<D: PageSource> DecodedDocument<D> {
    pub fn new(source: D) -> Self {
        Self {
            inner: Some(source),
        }
    }

    fn source(&self) -> Result<&D, ThumbnailError> {
        self.inner
            .as_ref()
            .ok_or_else(|| ThumbnailError::Unknown("document used after release".into()))
    }

    /// Number of pages, or an error if the handle was already released.
    pub fn page_count(&self) -> Result<usize, ThumbnailError> {
        Ok(self.source()?.page_count())
    }

    /// Intrinsic page size in points, 0-indexed.
    pub fn page_size(&self, index: usize) -> Result<PageSize, ThumbnailError> {
        self.source()?.page_size(index)
    }

    /// Rasterise a page at the viewport's device dimensions.
    pub fn render_page(
        &self,
        index: usize,
        viewport: &Viewport,
    ) -> Result<RgbaImage, ThumbnailError> {
        self.source()?.render(index, viewport)
    }

    /// Release the backend handle. Consumes the document; the backend
    /// `close` runs at most once even though `Drop` also fires on the
    /// moved-out value.
    pub fn release(mut self) {
        self.close_inner();
    }

    fn close_inner(&mut self) {
        if let Some(mut source) = self.inner.take() {
            source.close();
        }
    }
}

impl<D: PageSource> Drop for DecodedDocument<D> {
    fn drop(&mut self) {
        self.close_inner();
    }
}
