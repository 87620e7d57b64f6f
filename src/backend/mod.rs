//! Rendering backends.
//!
//! The orchestrator never talks to pdfium directly; it goes through the
//! [`RasterBackend`] / [`PageSource`] seam. Keeping the backend behind a
//! trait pair makes the resource-lifecycle guarantees testable with a mock
//! document and lets the rendering backend be swapped without touching the
//! pipeline stages.
//!
//! [`pdfium`] hosts the production backend plus [`ensure_backend_ready`],
//! the lazy process-wide loader.

use crate::error::ThumbnailError;
use crate::geometry::{PageSize, Viewport};
use image::RgbaImage;

pub mod pdfium;

pub use pdfium::{ensure_backend_ready, PdfiumBackend};

/// A decoding backend capable of parsing PDF bytes into a page source.
pub trait RasterBackend {
    type Document: PageSource;

    /// Parse raw bytes into a navigable document.
    ///
    /// Fails with [`ThumbnailError::MalformedDocument`] for corrupt or
    /// non-PDF input and [`ThumbnailError::EncryptedDocument`] when the
    /// document needs a password that was not supplied.
    fn decode(
        &self,
        bytes: &[u8],
        password: Option<&str>,
    ) -> Result<Self::Document, ThumbnailError>;
}

/// A decoded document: page count, per-page geometry, and rasterisation.
///
/// Implementations hold backend-side memory that must be freed exactly once
/// via [`PageSource::close`]. Callers never invoke `close` directly — they
/// wrap the source in [`crate::document::DecodedDocument`], which owns the
/// release discipline.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Intrinsic size of a page in document units (points), 0-indexed.
    fn page_size(&self, index: usize) -> Result<PageSize, ThumbnailError>;

    /// Rasterise a page at the viewport's device dimensions.
    ///
    /// The returned image must be exactly
    /// `viewport.device_width × viewport.device_height` pixels.
    fn render(&self, index: usize, viewport: &Viewport) -> Result<RgbaImage, ThumbnailError>;

    /// Free backend-side memory. Invoked exactly once per decoded document
    /// by [`crate::document::DecodedDocument`].
    fn close(&mut self);
}
