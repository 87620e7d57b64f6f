//! The pdfium rendering backend.
//!
//! ## Why a process-wide singleton?
//!
//! Binding to the pdfium shared library initialises global state inside the
//! C++ library (`FPDF_InitLibrary`). Doing that once and caching the handle
//! behind a `OnceCell` makes repeated [`ensure_backend_ready`] calls cheap
//! no-ops and keeps concurrent conversions from racing the initialisation.
//! The `thread_safe` feature of `pdfium-render` serialises FFI calls
//! internally, so the cached handle is safe to share across threads.
//!
//! ## Why `spawn_blocking` at the call site, not here?
//!
//! pdfium documents hold raw pointers and must stay on the thread that
//! created them. The orchestrator runs decode → render → encode inside one
//! `tokio::task::spawn_blocking` closure; everything in this module is
//! plain synchronous code.

use super::{PageSource, RasterBackend};
use crate::error::ThumbnailError;
use crate::geometry::{PageSize, Viewport};
use image::RgbaImage;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use tracing::{debug, info};

static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

/// Lazily bind the pdfium shared library and return the shared handle.
///
/// Search order: `PDFIUM_LIB_PATH`, the current directory, the system
/// library path. Idempotent — the first successful bind is cached for the
/// process lifetime and later calls reuse it. A bind failure is reported as
/// [`ThumbnailError::BackendUnavailable`] and never retried automatically
/// (a missing library will not appear between two calls in the same
/// process).
pub fn ensure_backend_ready() -> Result<&'static Pdfium, ThumbnailError> {
    PDFIUM.get_or_try_init(|| {
        let bindings = bind_library()?;
        info!("pdfium backend bound and initialised");
        Ok(Pdfium::new(bindings))
    })
}

fn bind_library() -> Result<Box<dyn PdfiumLibraryBindings>, ThumbnailError> {
    if let Ok(path) = std::env::var("PDFIUM_LIB_PATH") {
        if !path.is_empty() {
            return Pdfium::bind_to_library(&path).map_err(|e| {
                ThumbnailError::BackendUnavailable {
                    detail: format!("PDFIUM_LIB_PATH={path}: {e:?}"),
                }
            });
        }
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| ThumbnailError::BackendUnavailable {
            detail: format!("{e:?}"),
        })
}

/// The production [`RasterBackend`] backed by the shared pdfium handle.
pub struct PdfiumBackend {
    pdfium: &'static Pdfium,
}

impl PdfiumBackend {
    /// Acquire the backend, binding the library on first use.
    pub fn acquire() -> Result<Self, ThumbnailError> {
        Ok(Self {
            pdfium: ensure_backend_ready()?,
        })
    }
}

impl RasterBackend for PdfiumBackend {
    type Document = PdfiumDocument;

    fn decode(
        &self,
        bytes: &[u8],
        password: Option<&str>,
    ) -> Result<PdfiumDocument, ThumbnailError> {
        let doc = self
            .pdfium
            .load_pdf_from_byte_vec(bytes.to_vec(), password)
            .map_err(classify_load_error)?;

        debug!("Decoded document: {} pages", doc.pages().len());
        Ok(PdfiumDocument { doc: Some(doc) })
    }
}

/// Map a pdfium load failure onto the pipeline taxonomy.
///
/// pdfium reports password problems and structural corruption through the
/// same error type; the password case is distinguished by its payload.
fn classify_load_error(err: PdfiumError) -> ThumbnailError {
    let detail = format!("{err:?}");
    if detail.contains("Password") || detail.contains("password") {
        ThumbnailError::EncryptedDocument
    } else {
        ThumbnailError::MalformedDocument { detail }
    }
}

/// A decoded pdfium document.
///
/// `doc` is `Option` so that [`PageSource::close`] can drop the underlying
/// `PdfDocument` (which closes the FPDF handle) exactly once while `self`
/// stays alive.
pub struct PdfiumDocument {
    doc: Option<PdfDocument<'static>>,
}

impl PdfiumDocument {
    fn doc(&self) -> Result<&PdfDocument<'static>, ThumbnailError> {
        self.doc
            .as_ref()
            .ok_or_else(|| ThumbnailError::Unknown("document handle already released".into()))
    }

    fn page(&self, index: usize) -> Result<PdfPage<'_>, ThumbnailError> {
        let doc = self.doc()?;
        let pages = doc.pages();
        let total = pages.len() as usize;
        pages
            .get(index as u16)
            .map_err(|_| ThumbnailError::PageNotFound {
                page: index + 1,
                total,
            })
    }
}

impl PageSource for PdfiumDocument {
    fn page_count(&self) -> usize {
        match self.doc.as_ref() {
            Some(doc) => doc.pages().len() as usize,
            None => 0,
        }
    }

    fn page_size(&self, index: usize) -> Result<PageSize, ThumbnailError> {
        let page = self.page(index)?;
        Ok(PageSize::new(page.width().value, page.height().value))
    }

    fn render(&self, index: usize, viewport: &Viewport) -> Result<RgbaImage, ThumbnailError> {
        let page = self.page(index)?;

        // Rendering straight at the device dimensions applies the density
        // transform in one pass — the page is never painted small and
        // stretched afterwards.
        let render_config = PdfRenderConfig::new()
            .set_target_width(viewport.device_width as i32)
            .set_target_height(viewport.device_height as i32);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| ThumbnailError::RenderFailure {
                    page: index + 1,
                    detail: format!("{e:?}"),
                })?;

        let image = bitmap.as_image().into_rgba8();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }

    fn close(&mut self) {
        if self.doc.take().is_some() {
            debug!("Released decoded document");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Binding needs a pdfium shared library, which CI machines may not
    // carry. Gated like the e2e suite.
    #[test]
    fn ensure_backend_ready_is_idempotent() {
        if std::env::var("PDFTHUMB_E2E").is_err() {
            println!("SKIP — set PDFTHUMB_E2E=1 (requires a pdfium shared library)");
            return;
        }

        let first = ensure_backend_ready().expect("first bind should succeed");
        let second = ensure_backend_ready().expect("second call should reuse the binding");
        assert!(
            std::ptr::eq(first, second),
            "repeated calls must return the same cached handle"
        );
    }

    #[test]
    fn password_errors_classify_as_encrypted() {
        let e = classify_load_error(PdfiumError::PdfiumLibraryInternalError(
            PdfiumInternalError::PasswordError,
        ));
        assert!(matches!(e, ThumbnailError::EncryptedDocument));
    }

    #[test]
    fn other_load_errors_classify_as_malformed() {
        let e = classify_load_error(PdfiumError::PdfiumLibraryInternalError(
            PdfiumInternalError::FormatError,
        ));
        assert!(matches!(e, ThumbnailError::MalformedDocument { .. }));
    }
}
