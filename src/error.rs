//! Error types for the pdfthumb library.
//!
//! Every failure mode of the conversion pipeline is a variant of
//! [`ThumbnailError`]. None of them abort the process: the top-level
//! [`crate::convert::convert`] entry point captures every variant into the
//! failure arm of [`crate::convert::ConversionResult`], so callers see a
//! reportable message rather than a panic or an unhandled fault.
//!
//! All errors are terminal for the current conversion — nothing is retried
//! automatically. Retry policy, if any, belongs to the caller.

use thiserror::Error;

/// All errors produced by the thumbnail pipeline.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    // ── Backend errors ────────────────────────────────────────────────────
    /// No pdfium shared library could be located and bound.
    #[error(
        "Rendering backend unavailable: {detail}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, or place the library next to the executable."
    )]
    BackendUnavailable { detail: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// The byte stream is not parseable PDF structure.
    #[error("Document is corrupt or not a PDF: {detail}")]
    MalformedDocument { detail: String },

    /// The document requires a password that was not supplied (or was wrong).
    /// Passwords are never prompted for; supply one via
    /// [`crate::config::ConversionConfig`].
    #[error("Document is encrypted and requires a password")]
    EncryptedDocument,

    /// The document decoded successfully but contains no pages.
    #[error("Document contains no pages")]
    EmptyDocument,

    /// The requested page index exceeds the page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageNotFound { page: usize, total: usize },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// A pixel surface of the required device dimensions could not be
    /// allocated (e.g. a degenerate zero-sized viewport).
    #[error("Cannot allocate a {width}x{height} pixel surface")]
    SurfaceUnavailable { width: u32, height: u32 },

    /// The backend reported a rasterisation error for the page.
    #[error("Rendering failed for page {page}: {detail}")]
    RenderFailure { page: usize, detail: String },

    /// PNG serialisation produced an error or an empty byte stream.
    #[error("PNG encoding failed: {detail}")]
    EncodingFailure { detail: String },

    // ── Environment errors ────────────────────────────────────────────────
    /// Conversion was invoked in an environment without display-surface
    /// capability (the `headless` guard).
    #[error("client-only operation")]
    DisplayUnavailable,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unclassified platform failure (e.g. a panicked worker task).
    #[error("Unknown conversion error: {0}")]
    Unknown(String),
}

impl ThumbnailError {
    /// True when the failure happened before any document was decoded,
    /// i.e. there was never a handle to release.
    pub fn is_pre_decode(&self) -> bool {
        matches!(
            self,
            ThumbnailError::BackendUnavailable { .. }
                | ThumbnailError::MalformedDocument { .. }
                | ThumbnailError::EncryptedDocument
                | ThumbnailError::DisplayUnavailable
                | ThumbnailError::InvalidConfig(_)
        )
    }
}
