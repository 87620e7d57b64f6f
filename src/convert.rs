//! Top-level conversion entry points.
//!
//! One conversion is a strictly sequential pipeline:
//!
//! ```text
//! guard ─▶ backend ─▶ decode ─▶ rasterize ─▶ encode ─▶ publish ─▶ Converted
//!    └────────┴──────────┴──────────┴───────────┴── any failure ─▶ Failed
//! ```
//!
//! Both terminal states pass through the cleanup phase: the decoded
//! document is released exactly once whenever decode succeeded, no matter
//! which later stage failed. [`convert`] itself never returns `Err` and
//! never panics on malformed input — every failure is folded into
//! [`ConversionResult::Failed`].
//!
//! There is no cancellation or timeout threaded through the stages; a hung
//! backend shows up as a pending future. Callers who need a deadline wrap
//! the call in `tokio::time::timeout`.

use crate::backend::{PageSource, PdfiumBackend, RasterBackend};
use crate::config::ConversionConfig;
use crate::document::DecodedDocument;
use crate::encode::{encode, NamedFile};
use crate::error::ThumbnailError;
use crate::handle::DisplayableReference;
use crate::surface::rasterize;
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// A caller-supplied document: raw bytes plus the filename the output name
/// is derived from. No size or content-type precondition is enforced —
/// validation is implicit in decode failure.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, taking the filename from the path.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self {
            name,
            bytes: std::fs::read(path)?,
        })
    }
}

/// The externally visible outcome of one conversion. Exactly one variant —
/// a success never carries an error and a failure never carries a file or
/// reference.
#[derive(Debug)]
pub enum ConversionResult {
    /// The thumbnail was produced: a live displayable reference (revocation
    /// is the consumer's responsibility) and the named PNG file.
    Converted {
        reference: DisplayableReference,
        file: NamedFile,
    },
    /// The conversion failed; `error`'s `Display` is the human-readable
    /// message surfaced to UI layers.
    Failed { error: ThumbnailError },
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Converted { .. })
    }

    pub fn error(&self) -> Option<&ThumbnailError> {
        match self {
            ConversionResult::Converted { .. } => None,
            ConversionResult::Failed { error } => Some(error),
        }
    }

    /// Unwrap into `(reference, file)` or the error.
    pub fn into_parts(self) -> Result<(DisplayableReference, NamedFile), ThumbnailError> {
        match self {
            ConversionResult::Converted { reference, file } => Ok((reference, file)),
            ConversionResult::Failed { error } => Err(error),
        }
    }
}

/// Convert the configured page of a PDF into a PNG thumbnail.
///
/// This is the primary entry point for the library. It never returns
/// `Err`; inspect the [`ConversionResult`] instead.
pub async fn convert(file: SourceFile, config: &ConversionConfig) -> ConversionResult {
    convert_with(file, config, PdfiumBackend::acquire).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(file: SourceFile, config: &ConversionConfig) -> ConversionResult {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(convert(file, config)),
        Err(e) => ConversionResult::Failed {
            error: ThumbnailError::Unknown(format!("Failed to create tokio runtime: {e}")),
        },
    }
}

/// Orchestration over an arbitrary backend. The backend is constructed
/// inside the blocking task because backend documents are not `Send`.
pub(crate) async fn convert_with<B, F>(
    file: SourceFile,
    config: &ConversionConfig,
    acquire: F,
) -> ConversionResult
where
    B: RasterBackend + 'static,
    F: FnOnce() -> Result<B, ThumbnailError> + Send + 'static,
{
    let start = Instant::now();
    let source_name = file.name.clone();
    info!("Starting thumbnail conversion: {source_name}");

    if config.headless {
        warn!("Conversion attempted in a headless environment; refusing before backend load");
        return ConversionResult::Failed {
            error: ThumbnailError::DisplayUnavailable,
        };
    }

    let cfg = config.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let backend = acquire()?;
        render_document(&backend, &file.bytes, &file.name, &cfg)
    })
    .await
    .map_err(|e| ThumbnailError::Unknown(format!("Render task panicked: {e}")))
    .and_then(|r| r);

    match outcome {
        Ok(named) => {
            let reference = DisplayableReference::publish(named.bytes());
            info!(
                "Converted {source_name} → {} ({} bytes) in {}ms",
                named.name,
                named.bytes().len(),
                start.elapsed().as_millis()
            );
            ConversionResult::Converted {
                reference,
                file: named,
            }
        }
        Err(error) => {
            warn!("Conversion of {source_name} failed: {error}");
            ConversionResult::Failed { error }
        }
    }
}

/// Decode, rasterise, and encode with the release guarantee: once decode
/// succeeds, the document is released exactly once whether the later
/// stages return or fail (and via `Drop` if they panic).
fn render_document<B: RasterBackend>(
    backend: &B,
    bytes: &[u8],
    source_name: &str,
    config: &ConversionConfig,
) -> Result<NamedFile, ThumbnailError> {
    let doc = DecodedDocument::new(backend.decode(bytes, config.password.as_deref())?);
    let outcome = paint_and_encode(&doc, source_name, config);
    doc.release();
    outcome
}

fn paint_and_encode<D: PageSource>(
    doc: &DecodedDocument<D>,
    source_name: &str,
    config: &ConversionConfig,
) -> Result<NamedFile, ThumbnailError> {
    if doc.page_count()? == 0 {
        return Err(ThumbnailError::EmptyDocument);
    }

    let surface = rasterize(doc, config.page.saturating_sub(1), config.density)?;
    encode(&surface, source_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PageSource;
    use crate::geometry::{PageSize, Viewport};
    use image::RgbaImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counters shared between a test and its mock backend.
    #[derive(Clone, Default)]
    struct Probe {
        decodes: Arc<AtomicUsize>,
        releases: Arc<AtomicUsize>,
    }

    #[derive(Clone)]
    struct MockBackend {
        probe: Probe,
        pages: Vec<PageSize>,
        fail_decode: bool,
        fail_render: bool,
    }

    impl MockBackend {
        fn with_pages(probe: &Probe, pages: Vec<PageSize>) -> Self {
            Self {
                probe: probe.clone(),
                pages,
                fail_decode: false,
                fail_render: false,
            }
        }

        fn letter(probe: &Probe) -> Self {
            Self::with_pages(probe, vec![PageSize::new(612.0, 792.0)])
        }
    }

    struct MockDocument {
        probe: Probe,
        pages: Vec<PageSize>,
        fail_render: bool,
    }

    impl RasterBackend for MockBackend {
        type Document = MockDocument;

        fn decode(
            &self,
            _bytes: &[u8],
            _password: Option<&str>,
        ) -> Result<MockDocument, ThumbnailError> {
            self.probe.decodes.fetch_add(1, Ordering::SeqCst);
            if self.fail_decode {
                return Err(ThumbnailError::MalformedDocument {
                    detail: "bad xref".into(),
                });
            }
            Ok(MockDocument {
                probe: self.probe.clone(),
                pages: self.pages.clone(),
                fail_render: self.fail_render,
            })
        }
    }

    impl PageSource for MockDocument {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_size(&self, index: usize) -> Result<PageSize, ThumbnailError> {
            Ok(self.pages[index])
        }

        fn render(
            &self,
            index: usize,
            viewport: &Viewport,
        ) -> Result<RgbaImage, ThumbnailError> {
            if self.fail_render {
                return Err(ThumbnailError::RenderFailure {
                    page: index + 1,
                    detail: "simulated rasterisation failure".into(),
                });
            }
            Ok(RgbaImage::from_pixel(
                viewport.device_width,
                viewport.device_height,
                image::Rgba([255, 255, 255, 255]),
            ))
        }

        fn close(&mut self) {
            self.probe.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn run(backend: MockBackend, file: SourceFile, config: ConversionConfig) -> ConversionResult {
        convert_with(file, &config, move || Ok(backend)).await
    }

    fn pdf_file(name: &str) -> SourceFile {
        SourceFile::new(name, b"%PDF-1.4 irrelevant to the mock".to_vec())
    }

    #[tokio::test]
    async fn success_yields_reference_and_png_file() {
        let probe = Probe::default();
        let result = run(
            MockBackend::letter(&probe),
            pdf_file("resume.pdf"),
            ConversionConfig::default(),
        )
        .await;

        let (reference, file) = result.into_parts().expect("conversion should succeed");
        assert_eq!(file.name, "resume.png");
        assert!(file.name.ends_with(".png"));
        assert!(!reference.url().is_empty());
        assert_eq!(&file.bytes()[..8], b"\x89PNG\r\n\x1a\n");

        // The reference resolves to exactly the encoded bytes.
        let blob = DisplayableReference::resolve(reference.url()).expect("live reference");
        assert_eq!(&blob[..], file.bytes());

        assert_eq!(probe.decodes.load(Ordering::SeqCst), 1);
        assert_eq!(probe.releases.load(Ordering::SeqCst), 1);
        reference.revoke();
    }

    #[tokio::test]
    async fn multi_dot_names_lose_only_the_final_extension() {
        let probe = Probe::default();
        let result = run(
            MockBackend::letter(&probe),
            pdf_file("archive.tar.pdf"),
            ConversionConfig::default(),
        )
        .await;
        let (reference, file) = result.into_parts().unwrap();
        assert_eq!(file.name, "archive.tar.png");
        reference.revoke();
    }

    #[tokio::test]
    async fn decode_failure_releases_nothing() {
        let probe = Probe::default();
        let mut backend = MockBackend::letter(&probe);
        backend.fail_decode = true;

        let result = run(backend, pdf_file("junk.pdf"), ConversionConfig::default()).await;

        assert!(matches!(
            result.error(),
            Some(ThumbnailError::MalformedDocument { .. })
        ));
        assert_eq!(probe.decodes.load(Ordering::SeqCst), 1);
        assert_eq!(probe.releases.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn render_failure_after_decode_still_releases_exactly_once() {
        let probe = Probe::default();
        let mut backend = MockBackend::letter(&probe);
        backend.fail_render = true;

        let result = run(backend, pdf_file("doc.pdf"), ConversionConfig::default()).await;

        assert!(matches!(
            result.error(),
            Some(ThumbnailError::RenderFailure { page: 1, .. })
        ));
        assert_eq!(probe.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_page_document_is_empty_and_released() {
        let probe = Probe::default();
        let backend = MockBackend::with_pages(&probe, vec![]);

        let result = run(backend, pdf_file("empty.pdf"), ConversionConfig::default()).await;

        assert!(matches!(result.error(), Some(ThumbnailError::EmptyDocument)));
        assert_eq!(probe.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn out_of_range_page_is_reported_and_released() {
        let probe = Probe::default();
        let config = ConversionConfig::builder().page(5).build().unwrap();

        let result = run(MockBackend::letter(&probe), pdf_file("doc.pdf"), config).await;

        assert!(matches!(
            result.error(),
            Some(ThumbnailError::PageNotFound { page: 5, total: 1 })
        ));
        assert_eq!(probe.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn headless_guard_short_circuits_before_backend() {
        let probe = Probe::default();
        let backend = MockBackend::letter(&probe);
        let acquired = Arc::new(AtomicUsize::new(0));
        let acquired_inner = Arc::clone(&acquired);

        let config = ConversionConfig::builder().headless(true).build().unwrap();
        let result = convert_with(pdf_file("doc.pdf"), &config, move || {
            acquired_inner.fetch_add(1, Ordering::SeqCst);
            Ok(backend)
        })
        .await;

        assert!(matches!(
            result.error(),
            Some(ThumbnailError::DisplayUnavailable)
        ));
        assert_eq!(result.error().unwrap().to_string(), "client-only operation");
        assert_eq!(acquired.load(Ordering::SeqCst), 0, "backend never loaded");
        assert_eq!(probe.decodes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_unavailable_is_captured_not_raised() {
        let config = ConversionConfig::default();
        let result = convert_with::<MockBackend, _>(pdf_file("doc.pdf"), &config, || {
            Err(ThumbnailError::BackendUnavailable {
                detail: "no shared library".into(),
            })
        })
        .await;

        assert!(matches!(
            result.error(),
            Some(ThumbnailError::BackendUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn density_scales_device_pixels_through_the_whole_pipeline() {
        let probe = Probe::default();
        let config = ConversionConfig::builder().density(2.0).build().unwrap();

        let result = run(MockBackend::letter(&probe), pdf_file("page.pdf"), config).await;
        let (reference, file) = result.into_parts().unwrap();

        let decoded = image::load_from_memory(file.bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1224, 1584));
        reference.revoke();
    }

    #[tokio::test]
    async fn concurrent_conversions_do_not_interfere() {
        let probe_a = Probe::default();
        let probe_b = Probe::default();

        let (a, b) = tokio::join!(
            run(
                MockBackend::letter(&probe_a),
                pdf_file("a.pdf"),
                ConversionConfig::default(),
            ),
            run(
                MockBackend::letter(&probe_b),
                pdf_file("b.pdf"),
                ConversionConfig::default(),
            ),
        );

        let (ref_a, file_a) = a.into_parts().unwrap();
        let (ref_b, file_b) = b.into_parts().unwrap();

        assert_eq!(file_a.name, "a.png");
        assert_eq!(file_b.name, "b.png");
        assert_ne!(ref_a.url(), ref_b.url());

        // Each reference resolves independently of the other's lifecycle.
        let a_url = ref_a.url().to_string();
        ref_a.revoke();
        assert!(DisplayableReference::resolve(&a_url).is_none());
        assert!(DisplayableReference::resolve(ref_b.url()).is_some());
        ref_b.revoke();

        assert_eq!(probe_a.releases.load(Ordering::SeqCst), 1);
        assert_eq!(probe_b.releases.load(Ordering::SeqCst), 1);
    }
}
