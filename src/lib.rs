//! # pdfthumb
//!
//! Render the first page of a PDF into a PNG thumbnail.
//!
//! ## Why this crate?
//!
//! Document pickers, dashboards, and review tools all want the same thing
//! from a PDF: one faithful bitmap of the first page, sharp on high-density
//! displays, produced without ever crashing on hostile input. This crate is
//! that pipeline and nothing else — the surrounding application keeps
//! ownership of storage, auth, and UI.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Backend   bind pdfium once per process (lazy singleton)
//!  ├─ 2. Decode    bytes → document handle (released exactly once)
//!  ├─ 3. Rasterize page → pixel surface at density-correct resolution
//!  ├─ 4. Encode    surface → lossless PNG + derived `.png` filename
//!  └─ 5. Publish   PNG → blob registry + displayable reference URL
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfthumb::{convert, ConversionConfig, ConversionResult, SourceFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let file = SourceFile::from_path("resume.pdf")?;
//!     let config = ConversionConfig::builder().density(2.0).build()?;
//!
//!     match convert(file, &config).await {
//!         ConversionResult::Converted { reference, file } => {
//!             println!("{} → {} ({} bytes)", reference.url(), file.name, file.bytes().len());
//!             reference.revoke(); // the consumer owns revocation
//!         }
//!         ConversionResult::Failed { error } => eprintln!("conversion failed: {error}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfthumb` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdfthumb = { version = "0.1", default-features = false }
//! ```
//!
//! ## Resource guarantees
//!
//! * The decoded document handle is released exactly once per successful
//!   decode, on every exit path including errors and panics.
//! * [`convert`] never returns `Err` and never panics on malformed input;
//!   every failure is a [`ConversionResult::Failed`] with a displayable
//!   message.
//! * A [`DisplayableReference`] is returned live; revoking it is the
//!   consumer's responsibility and can happen at most once (it consumes
//!   the reference).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod convert;
pub mod document;
pub mod encode;
pub mod error;
pub mod geometry;
pub mod handle;
pub mod store;
pub mod surface;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{ensure_backend_ready, PageSource, PdfiumBackend, RasterBackend};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_sync, ConversionResult, SourceFile};
pub use document::DecodedDocument;
pub use encode::{encode, thumbnail_name, EncodedImage, NamedFile, PNG_MIME};
pub use error::ThumbnailError;
pub use geometry::{PageSize, Viewport};
pub use handle::DisplayableReference;
pub use store::{BlobStore, KeyValueStore, KvEntry, MemoryBlobStore, MemoryKvStore};
pub use surface::{rasterize, PixelSurface};
