//! PNG serialisation and output naming.
//!
//! PNG is the only output format, by design: thumbnails exist so people can
//! read the page at a glance, and lossless compression keeps rendered text
//! crisp where JPEG artefacts would smear it.

use crate::error::ThumbnailError;
use crate::surface::PixelSurface;
use image::ImageFormat;
use serde::Serialize;
use std::io::Cursor;
use tracing::debug;

/// MIME type of every image this pipeline produces.
pub const PNG_MIME: &str = "image/png";

/// A compressed image blob plus its MIME tag. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// An [`EncodedImage`] wrapped with the output filename, ready to hand to a
/// blob store or display surface.
#[derive(Debug, Clone, Serialize)]
pub struct NamedFile {
    pub name: String,
    pub image: EncodedImage,
}

impl NamedFile {
    pub fn bytes(&self) -> &[u8] {
        &self.image.bytes
    }

    pub fn mime(&self) -> &'static str {
        self.image.mime
    }
}

/// Serialise a painted surface into a named PNG file.
///
/// An empty byte stream from the encoder is a failure, never an empty
/// success — zero-sized or otherwise unencodable surfaces must surface as
/// [`ThumbnailError::EncodingFailure`].
pub fn encode(surface: &PixelSurface, source_name: &str) -> Result<NamedFile, ThumbnailError> {
    let mut buf = Vec::new();
    surface
        .pixels()
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| ThumbnailError::EncodingFailure {
            detail: e.to_string(),
        })?;

    if buf.is_empty() {
        return Err(ThumbnailError::EncodingFailure {
            detail: "encoder produced no data".into(),
        });
    }

    debug!("Encoded PNG → {} bytes", buf.len());

    Ok(NamedFile {
        name: thumbnail_name(source_name),
        image: EncodedImage {
            bytes: buf,
            mime: PNG_MIME,
        },
    })
}

/// Derive the thumbnail filename from the source filename: the substring
/// from the last `.` to the end is replaced by `.png`; a name without a `.`
/// gets `.png` appended.
pub fn thumbnail_name(source: &str) -> String {
    match source.rfind('.') {
        Some(idx) => format!("{}.png", &source[..idx]),
        None => format!("{source}.png"),
    }
}
