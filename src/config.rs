//! Configuration for thumbnail conversion.
//!
//! All behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. The density multiplier is deliberately a
//! config field rather than something sniffed from the environment: a
//! non-interactive process has no inherent pixel density, so the caller who
//! knows the display target supplies it.

use crate::error::ThumbnailError;
use serde::{Deserialize, Serialize};

/// Configuration for a PDF-to-thumbnail conversion.
///
/// # Example
/// ```rust
/// use pdfthumb::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .density(2.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Output-density multiplier (physical-to-logical pixel ratio of the
    /// display target). Default: 1.0.
    ///
    /// The page is rendered directly at `intrinsic size × density` device
    /// pixels rather than rendered small and stretched, so thumbnails stay
    /// sharp on high-density displays. Values outside (0, 16] are clamped
    /// by the builder; a degenerate value at render time falls back to 1.0
    /// — density is a quality concern, never a failure.
    pub density: f32,

    /// Page to render, 1-indexed. Default: 1.
    ///
    /// Thumbnail generation only ever wants the first page; the knob exists
    /// so downstream callers can preview a different page without a second
    /// API.
    pub page: usize,

    /// User password for encrypted documents. Default: none.
    ///
    /// Without a password, encrypted input surfaces
    /// [`ThumbnailError::EncryptedDocument`] — the pipeline never prompts.
    pub password: Option<String>,

    /// Declare the host environment incapable of hosting a pixel surface.
    /// Default: false.
    ///
    /// When true, [`crate::convert::convert`] short-circuits to a failure
    /// before touching the rendering backend. Server processes that share
    /// code with a client set this to keep rendering strictly client-side.
    pub headless: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            page: 1,
            password: None,
            headless: false,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn density(mut self, density: f32) -> Self {
        self.config.density = if density.is_finite() {
            density.clamp(0.1, 16.0)
        } else {
            1.0
        };
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.config.page = page.max(1);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn headless(mut self, v: bool) -> Self {
        self.config.headless = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ThumbnailError> {
        let c = &self.config;
        if c.page == 0 {
            return Err(ThumbnailError::InvalidConfig(
                "Page numbers are 1-indexed; page must be ≥ 1".into(),
            ));
        }
        if !c.density.is_finite() || c.density <= 0.0 {
            return Err(ThumbnailError::InvalidConfig(format!(
                "Density must be a positive finite number, got {}",
                c.density
            )));
        }
        Ok(self.config)
    }
}
