//! Image sizes, formats, CDN URL construction, and the byte passthrough.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::Deserialize;

use super::upstream::{EmoteSource, UpstreamError};

/// Rendered size offered by the upstream CDN.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "1x")]
    X1,
    #[serde(rename = "2x")]
    X2,
    #[default]
    #[serde(rename = "3x")]
    X3,
    #[serde(rename = "4x")]
    X4,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X1 => "1x",
            Self::X2 => "2x",
            Self::X3 => "3x",
            Self::X4 => "4x",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container format offered by the upstream CDN.
///
/// Deserialization doubles as validation: a request asking for any other
/// format is rejected before a fetch is attempted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Webp,
    Avif,
    Gif,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Gif => "gif",
        }
    }

    /// Content type served for this format.
    ///
    /// Fixed mapping; the upstream response header is not consulted.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Webp => "image/webp",
            Self::Avif => "image/avif",
            Self::Gif => "image/gif",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the CDN image URL: `{cdn_base}/{id}/{size}.{format}`.
pub fn image_url(cdn_base: &str, emote_id: &str, size: ImageSize, format: ImageFormat) -> String {
    format!("{}/{}/{}.{}", cdn_base, emote_id, size, format)
}

/// Thin passthrough from an emote id to raw image bytes.
///
/// Composes the URL template with a single upstream fetch. No retry and no
/// byte caching in this layer; the HTTP response's cache headers carry that
/// concern.
pub struct ImageResolver {
    source: Arc<dyn EmoteSource>,
}

impl ImageResolver {
    pub fn new(source: Arc<dyn EmoteSource>) -> Self {
        Self { source }
    }

    /// Fetch image bytes for an emote id, paired with the content type the
    /// requested format implies. Upstream failures propagate unchanged.
    pub async fn resolve(
        &self,
        emote_id: &str,
        size: ImageSize,
        format: ImageFormat,
    ) -> Result<(Bytes, &'static str), UpstreamError> {
        let bytes = self.source.fetch_image(emote_id, size, format).await?;
        Ok((bytes, format.content_type()))
    }
}
