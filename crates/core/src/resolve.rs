//! Image resolution.
//!
//! Images are embedded by value, so every image reference has to be turned
//! into its bytes before layout. How that happens is behind the
//! [`ImageResolver`] trait; the network relay lives in its own crate.

use crate::error::{Error, Result};
use crate::types::ResolvedImage;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Turns an image reference into an embeddable payload.
#[async_trait]
pub trait ImageResolver: Send + Sync {
    /// Resolve `source` into image bytes.
    ///
    /// # Errors
    ///
    /// [`Error::ImageFetch`] if the payload could not be fetched and
    /// [`Error::ImageData`] if the fetch succeeded without a usable payload.
    async fn resolve(&self, source: &str) -> Result<ResolvedImage>;
}

impl ResolvedImage {
    /// Decode a `data:<media type>;base64,<payload>` URI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageData`] if `uri` is not a base64 data URI or the
    /// payload does not decode to any bytes.
    pub fn from_data_uri(source: &str, uri: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::ImageData {
            url: source.to_string(),
            reason: reason.to_string(),
        };

        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| invalid("payload is not a data URI"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("data URI has no payload"))?;

        let mut params = header.split(';');
        let media_type = params.next().unwrap_or_default().trim();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(invalid("data URI is not base64 encoded"));
        }

        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let data = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| invalid(&format!("invalid base64 payload: {}", e)))?;
        if data.is_empty() {
            return Err(invalid("image payload is empty"));
        }

        let media_type = if media_type.is_empty() {
            "image/png".to_string()
        } else {
            media_type.to_ascii_lowercase()
        };

        Ok(Self {
            source: source.to_string(),
            media_type,
            data,
        })
    }

    /// Encode this image back into a base64 data URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.data))
    }
}

/// True if `source` is an inline `data:` URI.
pub fn is_data_uri(source: &str) -> bool {
    source
        .trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Resolver that only accepts inline `data:` URIs and never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineResolver;

impl InlineResolver {
    /// Create a new inline resolver.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageResolver for InlineResolver {
    async fn resolve(&self, source: &str) -> Result<ResolvedImage> {
        if !is_data_uri(source) {
            return Err(Error::ImageFetch {
                url: source.to_string(),
                reason: "only inline data: images can be resolved offline".to_string(),
            });
        }
        ResolvedImage::from_data_uri(source, source)
    }
}
