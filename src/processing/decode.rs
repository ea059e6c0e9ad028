//! Turning a layer's [`SourceRef`] into pixels.
//!
//! Decoding is synchronous CPU work; the compositor runs each call on tokio's blocking
//! pool so many layers decode at once.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use image::RgbaImage;

use crate::core::SourceRef;
use crate::utils::DecodeError;

/// Decodes one layer source into RGBA pixels.
pub trait ImageDecoder: Send + Sync + 'static {
    fn decode(&self, source: &SourceRef) -> Result<RgbaImage, DecodeError>;
}

/// Reads files and `data:` URIs with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceDecoder;

impl ImageDecoder for SourceDecoder {
    fn decode(&self, source: &SourceRef) -> Result<RgbaImage, DecodeError> {
        let bytes = match source {
            SourceRef::Path(path) => std::fs::read(path)
                .map_err(|e| DecodeError::Read(format!("{path}: {e}")))?,
            SourceRef::DataUri(uri) => decode_data_uri(uri)?,
            SourceRef::Placeholder { original } => {
                return Err(DecodeError::Unresolved(original.clone()));
            }
        };

        image::load_from_memory(&bytes)
            .map(|img| img.into_rgba8())
            .map_err(|e| DecodeError::Image(e.to_string()))
    }
}

/// Extracts the payload of a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, DecodeError> {
    let (header, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| DecodeError::Read("malformed data URI".to_string()))?;

    if !header.ends_with(";base64") {
        return Err(DecodeError::Read("data URI is not base64 encoded".to_string()));
    }

    BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| DecodeError::Read(format!("invalid base64 payload: {e}")))
}
