//! Encodes a composited canvas into export bytes.

use std::io::Cursor;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};

use crate::utils::{EditorError, EditorResult, ExportFormat};

type Result<T> = EditorResult<T>;

/// Saves `image` as PNG, keeping the alpha channel.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| EditorError::encode(format!("PNG encode failed: {e}")))?;
    Ok(bytes)
}

/// Saves `image` as JPEG at `quality` (1-100).
///
/// JPEG has no alpha; the canvas is expected to be pre-filled white, any remaining
/// alpha is dropped.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| EditorError::encode(format!("JPEG encode failed: {e}")))?;
    Ok(bytes)
}

/// Dispatches to the correct encoder for `format`.
pub fn encode(image: &RgbaImage, format: ExportFormat, quality: u8) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Png => encode_png(image),
        ExportFormat::Jpg => encode_jpeg(image, quality),
    }
}

/// Runs [`encode`] on the blocking pool so an async caller's worker thread stays free.
pub async fn encode_blocking(image: RgbaImage, format: ExportFormat, quality: u8) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || encode(&image, format, quality))
        .await
        .map_err(|e| EditorError::encode(format!("Encode task failed: {e}")))?
}

/// Wraps encoded bytes as a `data:` URI, for hosts that download through a browser.
pub fn to_data_uri(bytes: &[u8], format: ExportFormat) -> String {
    format!("data:{};base64,{}", format.mime_type(), BASE64_STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn png_keeps_transparency() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let bytes = encode(&img, ExportFormat::Png, 100).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let back = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!(back.get_pixel(1, 1)[3], 0);
    }

    #[test]
    fn jpeg_is_opaque_and_quality_matters() {
        let mut img = RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 255]));
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgba([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 4) as u8, 255]);
        }

        let high = encode(&img, ExportFormat::Jpg, 95).unwrap();
        let low = encode(&img, ExportFormat::Jpg, 10).unwrap();
        assert_eq!(&high[..2], &[0xFF, 0xD8]);
        assert!(low.len() < high.len());
    }

    #[tokio::test]
    async fn blocking_encode_matches_inline_encode() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        let inline = encode(&img, ExportFormat::Jpg, 70).unwrap();
        let pooled = encode_blocking(img, ExportFormat::Jpg, 70).await.unwrap();
        assert_eq!(pooled, inline);
    }

    #[test]
    fn data_uri_has_mime_prefix() {
        assert_eq!(to_data_uri(b"abc", ExportFormat::Jpg), "data:image/jpeg;base64,YWJj");
    }
}
