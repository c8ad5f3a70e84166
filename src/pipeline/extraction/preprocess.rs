//! Image preparation before OCR.
//!
//! Decodes any supported image format, converts it to single-channel
//! grayscale and re-encodes it as PNG so the OCR engine always receives
//! the same input shape.

use image::{DynamicImage, GenericImageView, ImageOutputFormat};

use super::ExtractionError;

/// Decode, convert to grayscale, re-encode as PNG.
pub fn prepare_for_ocr(image_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    let img = image::load_from_memory(image_bytes).map_err(|e| ExtractionError::FormatReader {
        format: "image",
        reason: e.to_string(),
    })?;

    let (width, height) = img.dimensions();
    let gray = to_grayscale(img);

    let png = encode_png(&gray)?;
    tracing::debug!(
        width,
        height,
        input_size = image_bytes.len(),
        png_size = png.len(),
        "Image prepared for OCR"
    );
    Ok(png)
}

fn to_grayscale(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_) => img,
        other => DynamicImage::ImageLuma8(other.to_luma8()),
    }
}

/// Encode an image as PNG bytes.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ExtractionError> {
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::FormatReader {
            format: "image",
            reason: format!("PNG encoding failed: {e}"),
        })?;
    Ok(buf.into_inner())
}
