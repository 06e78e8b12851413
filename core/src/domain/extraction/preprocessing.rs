use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::domain::extraction::entities::ExtractionError;

pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
    ImageFormat::Bmp,
];

const CONTRAST_FACTOR: f32 = 1.2;
const CONTRAST_PIVOT: f32 = 128.0;
const SMOOTHING_THRESHOLD: f32 = 30.0;
const SMOOTHING_WEIGHT: f32 = 0.3;

/// Checks size and sniffs the container format.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, ExtractionError> {
    if data.is_empty() {
        return Err(ExtractionError::InvalidImage("image is empty".to_string()));
    }

    if data.len() > MAX_IMAGE_SIZE {
        return Err(ExtractionError::InvalidImage(format!(
            "image is {} bytes, maximum is {MAX_IMAGE_SIZE}",
            data.len()
        )));
    }

    let format = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ExtractionError::InvalidImage(e.to_string()))?
        .format()
        .ok_or_else(|| ExtractionError::InvalidImage("unrecognized image format".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ExtractionError::InvalidImage(format!(
            "unsupported image format {format:?}"
        )));
    }

    Ok(format)
}

/// Decodes, boosts contrast, smooths low-variance noise and re-encodes as PNG.
///
/// CPU bound; callers on the async runtime should go through `spawn_blocking`.
pub fn preprocess_image(data: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    let format = validate_image(data)?;

    let decoded = image::load_from_memory_with_format(data, format)
        .map_err(|e| ExtractionError::InvalidImage(e.to_string()))?;

    let mut pixels = decoded.to_rgba8();
    let (width, height) = pixels.dimensions();

    enhance_contrast(&mut pixels);
    reduce_noise(&mut pixels, width as usize, height as usize);

    let mut encoded = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(pixels)
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(|e| ExtractionError::Recognition(format!("failed to encode image: {e}")))?;

    Ok(encoded.into_inner())
}

/// Scales RGB channels of an RGBA buffer away from mid-grey. Alpha is untouched.
pub fn enhance_contrast(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(4) {
        for channel in &mut pixel[..3] {
            let value = (f32::from(*channel) - CONTRAST_PIVOT) * CONTRAST_FACTOR + CONTRAST_PIVOT;
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// 3x3 mean smoothing on interior pixels, applied only where the pixel is
/// already close to its neighbourhood so that glyph edges survive.
pub fn reduce_noise(pixels: &mut [u8], width: usize, height: usize) {
    if width < 3 || height < 3 || pixels.len() < width * height * 4 {
        return;
    }

    let source = pixels.to_vec();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let index = (y * width + x) * 4;

            for channel in 0..3 {
                let mut sum = 0u32;
                for ny in y - 1..=y + 1 {
                    for nx in x - 1..=x + 1 {
                        sum += u32::from(source[(ny * width + nx) * 4 + channel]);
                    }
                }

                let average = sum as f32 / 9.0;
                let current = f32::from(source[index + channel]);

                if (average - current).abs() < SMOOTHING_THRESHOLD {
                    let smoothed =
                        current * (1.0 - SMOOTHING_WEIGHT) + average * SMOOTHING_WEIGHT;
                    pixels[index + channel] = smoothed.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}
