//! Image normalization: decode whatever the provider produced and re-encode
//! it as a compact, alpha-free JPEG for storage.

use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;

/// Content type of every normalized image.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("JPEG quality must be within 1..=100, got {0}")]
    InvalidQuality(u32),
}

/// JPEG quality level, always within `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub const DEFAULT: Quality = Quality(70);

    pub fn new(value: u32) -> Result<Self, CodecError> {
        match value {
            1..=100 => Ok(Quality(value as u8)),
            _ => Err(CodecError::InvalidQuality(value)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::DEFAULT
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageNormalizer {
    quality: Quality,
}

impl ImageNormalizer {
    pub fn new(quality: Quality) -> Self {
        Self { quality }
    }

    /// Decode `raw` (format sniffed from content) and re-encode as RGB JPEG.
    ///
    /// Alpha is dropped, not blended: transparent pixels keep whatever color
    /// they carry. Palette images are expanded by the decoder first. Anything
    /// the decoders reject is a [`CodecError::Decode`].
    ///
    /// Output is baseline JPEG with the encoder's standard Huffman tables;
    /// there is no optimized-Huffman pass, so files run slightly larger than
    /// an optimizing encoder would produce at the same quality.
    pub fn normalize(&self, raw: &[u8]) -> Result<NormalizedImage, CodecError> {
        let decoded =
            image::load_from_memory(raw).map_err(|e| CodecError::Decode(e.to_string()))?;

        let source_color = decoded.color();
        let (width, height) = (decoded.width(), decoded.height());
        let rgb = decoded.into_rgb8();

        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality.get());
        rgb.write_with_encoder(encoder)
            .map_err(|e| CodecError::Encode(e.to_string()))?;

        tracing::debug!(
            source_color = ?source_color,
            width,
            height,
            input_size = raw.len(),
            output_size = bytes.len(),
            quality = self.quality.get(),
            "Normalized image"
        );

        Ok(NormalizedImage {
            bytes,
            content_type: JPEG_CONTENT_TYPE,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_images::*;
    use super::*;
    use image::ColorType;

    fn decode(bytes: &[u8]) -> image::DynamicImage {
        image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
            .expect("output should be a valid JPEG")
    }

    #[test]
    fn rgba_png_becomes_three_channel_jpeg() {
        let normalized = ImageNormalizer::default()
            .normalize(&rgba_png(32, 16))
            .unwrap();

        assert_eq!(normalized.content_type, "image/jpeg");
        assert_eq!(&normalized.bytes[..2], &[0xFF, 0xD8]);

        let output = decode(&normalized.bytes);
        assert_eq!(output.color(), ColorType::Rgb8);
        assert!(!output.color().has_alpha());
        assert_eq!((output.width(), output.height()), (32, 16));
    }

    #[test]
    fn grayscale_is_widened_to_rgb() {
        let normalized = ImageNormalizer::default()
            .normalize(&gray_png(8, 8))
            .unwrap();

        assert_eq!(decode(&normalized.bytes).color(), ColorType::Rgb8);
    }

    #[test]
    fn palette_gif_becomes_three_channel_jpeg() {
        let raw = indexed_gif(10, 6);
        assert_eq!(&raw[..3], b"GIF");

        let normalized = ImageNormalizer::default().normalize(&raw).unwrap();

        let output = decode(&normalized.bytes);
        assert_eq!(output.color(), ColorType::Rgb8);
        assert_eq!((output.width(), output.height()), (10, 6));
    }

    #[test]
    fn format_is_detected_from_content() {
        let normalized = ImageNormalizer::default()
            .normalize(&rgba_webp(4, 4))
            .unwrap();

        assert_eq!(decode(&normalized.bytes).color(), ColorType::Rgb8);
    }

    #[test]
    fn jpeg_input_is_accepted() {
        let first = ImageNormalizer::default().normalize(&rgba_png(8, 8)).unwrap();
        let second = ImageNormalizer::default().normalize(&first.bytes).unwrap();

        assert_eq!(decode(&second.bytes).color(), ColorType::Rgb8);
    }

    #[test]
    fn undecodable_bytes_are_rejected() {
        let normalizer = ImageNormalizer::default();

        for raw in [&b""[..], &b"hello world"[..], &[0x89, b'P', b'N', b'G'][..]] {
            assert!(matches!(
                normalizer.normalize(raw),
                Err(CodecError::Decode(_))
            ));
        }
    }

    #[test]
    fn lower_quality_yields_smaller_output() {
        let raw = rgba_png(128, 128);
        let low = ImageNormalizer::new(Quality::new(5).unwrap())
            .normalize(&raw)
            .unwrap();
        let high = ImageNormalizer::new(Quality::new(100).unwrap())
            .normalize(&raw)
            .unwrap();

        assert!(low.bytes.len() < high.bytes.len());
    }

    #[test]
    fn quality_bounds() {
        assert_eq!(Quality::default().get(), 70);
        assert_eq!(Quality::new(1).unwrap().get(), 1);
        assert_eq!(Quality::new(100).unwrap().get(), 100);
        assert_eq!(Quality::new(0), Err(CodecError::InvalidQuality(0)));
        assert_eq!(Quality::new(101), Err(CodecError::InvalidQuality(101)));
    }
}
