//! Default feature extractor backed by the `image` and `blockhash` crates.
//!
//! # Algorithm
//!
//! - Perceptual hash: Blockhash with a 16x16 grid (256 bits, 64 hex chars),
//!   robust against re-encoding and mild resizing.
//! - Palette: see [`super::palette`].
//! - Text regions: delegated to a pluggable [`TextDetector`].

use std::sync::Arc;

use blockhash::{blockhash256, Blockhash256};
use image::{DynamicImage, ImageFormat};
use tracing::debug;

use super::palette::{dominant_colors, DEFAULT_PALETTE_SIZE};
use super::text::{ContrastTextDetector, TextDetector};
use super::{Deadline, ExtractionError, FeatureExtractor, ImageFeatures};

/// Length of the hex-encoded Blockhash-256 perceptual hash.
pub const PERCEPTUAL_HASH_HEX_LEN: usize = 64;

/// Extracts features from JPEG and PNG bytes.
#[derive(Clone)]
pub struct ImageFeatureExtractor {
    palette_size: usize,
    detector: Arc<dyn TextDetector>,
}

impl ImageFeatureExtractor {
    /// Extractor with the contrast-based text detector.
    pub fn new() -> Self {
        Self::with_text_detector(Arc::new(ContrastTextDetector::default()))
    }

    pub fn with_text_detector(detector: Arc<dyn TextDetector>) -> Self {
        Self {
            palette_size: DEFAULT_PALETTE_SIZE,
            detector,
        }
    }

    /// Override the number of palette colors (default: 5).
    pub fn with_palette_size(mut self, palette_size: usize) -> Self {
        self.palette_size = palette_size;
        self
    }

    /// Decode raw bytes, accepting only JPEG and PNG content.
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ExtractionError> {
        let format = image::guess_format(bytes)
            .map_err(|e| ExtractionError::UnsupportedFormat(e.to_string()))?;

        if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
            return Err(ExtractionError::UnsupportedFormat(format!("{:?}", format)));
        }

        image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ExtractionError::Decode(e.to_string()))
    }

    /// Extract features from an already decoded image.
    ///
    /// The deadline is checked before each stage.
    pub fn extract_image(
        &self,
        image: &DynamicImage,
        deadline: &Deadline,
    ) -> Result<ImageFeatures, ExtractionError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(ExtractionError::EmptyImage);
        }

        deadline.check()?;
        let hash: Blockhash256 = blockhash256(image);
        let hash_bytes: [u8; 32] = hash.into();
        let perceptual_hash = hex::encode(hash_bytes);

        deadline.check()?;
        let palette = dominant_colors(&image.to_rgba8(), self.palette_size);

        deadline.check()?;
        let text_regions = self.detector.detect(&image.to_luma8(), deadline)?;

        debug!(
            width,
            height,
            palette_len = palette.len(),
            text_regions = text_regions.len(),
            "Extracted image features"
        );

        Ok(ImageFeatures {
            perceptual_hash,
            palette,
            width,
            height,
            text_regions,
        })
    }
}

impl Default for ImageFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for ImageFeatureExtractor {
    fn extract(
        &self,
        bytes: &[u8],
        deadline: &Deadline,
    ) -> Result<ImageFeatures, ExtractionError> {
        deadline.check()?;
        let image = Self::decode(bytes)?;
        self.extract_image(&image, deadline)
    }
}

impl std::fmt::Debug for ImageFeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFeatureExtractor")
            .field("palette_size", &self.palette_size)
            .finish_non_exhaustive()
    }
}
