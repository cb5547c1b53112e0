//! Perceptual feature extraction.
//!
//! The fingerprint engine never looks at pixels itself. It asks a
//! [`FeatureExtractor`] for the handful of features it needs:
//!
//! - **Perceptual hash**: fixed-length hex string, visually similar images
//!   land at a small Hamming distance
//! - **Dominant palette**: ordered list of RGB triples
//! - **Dimensions**: pixel width and height
//! - **Text regions**: bounding boxes of detected text
//!
//! The default implementation ([`ImageFeatureExtractor`]) is available with
//! the `image-features` feature. Tests and alternative deployments can plug
//! in their own extractor.

#[cfg(feature = "image-features")]
mod extractor;
#[cfg(feature = "image-features")]
pub mod palette;
#[cfg(feature = "image-features")]
pub mod text;

#[cfg(feature = "image-features")]
pub use extractor::{ImageFeatureExtractor, PERCEPTUAL_HASH_HEX_LEN};
#[cfg(feature = "image-features")]
pub use text::{ContrastTextDetector, NoTextDetector, TextDetector};

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An RGB color triple.
///
/// Serializes as a plain `[r, g, b]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Fixed-width lowercase hex form, e.g. `00539f`.
    pub fn to_hex(self) -> String {
        hex::encode([self.0, self.1, self.2])
    }

    /// Parse a 6-digit hex color, with or without a leading `#`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('#');
        let bytes = hex::decode(s).ok()?;
        match bytes.as_slice() {
            [r, g, b] => Some(Self(*r, *g, *b)),
            _ => None,
        }
    }

    /// Euclidean distance in RGB space.
    pub fn distance(self, other: Self) -> f64 {
        let dr = f64::from(self.0) - f64::from(other.0);
        let dg = f64::from(self.1) - f64::from(other.1);
        let db = f64::from(self.2) - f64::from(other.2);
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self(r, g, b)
    }
}

/// Bounding box of a detected text region, in pixels.
///
/// `(x0, y0)` is the top-left corner, `(x1, y1)` the bottom-right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRegion {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl TextRegion {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest distance from the box to any of the four image edges.
    ///
    /// Negative when the box spills outside the image.
    pub fn min_edge_margin(&self, width: u32, height: u32) -> i64 {
        let left = i64::from(self.x0);
        let top = i64::from(self.y0);
        let right = i64::from(width) - i64::from(self.x1);
        let bottom = i64::from(height) - i64::from(self.y1);
        left.min(top).min(right).min(bottom)
    }
}

/// Everything the engine needs to know about an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFeatures {
    /// Hex-encoded perceptual hash
    pub perceptual_hash: String,
    /// Dominant colors, most prominent first
    pub palette: Vec<Rgb>,
    pub width: u32,
    pub height: u32,
    /// Detected text bounding boxes
    pub text_regions: Vec<TextRegion>,
}

/// Feature extraction failures. All of them are the caller's fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("image has no pixels")]
    EmptyImage,

    #[error("feature extraction timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("extraction worker failed: {0}")]
    Worker(String),
}

/// Point in time after which an extraction must give up.
///
/// Extraction runs on the blocking pool, where dropping the awaiting future
/// does not stop the thread. Extractors call [`Deadline::check`] between
/// stages and inside long loops so a timed-out job frees its thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
    budget: Duration,
}

impl Deadline {
    /// Deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
            budget,
        }
    }

    /// Deadline that never expires.
    pub fn none() -> Self {
        Self {
            at: None,
            budget: Duration::MAX,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// `Err(Timeout)` once the deadline has passed.
    pub fn check(&self) -> Result<(), ExtractionError> {
        if self.is_expired() {
            Err(ExtractionError::Timeout(self.budget))
        } else {
            Ok(())
        }
    }
}

/// Pluggable perceptual feature extraction.
///
/// Implementations are CPU-bound and synchronous; the service runs them on
/// the blocking pool. They must be thread-safe and should return
/// [`ExtractionError::Timeout`] soon after `deadline` expires.
pub trait FeatureExtractor: Send + Sync {
    /// Extract perceptual features from raw image bytes.
    fn extract(&self, bytes: &[u8], deadline: &Deadline) -> Result<ImageFeatures, ExtractionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb(0, 83, 159).to_hex(), "00539f");
        assert_eq!(Rgb::from_hex("#ED1C24"), Some(Rgb(237, 28, 36)));
        assert_eq!(Rgb::from_hex("fff"), None);
        assert_eq!(Rgb::from_hex("zzzzzz"), None);
    }

    #[test]
    fn test_rgb_distance() {
        assert_eq!(Rgb(0, 0, 0).distance(Rgb(0, 0, 0)), 0.0);
        assert_eq!(Rgb(0, 83, 199).distance(Rgb(0, 83, 159)), 40.0);
        assert_eq!(Rgb(3, 4, 0).distance(Rgb(0, 0, 0)), 5.0);
    }

    #[test]
    fn test_rgb_serializes_as_array() {
        let json = serde_json::to_string(&Rgb(1, 2, 3)).unwrap();
        assert_eq!(json, "[1,2,3]");
    }

    #[test]
    fn test_text_region_margin() {
        let region = TextRegion::new(30, 12, 90, 40);
        // left 30, top 12, right 10, bottom 60
        assert_eq!(region.min_edge_margin(100, 100), 10);
    }

    #[test]
    fn test_text_region_margin_overflow() {
        let region = TextRegion::new(5, 5, 120, 50);
        assert_eq!(region.min_edge_margin(100, 100), -20);
    }

    #[test]
    fn test_deadline() {
        assert!(Deadline::none().check().is_ok());
        assert!(Deadline::after(Duration::from_secs(60)).check().is_ok());

        let expired = Deadline::after(Duration::ZERO);
        assert!(expired.is_expired());
        assert_eq!(
            expired.check(),
            Err(ExtractionError::Timeout(Duration::ZERO))
        );
    }

    #[test]
    fn test_timeout_reports_milliseconds() {
        let err = ExtractionError::Timeout(Duration::from_millis(20));
        assert_eq!(err.to_string(), "feature extraction timed out after 20ms");
    }
}
