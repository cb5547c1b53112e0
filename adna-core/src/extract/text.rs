//! Text region detection.
//!
//! OCR-grade detection is out of scope for this crate; detectors here only
//! need to produce bounding boxes good enough for the safe-zone rule.

use std::collections::VecDeque;

use image::GrayImage;

use super::{Deadline, ExtractionError, TextRegion};

/// Detects text-like regions in a grayscale image.
pub trait TextDetector: Send + Sync {
    fn detect(
        &self,
        image: &GrayImage,
        deadline: &Deadline,
    ) -> Result<Vec<TextRegion>, ExtractionError>;
}

/// Detector that never finds text. Safe-zone checks always pass with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTextDetector;

impl TextDetector for NoTextDetector {
    fn detect(
        &self,
        _image: &GrayImage,
        _deadline: &Deadline,
    ) -> Result<Vec<TextRegion>, ExtractionError> {
        Ok(Vec::new())
    }
}

/// Heuristic detector based on local contrast.
///
/// The image is split into square tiles. A tile is text-like when enough of
/// its horizontally adjacent pixel pairs differ by at least `edge_threshold`
/// (glyph strokes produce dense, sharp transitions; photos and gradients do
/// not). Text-like tiles are grouped by 4-connectivity and every group of at
/// least `min_tiles` tiles becomes one bounding box.
#[derive(Debug, Clone)]
pub struct ContrastTextDetector {
    pub tile_size: u32,
    pub edge_threshold: u8,
    pub min_density: f32,
    pub min_tiles: usize,
}

impl Default for ContrastTextDetector {
    fn default() -> Self {
        Self {
            tile_size: 8,
            edge_threshold: 48,
            min_density: 0.12,
            min_tiles: 2,
        }
    }
}

impl ContrastTextDetector {
    fn tile_is_text(&self, image: &GrayImage, tx: u32, ty: u32) -> bool {
        let (width, height) = image.dimensions();
        let x_start = tx * self.tile_size;
        let y_start = ty * self.tile_size;
        let x_end = (x_start + self.tile_size).min(width);
        let y_end = (y_start + self.tile_size).min(height);

        let mut edges = 0u32;
        let mut pairs = 0u32;
        for y in y_start..y_end {
            for x in x_start..x_end {
                if x + 1 >= x_end {
                    continue;
                }
                pairs += 1;
                let a = image.get_pixel(x, y).0[0];
                let b = image.get_pixel(x + 1, y).0[0];
                if a.abs_diff(b) >= self.edge_threshold {
                    edges += 1;
                }
            }
        }

        pairs > 0 && edges as f32 / pairs as f32 >= self.min_density
    }
}

impl TextDetector for ContrastTextDetector {
    fn detect(
        &self,
        image: &GrayImage,
        deadline: &Deadline,
    ) -> Result<Vec<TextRegion>, ExtractionError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || self.tile_size == 0 {
            return Ok(Vec::new());
        }

        let cols = width.div_ceil(self.tile_size);
        let rows = height.div_ceil(self.tile_size);
        let index = |tx: u32, ty: u32| (ty * cols + tx) as usize;

        let mut text = vec![false; (cols * rows) as usize];
        for ty in 0..rows {
            deadline.check()?;
            for tx in 0..cols {
                text[index(tx, ty)] = self.tile_is_text(image, tx, ty);
            }
        }

        let mut seen = vec![false; text.len()];
        let mut regions = Vec::new();

        for ty in 0..rows {
            for tx in 0..cols {
                let start = index(tx, ty);
                if !text[start] || seen[start] {
                    continue;
                }

                seen[start] = true;
                let mut queue = VecDeque::from([(tx, ty)]);
                let mut tiles = 0usize;
                let (mut min_x, mut min_y, mut max_x, mut max_y) = (tx, ty, tx, ty);

                while let Some((cx, cy)) = queue.pop_front() {
                    tiles += 1;
                    min_x = min_x.min(cx);
                    min_y = min_y.min(cy);
                    max_x = max_x.max(cx);
                    max_y = max_y.max(cy);

                    let mut neighbours = Vec::with_capacity(4);
                    if cx > 0 {
                        neighbours.push((cx - 1, cy));
                    }
                    if cy > 0 {
                        neighbours.push((cx, cy - 1));
                    }
                    if cx + 1 < cols {
                        neighbours.push((cx + 1, cy));
                    }
                    if cy + 1 < rows {
                        neighbours.push((cx, cy + 1));
                    }

                    for (nx, ny) in neighbours {
                        let n = index(nx, ny);
                        if text[n] && !seen[n] {
                            seen[n] = true;
                            queue.push_back((nx, ny));
                        }
                    }
                }

                if tiles >= self.min_tiles {
                    regions.push(TextRegion::new(
                        min_x * self.tile_size,
                        min_y * self.tile_size,
                        ((max_x + 1) * self.tile_size).min(width),
                        ((max_y + 1) * self.tile_size).min(height),
                    ));
                }
            }
        }

        Ok(regions)
    }
}
