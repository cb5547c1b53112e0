//! Dominant color palette extraction.
//!
//! Pixels are quantized to 5 bits per channel. The most populous buckets
//! become the palette, each represented by the mean of the pixels that fell
//! into it. Fully transparent pixels are ignored.

use std::collections::HashMap;

use image::RgbaImage;

use super::Rgb;

/// Number of colors returned by [`dominant_colors`] by default.
pub const DEFAULT_PALETTE_SIZE: usize = 5;

/// Bits kept per channel when bucketing.
const QUANT_BITS: u32 = 5;

/// Sample every n-th pixel for large images.
const MAX_SAMPLES: u64 = 250_000;

#[derive(Default)]
struct Bucket {
    count: u64,
    r: u64,
    g: u64,
    b: u64,
}

/// Extract up to `max_colors` dominant colors, most prominent first.
///
/// Buckets with equal populations are ordered by bucket key so the result is
/// fully deterministic for a given image.
pub fn dominant_colors(image: &RgbaImage, max_colors: usize) -> Vec<Rgb> {
    let total = u64::from(image.width()) * u64::from(image.height());
    if total == 0 || max_colors == 0 {
        return Vec::new();
    }
    let step = (total / MAX_SAMPLES).max(1) as usize;

    let shift = 8 - QUANT_BITS;
    let mut buckets: HashMap<u32, Bucket> = HashMap::new();

    for pixel in image.pixels().step_by(step) {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }
        let key = (u32::from(r >> shift) << (2 * QUANT_BITS))
            | (u32::from(g >> shift) << QUANT_BITS)
            | u32::from(b >> shift);
        let bucket = buckets.entry(key).or_default();
        bucket.count += 1;
        bucket.r += u64::from(r);
        bucket.g += u64::from(g);
        bucket.b += u64::from(b);
    }

    let mut ranked: Vec<(u32, Bucket)> = buckets.into_iter().collect();
    ranked.sort_by(|(ka, a), (kb, b)| b.count.cmp(&a.count).then(ka.cmp(kb)));

    ranked
        .into_iter()
        .take(max_colors)
        .map(|(_, bucket)| {
            let mean = |sum: u64| ((sum as f64 / bucket.count as f64).round()) as u8;
            Rgb(mean(bucket.r), mean(bucket.g), mean(bucket.b))
        })
        .collect()
}
