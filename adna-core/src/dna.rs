//! DNA derivation.
//!
//! A DNA token is a SHA3-256 digest over the canonical form of an image's
//! perceptual features:
//!
//! ```text
//! {perceptual_hash}|{sorted palette hexes, comma-joined}|{width}x{height}|{mime}|{rule version}
//! ```
//!
//! Sorting the palette makes the token independent of the order in which the
//! extractor reported colors. The token identifies visually identical content;
//! it is not a commitment to the exact bytes.

use sha3::{Digest, Sha3_256};

use crate::extract::Rgb;

/// Length of a hex-encoded DNA token.
pub const DNA_HEX_LEN: usize = 64;

/// Derive the DNA token for a set of image features.
pub fn derive(
    perceptual_hash: &str,
    palette: &[Rgb],
    width: u32,
    height: u32,
    mime_type: &str,
    brand_rule_version: &str,
) -> String {
    let source = canonical_source(
        perceptual_hash,
        palette,
        width,
        height,
        mime_type,
        brand_rule_version,
    );

    let mut hasher = Sha3_256::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}

/// The exact string that [`derive`] hashes.
pub fn canonical_source(
    perceptual_hash: &str,
    palette: &[Rgb],
    width: u32,
    height: u32,
    mime_type: &str,
    brand_rule_version: &str,
) -> String {
    let mut colors: Vec<String> = palette.iter().map(|c| c.to_hex()).collect();
    colors.sort();

    format!(
        "{}|{}|{}x{}|{}|{}",
        perceptual_hash,
        colors.join(","),
        width,
        height,
        mime_type,
        brand_rule_version
    )
}

/// Whether `s` looks like a DNA token (64 hex characters).
pub fn is_dna_token(s: &str) -> bool {
    s.len() == DNA_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Number of differing character positions between two hash strings.
///
/// Positions beyond the shorter string count as differences, so hashes of
/// different lengths are never closer than their length gap.
pub fn hamming_distance(a: &str, b: &str) -> u32 {
    let overlap = a
        .chars()
        .zip(b.chars())
        .filter(|(x, y)| x != y)
        .count();
    let gap = a.chars().count().abs_diff(b.chars().count());
    (overlap + gap) as u32
}
