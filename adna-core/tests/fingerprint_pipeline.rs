//! End-to-end tests of the fingerprint pipeline on real encoded images.
//!
//! Images are generated in-test so the suite has no fixture files.

use std::io::Cursor;
use std::sync::Arc;

use adna_core::{
    BrandRules, ComplianceLevel, FingerprintService, ImageFeatureExtractor, InMemoryRegistry,
    VerificationStatus,
};
use image::{ImageFormat, Rgb, RgbImage};

const BRAND_BLUE: Rgb<u8> = Rgb([0, 83, 159]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Brand blue on the left half, white on the right.
fn split_vertical() -> RgbImage {
    RgbImage::from_fn(256, 256, |x, _| if x < 128 { BRAND_BLUE } else { WHITE })
}

/// Brand blue on the top half, white on the bottom.
fn split_horizontal() -> RgbImage {
    RgbImage::from_fn(256, 256, |_, y| if y < 128 { BRAND_BLUE } else { WHITE })
}

fn encode(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format).expect("encoding failed");
    buffer.into_inner()
}

fn service() -> FingerprintService {
    FingerprintService::new(
        Arc::new(InMemoryRegistry::new()),
        Arc::new(ImageFeatureExtractor::new()),
    )
}

#[tokio::test]
async fn test_png_round_trip_is_valid() {
    let service = service();
    let bytes = encode(&split_vertical(), ImageFormat::Png);

    let cert = service.issue("banner.png", bytes.clone(), "image/png").await.unwrap();
    assert_eq!(cert.metadata.width, 256);
    assert_eq!(cert.metadata.perceptual_hash.len(), 64);
    assert_eq!(cert.compliance.color_rule, ComplianceLevel::Pass);

    let result = service.verify(bytes, "image/png").await.unwrap();
    assert_eq!(result.status, VerificationStatus::Valid);
    assert!(result.dna_match);
    let delta = result.delta.unwrap();
    assert_eq!(delta.phash_distance, 0);
    assert_eq!(delta.dominant_color_deviation, 0.0);
    assert!(!delta.color_rule_changed);
    assert!(!delta.safe_zone_changed);
}

#[tokio::test]
async fn test_jpeg_round_trip_is_valid() {
    let service = service();
    let bytes = encode(&split_vertical(), ImageFormat::Jpeg);

    let cert = service.issue("banner.jpg", bytes.clone(), "image/jpeg").await.unwrap();
    let result = service.verify(bytes, "image/jpeg").await.unwrap();

    assert_eq!(result.status, VerificationStatus::Valid);
    assert_eq!(result.candidate_dna, cert.dna);
}

#[tokio::test]
async fn test_small_edit_is_tampered() {
    let service = service();
    let original = split_vertical();
    let cert = service
        .issue("banner.png", encode(&original, ImageFormat::Png), "image/png")
        .await
        .unwrap();

    // Paint a small red patch deep inside the blue half
    let mut edited = original;
    for x in 40..48 {
        for y in 100..108 {
            edited.put_pixel(x, y, Rgb([200, 0, 0]));
        }
    }

    let result = service
        .verify(encode(&edited, ImageFormat::Png), "image/png")
        .await
        .unwrap();

    assert_eq!(result.status, VerificationStatus::Tampered);
    assert!(!result.dna_match);
    assert_ne!(result.candidate_dna, cert.dna);
    assert_eq!(result.stored_certificate.unwrap().dna, cert.dna);
    assert!(result.delta.unwrap().phash_distance <= 10);

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total_tamper_flags, 1);
}

#[tokio::test]
async fn test_unrelated_image_is_unregistered() {
    let service = service();
    service
        .issue("banner.png", encode(&split_vertical(), ImageFormat::Png), "image/png")
        .await
        .unwrap();

    let result = service
        .verify(encode(&split_horizontal(), ImageFormat::Png), "image/png")
        .await
        .unwrap();

    assert_eq!(result.status, VerificationStatus::Unregistered);
    assert!(result.stored_certificate.is_none());
}

#[tokio::test]
async fn test_revoked_creative() {
    let service = service();
    let bytes = encode(&split_vertical(), ImageFormat::Png);
    let cert = service.issue("banner.png", bytes.clone(), "image/png").await.unwrap();

    assert!(service.revoke(&cert.dna).await.unwrap());

    let result = service.verify(bytes, "image/png").await.unwrap();
    assert_eq!(result.status, VerificationStatus::Revoked);

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total_approved, 0);
    assert_eq!(stats.total_revoked, 1);
    assert_eq!(stats.total_verifications, 1);
}

#[tokio::test]
async fn test_off_brand_creative_fails_color_rule() {
    let service = service().with_rules(BrandRules::new("v1", vec![adna_core::Rgb(237, 28, 36)]));
    let gray = RgbImage::from_pixel(120, 80, Rgb([90, 160, 90]));

    let cert = service
        .issue("gray.png", encode(&gray, ImageFormat::Png), "image/png")
        .await
        .unwrap();

    assert_eq!(cert.compliance.color_rule, ComplianceLevel::Fail);
    assert_eq!(cert.compliance.safe_zone, ComplianceLevel::Pass);
    assert_eq!(
        cert.compliance.notes,
        vec!["No brand color detected", "No text detected"]
    );
}

#[tokio::test]
async fn test_undecodable_upload_rejected() {
    let service = service();
    let err = service
        .issue("notes.txt", b"definitely not an image".to_vec(), "image/png")
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(service.stats().await.unwrap().total_approved, 0);
}
