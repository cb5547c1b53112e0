//! API integration tests for adna-server.
//!
//! These tests drive the HTTP API with realistic multipart requests,
//! covering the full issue/verify/revoke flow through the REST endpoints.

use std::io::Cursor;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use tower::ServiceExt;

use adna_server::{create_router, create_router_with_config, Config};

const BOUNDARY: &str = "----TestBoundary7MA4YWxkTrZu0gW";

/// Helper to create a multipart body with a single `file` part
fn create_file_multipart(content: &[u8], content_type: Option<&str>) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"banner.png\"\r\n",
    );
    if let Some(ct) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// Helper to create a multipart body with only a text field
fn create_text_multipart() -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"note\"\r\n\r\n");
    body.extend_from_slice(b"no file here\r\n");
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// Brand blue on the left half, white on the right
fn banner_png() -> Vec<u8> {
    let img = RgbImage::from_fn(200, 120, |x, _| {
        if x < 100 {
            Rgb([0, 83, 159])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .expect("PNG encoding failed");
    buffer.into_inner()
}

/// Brand blue on the top half, white on the bottom
fn other_png() -> Vec<u8> {
    let img = RgbImage::from_fn(200, 120, |_, y| {
        if y < 60 {
            Rgb([0, 83, 159])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .expect("PNG encoding failed");
    buffer.into_inner()
}

/// Deterministic RGB noise; compresses poorly, so the PNG is about 3 bytes per pixel
fn noise_png(size: u32) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    let img = RgbImage::from_fn(size, size, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        Rgb([r, g, b])
    });
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .expect("PNG encoding failed");
    buffer.into_inner()
}

async fn post_file(app: &Router, uri: &str, content: &[u8], content_type: Option<&str>) -> Response {
    let (multipart_type, body) = create_file_multipart(content, content_type);
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", multipart_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn send(app: &Router, method: &str, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// ============================================================================
// Health & Readiness Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = create_router();

    let response = send(&app, "GET", "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "adna-server");
    assert_eq!(json["brand_rule_version"], "v1");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_endpoint_returns_ok() {
    let app = create_router();

    let response = send(&app, "GET", "/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["ready"], true);
}

// ============================================================================
// Issuance Tests
// ============================================================================

#[tokio::test]
async fn test_generate_dna_creates_certificate() {
    let app = create_router();

    let response = post_file(&app, "/generate-dna", &banner_png(), Some("image/png")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = json_body(response).await;
    assert_eq!(json["dna"].as_str().unwrap().len(), 64);
    assert_eq!(json["status"], "approved");
    assert_eq!(json["filename"], "banner.png");
    assert_eq!(json["metadata"]["mime_type"], "image/png");
    assert_eq!(json["metadata"]["width"], 200);
    assert_eq!(json["metadata"]["brand_rule_version"], "v1");
    assert_eq!(json["compliance"]["color_rule"], "PASS");
    assert!(json["certificate_id"].is_string());
}

#[tokio::test]
async fn test_generate_dna_includes_verify_url() {
    let config = Config {
        public_verify_url: Some("https://verify.example.com".into()),
        ..Config::default()
    };
    let app = create_router_with_config(&config);

    let response = post_file(&app, "/generate-dna", &banner_png(), Some("image/png")).await;
    let json = json_body(response).await;

    let expected = format!(
        "https://verify.example.com/verify?dna={}",
        json["dna"].as_str().unwrap()
    );
    assert_eq!(json["verify_url"], expected.as_str());
}

#[tokio::test]
async fn test_generate_dna_missing_file_field() {
    let app = create_router();
    let (content_type, body) = create_text_multipart();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/generate-dna")
                .header("content-type", content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_generate_dna_rejects_unsupported_type() {
    let app = create_router();

    let response = post_file(&app, "/generate-dna", &banner_png(), Some("image/gif")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "UNSUPPORTED_MIME_TYPE");
}

#[tokio::test]
async fn test_generate_dna_rejects_missing_content_type() {
    let app = create_router();

    let response = post_file(&app, "/generate-dna", &banner_png(), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_dna_rejects_undecodable_image() {
    let app = create_router();

    let response = post_file(&app, "/generate-dna", b"not really a png", Some("image/png")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["code"], "EXTRACTION_FAILED");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_generate_dna_rejects_oversized_file() {
    let config = Config {
        max_file_size_mb: 0,
        ..Config::default()
    };
    let app = create_router_with_config(&config);

    let response = post_file(&app, "/generate-dna", &banner_png(), Some("image/png")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("File too large"));
}

#[tokio::test]
async fn test_generate_dna_accepts_upload_over_two_mib() {
    let app = create_router();

    let png = noise_png(1024);
    assert!(png.len() > 2 * 1024 * 1024);
    assert!(png.len() < Config::default().max_file_size());

    let response = post_file(&app, "/generate-dna", &png, Some("image/png")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = json_body(response).await;
    assert_eq!(json["metadata"]["width"], 1024);

    let response = post_file(&app, "/verify", &png, Some("image/png")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "valid");
}

#[tokio::test]
async fn test_upload_over_file_cap_is_cut_off() {
    let config = Config {
        max_file_size_mb: 1,
        ..Config::default()
    };
    let app = create_router_with_config(&config);

    let response = post_file(&app, "/generate-dna", &noise_png(1024), Some("image/png")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "INVALID_INPUT");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("exceeds maximum of 1 MB"));
}

// ============================================================================
// Verification Tests
// ============================================================================

#[tokio::test]
async fn test_issue_then_verify_is_valid() {
    let app = create_router();
    let png = banner_png();

    let issued = json_body(post_file(&app, "/generate-dna", &png, Some("image/png")).await).await;

    let response = post_file(&app, "/verify", &png, Some("image/png")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "valid");
    assert_eq!(json["dna_match"], true);
    assert_eq!(json["candidate_dna"], issued["dna"]);
    assert_eq!(json["delta"]["phash_distance"], 0);
    assert_eq!(json["stored_certificate"]["dna"], issued["dna"]);
    assert!(json["verified_at"].is_string());
}

#[tokio::test]
async fn test_verify_empty_registry_is_unregistered() {
    let app = create_router();

    let response = post_file(&app, "/verify", &banner_png(), Some("image/png")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "unregistered");
    assert_eq!(json["dna_match"], false);
    assert!(json.get("stored_certificate").is_none());
}

#[tokio::test]
async fn test_verify_unrelated_image_is_unregistered() {
    let app = create_router();
    post_file(&app, "/generate-dna", &banner_png(), Some("image/png")).await;

    let response = post_file(&app, "/verify", &other_png(), Some("image/png")).await;
    assert_eq!(json_body(response).await["status"], "unregistered");
}

#[tokio::test]
async fn test_verify_dna_lookup() {
    let app = create_router();
    let issued =
        json_body(post_file(&app, "/generate-dna", &banner_png(), Some("image/png")).await).await;
    let dna = issued["dna"].as_str().unwrap();

    let response = send(&app, "GET", &format!("/verify-dna?dna={}", dna)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "valid");
    assert_eq!(json["stored_compliance"]["color_rule"], "PASS");

    let unknown = "ab".repeat(32);
    let response = send(&app, "GET", &format!("/verify-dna?dna={}", unknown)).await;
    assert_eq!(json_body(response).await["status"], "unregistered");
}

#[tokio::test]
async fn test_verify_dna_rejects_bad_tokens() {
    let app = create_router();

    let response = send(&app, "GET", "/verify-dna").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, "GET", "/verify-dna?dna=xyz").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_DNA");
}

// ============================================================================
// Revocation & Stats Tests
// ============================================================================

#[tokio::test]
async fn test_revoke_then_verify_is_revoked() {
    let app = create_router();
    let png = banner_png();
    let issued = json_body(post_file(&app, "/generate-dna", &png, Some("image/png")).await).await;
    let dna = issued["dna"].as_str().unwrap();

    let response = send(&app, "DELETE", &format!("/remove-dna/{}", dna)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["dna"], dna);

    // Second revocation still succeeds
    let response = send(&app, "DELETE", &format!("/remove-dna/{}", dna)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_file(&app, "/verify", &png, Some("image/png")).await;
    let json = json_body(response).await;
    assert_eq!(json["status"], "revoked");
    assert_eq!(json["dna_match"], true);
    assert!(json["stored_certificate"]["revoked_at"].is_string());
}

#[tokio::test]
async fn test_revoke_unknown_is_not_found() {
    let app = create_router();

    let response = send(&app, "DELETE", &format!("/remove-dna/{}", "0".repeat(64))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_stats_track_activity() {
    let app = create_router();
    let png = banner_png();

    let issued = json_body(post_file(&app, "/generate-dna", &png, Some("image/png")).await).await;
    post_file(&app, "/generate-dna", &other_png(), Some("image/png")).await;
    post_file(&app, "/verify", &png, Some("image/png")).await;
    send(
        &app,
        "DELETE",
        &format!("/remove-dna/{}", issued["dna"].as_str().unwrap()),
    )
    .await;
    // Rejected before any counter moves
    post_file(&app, "/verify", b"garbage", Some("image/png")).await;

    let response = send(&app, "GET", "/stats").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["total_approved"], 1);
    assert_eq!(json["total_revoked"], 1);
    assert_eq!(json["total_verifications"], 1);
    assert_eq!(json["total_tamper_flags"], 0);
}

// ============================================================================
// Documentation Tests
// ============================================================================

#[tokio::test]
async fn test_openapi_spec_endpoint() {
    let app = create_router();

    let response = send(&app, "GET", "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert!(json["openapi"].as_str().unwrap().starts_with("3."));
    assert!(json["paths"]["/generate-dna"].is_object());
    assert!(json["paths"]["/verify"].is_object());
    assert!(json["paths"]["/remove-dna/{dna}"].is_object());
}
