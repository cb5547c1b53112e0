//! Verification handlers
//!
//! Handles POST /verify (image upload) and GET /verify-dna (token lookup).

use adna_core::VerificationResult;
use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::multipart::MultipartFields;
use crate::state::AppState;

/// Classify an uploaded creative against the registry
///
/// Accepts multipart/form-data with:
/// - **file** (required): JPEG or PNG creative
///
/// The outcome is one of `valid`, `tampered`, `unregistered` or `revoked`.
/// Every outcome is a 200; only malformed input is an error.
#[utoipa::path(
    post,
    path = "/verify",
    tag = "Verification",
    request_body(
        content_type = "multipart/form-data",
        description = "Creative to verify"
    ),
    responses(
        (status = 200, description = "Verification completed"),
        (status = 400, description = "Missing file, unsupported type or undecodable image"),
        (status = 503, description = "Registry unavailable")
    )
)]
pub async fn verify_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VerificationResult>, ApiError> {
    let file = MultipartFields::parse(&mut multipart, state.max_file_size)
        .await?
        .require_file()?;

    let result = state
        .service
        .verify(file.data, file.mime_type.as_str())
        .await?;

    Ok(Json(result))
}

/// Query parameters for token lookup
#[derive(Debug, Deserialize, IntoParams)]
pub struct VerifyDnaQuery {
    /// 64-character hex DNA token
    pub dna: Option<String>,
}

/// Look up a DNA token without uploading the image
///
/// Backs the public verify page linked from each certificate's `verify_url`.
#[utoipa::path(
    get,
    path = "/verify-dna",
    tag = "Verification",
    params(VerifyDnaQuery),
    responses(
        (status = 200, description = "Lookup completed"),
        (status = 400, description = "Missing or malformed DNA token"),
        (status = 503, description = "Registry unavailable")
    )
)]
pub async fn verify_dna_handler(
    State(state): State<AppState>,
    Query(query): Query<VerifyDnaQuery>,
) -> Result<Json<VerificationResult>, ApiError> {
    let dna = query
        .dna
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing 'dna' query parameter"))?;

    let result = state.service.verify_dna(&dna).await?;
    Ok(Json(result))
}
