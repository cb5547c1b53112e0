//! Issuance handler
//!
//! Handles POST /generate-dna requests to register a creative.

use adna_core::Certificate;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::error::ApiError;
use crate::multipart::MultipartFields;
use crate::state::AppState;

/// Register a creative and return its certificate
///
/// Accepts multipart/form-data with:
/// - **file** (required): JPEG or PNG creative, declared via the part's Content-Type
///
/// The certificate carries the DNA token, the fingerprint metadata and the
/// baseline brand compliance of the uploaded asset. Uploading the same
/// content again replaces the previous certificate.
#[utoipa::path(
    post,
    path = "/generate-dna",
    tag = "Issuance",
    request_body(
        content_type = "multipart/form-data",
        description = "Creative to register"
    ),
    responses(
        (status = 201, description = "Certificate issued"),
        (status = 400, description = "Missing file, unsupported type or undecodable image"),
        (status = 503, description = "Registry unavailable")
    )
)]
pub async fn issue_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Certificate>), ApiError> {
    let file = MultipartFields::parse(&mut multipart, state.max_file_size)
        .await?
        .require_file()?;

    tracing::debug!(
        file_name = file.display_name(),
        size = file.data.len(),
        mime_type = %file.mime_type,
        "Issuing certificate"
    );

    let name = file.display_name().to_string();
    let certificate = state
        .service
        .issue(&name, file.data, file.mime_type.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(certificate)))
}
