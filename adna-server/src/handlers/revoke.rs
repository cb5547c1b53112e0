//! Revocation handler
//!
//! Handles DELETE /remove-dna/{dna}.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

/// Response for a successful revocation
#[derive(Debug, Serialize, ToSchema)]
pub struct RevokeResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "DNA revoked")]
    pub message: String,
    /// Revoked DNA token
    pub dna: String,
}

/// Revoke a certificate
///
/// The certificate stays in the registry with status `revoked`, so later
/// verifications of the creative report `revoked`. Revoking twice succeeds
/// and keeps the original revocation time.
#[utoipa::path(
    delete,
    path = "/remove-dna/{dna}",
    tag = "Issuance",
    params(("dna" = String, Path, description = "DNA token to revoke")),
    responses(
        (status = 200, description = "Certificate revoked", body = RevokeResponse),
        (status = 404, description = "Unknown DNA token"),
        (status = 503, description = "Registry unavailable")
    )
)]
pub async fn revoke_handler(
    State(state): State<AppState>,
    Path(dna): Path<String>,
) -> Result<Json<RevokeResponse>, ApiError> {
    if !state.service.revoke(&dna).await? {
        return Err(ApiError::not_found(format!("DNA {} is not registered", dna)));
    }

    Ok(Json(RevokeResponse {
        success: true,
        message: "DNA revoked".to_string(),
        dna: dna.trim().to_ascii_lowercase(),
    }))
}
