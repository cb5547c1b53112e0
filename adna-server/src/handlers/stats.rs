//! Registry statistics handler

use adna_core::RegistryStats;
use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

/// Registry-wide statistics
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Certificates with status `approved`
    pub total_approved: u64,
    /// Certificates with status `revoked`
    pub total_revoked: u64,
    /// Verification attempts since process start
    pub total_verifications: u64,
    /// `tampered` outcomes since process start
    pub total_tamper_flags: u64,
}

impl From<RegistryStats> for StatsResponse {
    fn from(stats: RegistryStats) -> Self {
        Self {
            total_approved: stats.total_approved,
            total_revoked: stats.total_revoked,
            total_verifications: stats.total_verifications,
            total_tamper_flags: stats.total_tamper_flags,
        }
    }
}

/// Registry statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "Registry",
    responses(
        (status = 200, description = "Current statistics", body = StatsResponse),
        (status = 503, description = "Registry unavailable")
    )
)]
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.service.stats().await?;
    Ok(Json(stats.into()))
}
