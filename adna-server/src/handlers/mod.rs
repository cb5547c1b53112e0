//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod health;
pub mod issue;
pub mod revoke;
pub mod stats;
pub mod verify;

pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use issue::issue_handler;
pub use revoke::{revoke_handler, RevokeResponse};
pub use stats::{stats_handler, StatsResponse};
pub use verify::{verify_dna_handler, verify_handler, VerifyDnaQuery};
