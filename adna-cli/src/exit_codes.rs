//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

use adna_core::AdnaError;

use crate::client::ServerError;

/// Successful execution, or a `VALID` verification.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Verification did not come back `VALID` (tampered, revoked or unregistered).
/// Maps to EX_DATAERR from sysexits.h.
pub const VERIFICATION_FAILED: i32 = 65;

/// Cannot open or use input (missing file, unsupported type, unknown DNA).
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Server unreachable or unavailable.
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const NETWORK_ERROR: i32 = 69;

/// A verification completed with a non-`VALID` outcome.
#[derive(Debug, thiserror::Error)]
#[error("verification failed: creative is {status}")]
pub struct VerificationFailed {
    pub status: adna_core::VerificationStatus,
}

/// Local input could not be used.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct InputError(pub String);

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Transport errors wrap io::Error, so they are checked before local I/O
        let code = if err.chain().any(|e| e.is::<VerificationFailed>()) {
            VERIFICATION_FAILED
        } else if let Some(server) = err.chain().find_map(|e| e.downcast_ref::<ServerError>()) {
            server.exit_code()
        } else if err.chain().any(|e| e.is::<reqwest::Error>()) {
            NETWORK_ERROR
        } else if err.chain().any(|e| {
            e.is::<InputError>()
                || e.is::<std::io::Error>()
                || e.downcast_ref::<AdnaError>().is_some_and(AdnaError::is_validation)
        }) {
            INPUT_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}
