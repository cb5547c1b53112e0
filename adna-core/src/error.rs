use thiserror::Error;

use crate::extract::ExtractionError;
use crate::registry::RegistryError;

#[derive(Error, Debug)]
pub enum AdnaError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported MIME type: {0} (expected image/jpeg or image/png)")]
    UnsupportedMimeType(String),

    #[error("Invalid DNA token: {0}")]
    InvalidDna(String),

    #[error("Feature extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl AdnaError {
    /// Whether the error is the caller's fault (bad bytes, MIME type or token).
    ///
    /// Registry failures are the only errors that are not validation errors.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Registry(_))
    }
}

pub type Result<T> = std::result::Result<T, AdnaError>;
