//! Upload validation module
//!
//! Provides validation utilities for multipart file uploads.

use adna_core::MimeType;

use crate::error::ApiError;

/// Default max file size in bytes (10 MB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Validates the declared Content-Type of an uploaded creative
///
/// Only `image/jpeg` and `image/png` are accepted (case-insensitive,
/// parameters such as `; charset=` are ignored). A missing Content-Type is
/// rejected: the MIME type is part of the DNA, so it cannot be guessed.
pub fn validate_content_type(content_type: Option<&str>) -> Result<MimeType, ApiError> {
    let ct = content_type.ok_or_else(|| {
        ApiError::bad_request("Missing Content-Type on 'file' field (expected image/jpeg or image/png)")
    })?;

    let essence = ct.split(';').next().unwrap_or_default();
    MimeType::parse(essence).map_err(ApiError::from)
}

/// Validates the size of an uploaded file
///
/// Returns an error if the file is empty or exceeds the maximum size.
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ApiError> {
    if size == 0 {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }
    if size > max_size {
        Err(file_too_large(max_size))
    } else {
        Ok(())
    }
}

/// Error for an upload over `max_size` bytes.
///
/// Uploads are rejected while streaming, so the full size is not known.
pub fn file_too_large(max_size: usize) -> ApiError {
    ApiError::bad_request(format!(
        "File too large: exceeds maximum of {} MB",
        max_size / (1024 * 1024)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content_type_accepted() {
        assert_eq!(validate_content_type(Some("image/jpeg")).unwrap(), MimeType::Jpeg);
        assert_eq!(validate_content_type(Some("IMAGE/PNG")).unwrap(), MimeType::Png);
        assert_eq!(
            validate_content_type(Some("image/png; charset=binary")).unwrap(),
            MimeType::Png
        );
    }

    #[test]
    fn test_validate_content_type_rejected() {
        assert!(validate_content_type(Some("image/webp")).is_err());
        assert!(validate_content_type(Some("application/octet-stream")).is_err());
        assert!(validate_content_type(Some("text/html")).is_err());
        assert!(validate_content_type(None).is_err());
    }

    #[test]
    fn test_validate_file_size_ok() {
        let max = 10 * 1024 * 1024; // 10 MB
        assert!(validate_file_size(1024, max).is_ok()); // 1 KB
        assert!(validate_file_size(max, max).is_ok()); // exactly max
    }

    #[test]
    fn test_validate_file_size_rejected() {
        let max = 10 * 1024 * 1024;
        assert!(validate_file_size(0, max).is_err());
        assert!(validate_file_size(max + 1, max).is_err());
    }

    #[test]
    fn test_file_too_large_message() {
        let err = file_too_large(10 * 1024 * 1024);
        assert_eq!(
            err.to_string(),
            "Bad request: File too large: exceeds maximum of 10 MB"
        );
    }
}
