//! Multipart form parsing helpers
//!
//! Both upload endpoints take a single `file` part; this module reads and
//! validates it once so handlers only deal with typed data.

use adna_core::MimeType;
use axum::extract::Multipart;

use crate::error::ApiError;
use crate::validation::{file_too_large, validate_content_type, validate_file_size};

/// A creative uploaded via multipart form
#[derive(Debug, Clone)]
pub struct FileField {
    /// File data bytes
    pub data: Vec<u8>,
    /// Declared MIME type, already validated
    pub mime_type: MimeType,
    /// Original filename from the multipart field (if provided)
    pub file_name: Option<String>,
}

impl FileField {
    /// Filename to record on the certificate.
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("upload")
    }
}

/// Parsed multipart form fields
#[derive(Debug, Default)]
pub struct MultipartFields {
    /// File field (named "file")
    file: Option<FileField>,
}

impl MultipartFields {
    /// Parse all fields from a multipart request
    ///
    /// Unknown fields are skipped. The `file` part must declare `image/jpeg`
    /// or `image/png` and be at most `max_file_size` bytes; reading stops as
    /// soon as that cap is passed.
    pub async fn parse(multipart: &mut Multipart, max_file_size: usize) -> Result<Self, ApiError> {
        let mut file: Option<FileField> = None;

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to parse multipart: {}", e)))?
        {
            if field.name() != Some("file") {
                continue;
            }

            let mime_type = validate_content_type(field.content_type())?;
            let file_name = field.file_name().map(|s| s.to_string());

            // Buffer chunk by chunk so an oversized part is cut off at the cap
            let mut data = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?
            {
                if data.len() + chunk.len() > max_file_size {
                    return Err(file_too_large(max_file_size));
                }
                data.extend_from_slice(&chunk);
            }

            validate_file_size(data.len(), max_file_size)?;

            file = Some(FileField {
                data,
                mime_type,
                file_name,
            });
        }

        Ok(Self { file })
    }

    /// Take the file field
    ///
    /// Returns an error if no file was uploaded.
    pub fn require_file(self) -> Result<FileField, ApiError> {
        self.file.ok_or_else(|| {
            ApiError::bad_request("No file provided. Use 'file' field in multipart form.")
        })
    }
}
