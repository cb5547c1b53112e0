use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compliance::ComplianceSummary;
use crate::error::{AdnaError, Result};
use crate::extract::Rgb;

/// Image encodings accepted for issuance and verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MimeType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
}

impl MimeType {
    /// Parse a declared MIME type (case-insensitive).
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            _ => Err(AdnaError::UnsupportedMimeType(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

impl std::fmt::Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MimeType {
    type Err = AdnaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Certificate lifecycle. The only transition is `Approved -> Revoked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Approved,
    Revoked,
}

/// Features a DNA token was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintMetadata {
    /// Hex-encoded perceptual hash
    pub perceptual_hash: String,
    /// Dominant colors in extraction order
    pub color_palette: Vec<Rgb>,
    pub width: u32,
    pub height: u32,
    pub mime_type: MimeType,
    pub brand_rule_version: String,
}

/// A registered creative.
///
/// Everything except `status` and `revoked_at` is fixed at issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    /// 64-char hex DNA token, the registry key
    pub dna: String,
    /// Unique id assigned at issuance
    pub certificate_id: Uuid,
    pub metadata: FingerprintMetadata,
    /// Compliance of the original asset
    pub compliance: ComplianceSummary,
    pub status: CertificateStatus,
    /// Upload name, informational only
    pub filename: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    /// Public link to the by-token verification page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_url: Option<String>,
}

impl Certificate {
    pub fn is_revoked(&self) -> bool {
        self.status == CertificateStatus::Revoked
    }

    /// Mark the certificate revoked.
    ///
    /// `revoked_at` keeps the time of the first revocation. Returns `true`
    /// when this call performed the transition.
    pub fn revoke(&mut self, at: DateTime<Utc>) -> bool {
        let first = !self.is_revoked();
        self.status = CertificateStatus::Revoked;
        if self.revoked_at.is_none() {
            self.revoked_at = Some(at);
        }
        first
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_mime_type_parse() {
        assert_eq!(MimeType::parse("image/jpeg").unwrap(), MimeType::Jpeg);
        assert_eq!(MimeType::parse(" IMAGE/PNG ").unwrap(), MimeType::Png);
        assert!(MimeType::parse("image/gif").is_err());
        assert!(MimeType::parse("").is_err());
    }

    #[test]
    fn test_mime_type_serialization() {
        assert_eq!(serde_json::to_string(&MimeType::Jpeg).unwrap(), "\"image/jpeg\"");
        let parsed: MimeType = serde_json::from_str("\"image/png\"").unwrap();
        assert_eq!(parsed, MimeType::Png);
    }

    #[test]
    fn test_revoke_keeps_first_timestamp() {
        let mut cert = fixtures::certificate(&"a".repeat(64), "00");
        let first = Utc::now();
        let later = first + Duration::seconds(30);

        assert!(cert.revoke(first));
        assert!(cert.is_revoked());
        assert_eq!(cert.revoked_at, Some(first));

        assert!(!cert.revoke(later));
        assert_eq!(cert.revoked_at, Some(first));
    }

    #[test]
    fn test_certificate_json_shape() {
        let cert = fixtures::certificate(&"b".repeat(64), "ff");
        let json = serde_json::to_value(&cert).unwrap();
        assert_eq!(json["status"], "approved");
        assert_eq!(json["metadata"]["mime_type"], "image/png");
        assert_eq!(json["metadata"]["color_palette"][0], serde_json::json!([0, 83, 159]));
        assert!(json.get("revoked_at").is_none());
    }
}
