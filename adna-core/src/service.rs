//! Fingerprint service: issuance, verification, revocation and stats.
//!
//! [`FingerprintService`] wires a [`FeatureExtractor`], a
//! [`FingerprintRegistry`] and one [`BrandRules`] instance together. The
//! same rules are used for issuance and verification, so stored and current
//! compliance verdicts are always comparable.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::certificate::{Certificate, CertificateStatus, FingerprintMetadata, MimeType};
use crate::compliance::BrandRules;
use crate::dna::{derive, is_dna_token};
use crate::error::{AdnaError, Result};
use crate::extract::{Deadline, ExtractionError, FeatureExtractor, ImageFeatures};
use crate::registry::FingerprintRegistry;
use crate::verify::{VerificationEngine, VerificationPolicy, VerificationResult};

/// Default upper bound on a single feature extraction.
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Registry-wide statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_approved: u64,
    pub total_revoked: u64,
    pub total_verifications: u64,
    pub total_tamper_flags: u64,
}

/// Features and DNA of one presented image.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    pub dna: String,
    pub mime_type: MimeType,
    pub features: ImageFeatures,
}

pub struct FingerprintService {
    registry: Arc<dyn FingerprintRegistry>,
    extractor: Arc<dyn FeatureExtractor>,
    rules: Arc<BrandRules>,
    engine: VerificationEngine,
    extraction_timeout: Duration,
    public_verify_url: Option<String>,
}

impl FingerprintService {
    /// Service with default brand rules, thresholds and timeout.
    pub fn new(
        registry: Arc<dyn FingerprintRegistry>,
        extractor: Arc<dyn FeatureExtractor>,
    ) -> Self {
        let rules = Arc::new(BrandRules::default());
        Self {
            engine: VerificationEngine::new(registry.clone(), rules.clone()),
            registry,
            extractor,
            rules,
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
            public_verify_url: None,
        }
    }

    pub fn with_rules(mut self, rules: BrandRules) -> Self {
        let policy = self.engine.policy();
        self.rules = Arc::new(rules);
        self.engine =
            VerificationEngine::new(self.registry.clone(), self.rules.clone()).with_policy(policy);
        self
    }

    pub fn with_policy(mut self, policy: VerificationPolicy) -> Self {
        self.engine = self.engine.with_policy(policy);
        self
    }

    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = timeout;
        self
    }

    /// Base URL used to build each certificate's `verify_url`.
    pub fn with_public_verify_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.public_verify_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    pub fn rules(&self) -> &BrandRules {
        &self.rules
    }

    pub fn registry(&self) -> &Arc<dyn FingerprintRegistry> {
        &self.registry
    }

    /// Validate input, extract features and derive the DNA token.
    ///
    /// Touches neither the registry nor the counters.
    pub async fn fingerprint(&self, bytes: Vec<u8>, mime_type: &str) -> Result<Fingerprint> {
        let mime_type = MimeType::parse(mime_type)?;
        if bytes.is_empty() {
            return Err(AdnaError::InvalidInput("empty image".into()));
        }

        let features = self.extract(bytes).await?;
        let dna = derive(
            &features.perceptual_hash,
            &features.palette,
            features.width,
            features.height,
            mime_type.as_str(),
            &self.rules.version,
        );

        debug!(
            dna = %dna,
            width = features.width,
            height = features.height,
            colors = features.palette.len(),
            text_regions = features.text_regions.len(),
            "Derived fingerprint"
        );

        Ok(Fingerprint {
            dna,
            mime_type,
            features,
        })
    }

    /// Run the extractor on the blocking pool.
    ///
    /// The extractor receives the same deadline the caller waits on, so an
    /// abandoned job stops at its next checkpoint instead of holding a
    /// blocking thread until it finishes.
    async fn extract(&self, bytes: Vec<u8>) -> Result<ImageFeatures> {
        let extractor = self.extractor.clone();
        let deadline = Deadline::after(self.extraction_timeout);
        let task = tokio::task::spawn_blocking(move || extractor.extract(&bytes, &deadline));

        let result = match tokio::time::timeout(self.extraction_timeout, task).await {
            Ok(Ok(features)) => features,
            Ok(Err(join_err)) => Err(ExtractionError::Worker(join_err.to_string())),
            Err(_) => Err(ExtractionError::Timeout(self.extraction_timeout)),
        };

        if let Err(ExtractionError::Timeout(budget)) = &result {
            warn!(timeout_ms = budget.as_millis() as u64, "Feature extraction timed out");
        }
        Ok(result?)
    }

    /// Register a creative and return its certificate.
    ///
    /// Re-issuing identical content overwrites the previous certificate.
    pub async fn issue(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<Certificate> {
        let Fingerprint {
            dna,
            mime_type,
            features,
        } = self.fingerprint(bytes, mime_type).await?;

        let compliance = self.rules.evaluate(&features);
        let verify_url = self
            .public_verify_url
            .as_ref()
            .map(|base| format!("{base}/verify?dna={dna}"));

        let certificate = Certificate {
            dna,
            certificate_id: Uuid::new_v4(),
            metadata: FingerprintMetadata {
                perceptual_hash: features.perceptual_hash,
                color_palette: features.palette,
                width: features.width,
                height: features.height,
                mime_type,
                brand_rule_version: self.rules.version.clone(),
            },
            compliance,
            status: CertificateStatus::Approved,
            filename: filename.to_string(),
            created_at: Utc::now(),
            revoked_at: None,
            verify_url,
        };

        self.registry.put(certificate.clone()).await?;

        info!(
            dna = %certificate.dna,
            certificate_id = %certificate.certificate_id,
            filename = %certificate.filename,
            color_rule = %certificate.compliance.color_rule,
            safe_zone = %certificate.compliance.safe_zone,
            "Issued certificate"
        );

        Ok(certificate)
    }

    /// Classify a presented image against the registry.
    ///
    /// Validation and extraction failures return before any counter moves.
    pub async fn verify(&self, bytes: Vec<u8>, mime_type: &str) -> Result<VerificationResult> {
        let Fingerprint { dna, features, .. } = self.fingerprint(bytes, mime_type).await?;
        let result = self.engine.classify(dna, &features).await?;

        info!(
            dna = %result.candidate_dna,
            status = %result.status,
            dna_match = result.dna_match,
            "Verified creative"
        );

        Ok(result)
    }

    /// Look up a DNA token directly.
    pub async fn verify_dna(&self, dna: &str) -> Result<VerificationResult> {
        let dna = dna.trim();
        if !is_dna_token(dna) {
            return Err(AdnaError::InvalidDna(dna.to_string()));
        }

        let result = self.engine.lookup(dna.to_ascii_lowercase()).await?;
        info!(dna = %result.candidate_dna, status = %result.status, "Verified DNA token");
        Ok(result)
    }

    /// Revoke a certificate. `Ok(false)` for unknown tokens.
    pub async fn revoke(&self, dna: &str) -> Result<bool> {
        let dna = dna.trim().to_ascii_lowercase();
        let revoked = self.registry.revoke(&dna, Utc::now()).await?;

        if revoked {
            info!(dna = %dna, "Revoked certificate");
        } else {
            debug!(dna = %dna, "Revoke requested for unknown DNA");
        }

        Ok(revoked)
    }

    /// Certificate totals from one snapshot, plus the counters.
    pub async fn stats(&self) -> Result<RegistryStats> {
        let snapshot = self.registry.all().await?;
        let counters = self.registry.counters().await?;

        let total_revoked = snapshot.iter().filter(|c| c.is_revoked()).count() as u64;

        Ok(RegistryStats {
            total_approved: snapshot.len() as u64 - total_revoked,
            total_revoked,
            total_verifications: counters.verifications,
            total_tamper_flags: counters.tamper_flags,
        })
    }
}

impl std::fmt::Debug for FingerprintService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FingerprintService")
            .field("rules", &self.rules)
            .field("policy", &self.engine.policy())
            .field("extraction_timeout", &self.extraction_timeout)
            .field("public_verify_url", &self.public_verify_url)
            .finish_non_exhaustive()
    }
}
