//! Tamper classification.
//!
//! Given the features and DNA of a presented image, the engine decides
//! between four terminal outcomes:
//!
//! | Outcome        | Condition                                                   |
//! |----------------|-------------------------------------------------------------|
//! | `REVOKED`      | exact DNA match, certificate revoked                        |
//! | `VALID`        | exact DNA match, hash within threshold, compliance unchanged |
//! | `TAMPERED`     | exact match that drifted, or nearest hash within 10         |
//! | `UNREGISTERED` | nothing close enough in the registry                        |
//!
//! The verification counter is bumped before classification starts; the
//! tamper-flag counter is bumped on every `TAMPERED` outcome.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::certificate::Certificate;
use crate::compliance::{BrandRules, ComplianceSummary};
use crate::dna::hamming_distance;
use crate::error::Result;
use crate::extract::{ImageFeatures, Rgb};
use crate::registry::FingerprintRegistry;

/// Max hash distance for an exact DNA match to still count as `VALID`.
pub const DEFAULT_PHASH_THRESHOLD: u32 = 5;

/// Max hash distance for a non-matching image to count as a near-duplicate.
pub const DEFAULT_NEAR_DUPLICATE_THRESHOLD: u32 = 10;

/// Terminal verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Valid,
    Tampered,
    Unregistered,
    Revoked,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => write!(f, "VALID"),
            Self::Tampered => write!(f, "TAMPERED"),
            Self::Unregistered => write!(f, "UNREGISTERED"),
            Self::Revoked => write!(f, "REVOKED"),
        }
    }
}

/// How the presented image differs from the stored original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Hamming distance between perceptual hashes
    pub phash_distance: u32,
    pub color_rule_changed: bool,
    pub safe_zone_changed: bool,
    /// Mean RGB distance over index-aligned palette entries, 2 decimals
    pub dominant_color_deviation: f64,
}

/// Result of one verification call. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub status: VerificationStatus,
    /// Whether the candidate DNA exactly matched a registry entry
    pub dna_match: bool,
    /// DNA derived from the presented image (or the token looked up)
    pub candidate_dna: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_compliance: Option<ComplianceSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_compliance: Option<ComplianceSummary>,
    /// Exact match, or the presumed original of a near-duplicate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_certificate: Option<Certificate>,
    pub verified_at: DateTime<Utc>,
}

impl VerificationResult {
    fn unregistered(candidate_dna: String) -> Self {
        Self {
            status: VerificationStatus::Unregistered,
            dna_match: false,
            candidate_dna,
            delta: None,
            stored_compliance: None,
            current_compliance: None,
            stored_certificate: None,
            verified_at: Utc::now(),
        }
    }

    fn revoked(candidate_dna: String, certificate: Certificate) -> Self {
        Self {
            status: VerificationStatus::Revoked,
            dna_match: true,
            candidate_dna,
            delta: None,
            stored_compliance: Some(certificate.compliance.clone()),
            current_compliance: None,
            stored_certificate: Some(certificate),
            verified_at: Utc::now(),
        }
    }
}

/// Distance thresholds used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationPolicy {
    pub phash_threshold: u32,
    pub near_duplicate_threshold: u32,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            phash_threshold: DEFAULT_PHASH_THRESHOLD,
            near_duplicate_threshold: DEFAULT_NEAR_DUPLICATE_THRESHOLD,
        }
    }
}

/// Mean Euclidean distance between index-aligned palette entries.
///
/// Only the first `min(len)` entries are paired. Rounded to two decimals;
/// `0.0` when either palette is empty.
pub fn color_deviation(current: &[Rgb], stored: &[Rgb]) -> f64 {
    let pairs = current.len().min(stored.len());
    if pairs == 0 {
        return 0.0;
    }

    let total: f64 = current
        .iter()
        .zip(stored.iter())
        .map(|(a, b)| a.distance(*b))
        .sum();

    (total / pairs as f64 * 100.0).round() / 100.0
}

/// Certificate whose perceptual hash is closest to `perceptual_hash`.
///
/// Ties go to the first entry in iteration order.
pub fn nearest_by_hash<'a>(
    perceptual_hash: &str,
    entries: &'a [Certificate],
) -> Option<(&'a Certificate, u32)> {
    let mut best: Option<(&Certificate, u32)> = None;
    for entry in entries {
        let distance = hamming_distance(perceptual_hash, &entry.metadata.perceptual_hash);
        match best {
            Some((_, closest)) if distance >= closest => {}
            _ => best = Some((entry, distance)),
        }
    }
    best
}

/// Delta between a presented image and a stored certificate.
pub fn compute_delta(
    features: &ImageFeatures,
    current: &ComplianceSummary,
    stored: &Certificate,
) -> Delta {
    Delta {
        phash_distance: hamming_distance(
            &features.perceptual_hash,
            &stored.metadata.perceptual_hash,
        ),
        color_rule_changed: current.color_rule != stored.compliance.color_rule,
        safe_zone_changed: current.safe_zone != stored.compliance.safe_zone,
        dominant_color_deviation: color_deviation(&features.palette, &stored.metadata.color_palette),
    }
}

/// Classifies candidates against a registry.
#[derive(Clone)]
pub struct VerificationEngine {
    registry: Arc<dyn FingerprintRegistry>,
    rules: Arc<BrandRules>,
    policy: VerificationPolicy,
}

impl VerificationEngine {
    pub fn new(registry: Arc<dyn FingerprintRegistry>, rules: Arc<BrandRules>) -> Self {
        Self {
            registry,
            rules,
            policy: VerificationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: VerificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> VerificationPolicy {
        self.policy
    }

    /// Classify an image whose features and DNA were already computed.
    ///
    /// Counts as one verification attempt regardless of the outcome.
    pub async fn classify(
        &self,
        candidate_dna: String,
        features: &ImageFeatures,
    ) -> Result<VerificationResult> {
        self.registry.increment_verification().await?;

        let Some(stored) = self.registry.get(&candidate_dna).await? else {
            return self.classify_unmatched(candidate_dna, features).await;
        };

        if stored.is_revoked() {
            info!(dna = %candidate_dna, "Verified revoked creative");
            return Ok(VerificationResult::revoked(candidate_dna, stored));
        }

        let current = self.rules.evaluate(features);
        let delta = compute_delta(features, &current, &stored);

        let status = if delta.phash_distance <= self.policy.phash_threshold
            && !delta.color_rule_changed
            && !delta.safe_zone_changed
        {
            VerificationStatus::Valid
        } else {
            // Only reachable when the stored metadata disagrees with the
            // features its DNA was derived from.
            self.registry.increment_tamper_flag().await?;
            warn!(
                dna = %candidate_dna,
                phash_distance = delta.phash_distance,
                color_rule_changed = delta.color_rule_changed,
                safe_zone_changed = delta.safe_zone_changed,
                "Exact DNA match flagged as tampered"
            );
            VerificationStatus::Tampered
        };

        Ok(VerificationResult {
            status,
            dna_match: true,
            candidate_dna,
            delta: Some(delta),
            stored_compliance: Some(stored.compliance.clone()),
            current_compliance: Some(current),
            stored_certificate: Some(stored),
            verified_at: Utc::now(),
        })
    }

    async fn classify_unmatched(
        &self,
        candidate_dna: String,
        features: &ImageFeatures,
    ) -> Result<VerificationResult> {
        let snapshot = self.registry.all().await?;

        let nearest = nearest_by_hash(&features.perceptual_hash, &snapshot)
            .filter(|(_, distance)| *distance <= self.policy.near_duplicate_threshold);

        let Some((original, distance)) = nearest else {
            info!(dna = %candidate_dna, entries = snapshot.len(), "No registered original found");
            return Ok(VerificationResult::unregistered(candidate_dna));
        };

        self.registry.increment_tamper_flag().await?;

        let current = self.rules.evaluate(features);
        let delta = compute_delta(features, &current, original);

        warn!(
            dna = %candidate_dna,
            original = %original.dna,
            phash_distance = distance,
            dominant_color_deviation = delta.dominant_color_deviation,
            "Near-duplicate of registered creative"
        );

        Ok(VerificationResult {
            status: VerificationStatus::Tampered,
            dna_match: false,
            candidate_dna,
            delta: Some(delta),
            stored_compliance: Some(original.compliance.clone()),
            current_compliance: Some(current),
            stored_certificate: Some(original.clone()),
            verified_at: Utc::now(),
        })
    }

    /// Look up a DNA token without presenting an image.
    ///
    /// Counts as one verification attempt. Approved entries are `VALID`
    /// with no delta, since there is nothing to compare against.
    pub async fn lookup(&self, dna: String) -> Result<VerificationResult> {
        self.registry.increment_verification().await?;

        let Some(stored) = self.registry.get(&dna).await? else {
            return Ok(VerificationResult::unregistered(dna));
        };

        if stored.is_revoked() {
            return Ok(VerificationResult::revoked(dna, stored));
        }

        Ok(VerificationResult {
            status: VerificationStatus::Valid,
            dna_match: true,
            candidate_dna: dna,
            delta: None,
            stored_compliance: Some(stored.compliance.clone()),
            current_compliance: None,
            stored_certificate: Some(stored),
            verified_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for VerificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationEngine")
            .field("rules", &self.rules)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
