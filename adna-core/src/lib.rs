//! Ad-creative DNA core library
//!
//! Issues and verifies tamper-evident fingerprints ("DNA") for advertising
//! creative images. A viewer can tell whether a displayed creative is the
//! exact registered asset, a modified derivative of one, never registered,
//! or registered but revoked.
//!
//! # Pipeline
//!
//! ```text
//! bytes -> FeatureExtractor -> {hash, palette, dims} -> dna::derive -> DNA
//!                           -> {palette, text, dims} -> BrandRules  -> compliance
//! ```
//!
//! Issuance stores the DNA, compliance and metadata as a [`Certificate`].
//! Verification repeats the derivation and classifies the result against
//! the [`FingerprintRegistry`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use adna_core::{FingerprintService, ImageFeatureExtractor, InMemoryRegistry};
//!
//! # async fn example() -> adna_core::Result<()> {
//! let service = FingerprintService::new(
//!     Arc::new(InMemoryRegistry::new()),
//!     Arc::new(ImageFeatureExtractor::new()),
//! );
//!
//! let bytes = std::fs::read("banner.png").unwrap();
//! let certificate = service.issue("banner.png", bytes.clone(), "image/png").await?;
//!
//! let result = service.verify(bytes, "image/png").await?;
//! println!("{} -> {}", certificate.dna, result.status);
//! # Ok(())
//! # }
//! ```

pub mod certificate;
pub mod compliance;
pub mod dna;
pub mod error;
pub mod extract;
pub mod registry;
pub mod service;
pub mod verify;

pub use certificate::{Certificate, CertificateStatus, FingerprintMetadata, MimeType};
pub use compliance::{BrandRules, ComplianceLevel, ComplianceSummary};
pub use error::{AdnaError, Result};
pub use extract::{Deadline, ExtractionError, FeatureExtractor, ImageFeatures, Rgb, TextRegion};
pub use registry::{FingerprintRegistry, InMemoryRegistry, RegistryCounters, RegistryError};
pub use service::{Fingerprint, FingerprintService, RegistryStats};
pub use verify::{Delta, VerificationPolicy, VerificationResult, VerificationStatus};

#[cfg(feature = "image-features")]
pub use extract::{ContrastTextDetector, ImageFeatureExtractor, NoTextDetector, TextDetector};
