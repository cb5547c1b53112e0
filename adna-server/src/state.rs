//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;
use std::time::Duration;

use adna_core::{
    ContrastTextDetector, FeatureExtractor, FingerprintRegistry, FingerprintService,
    ImageFeatureExtractor, InMemoryRegistry, NoTextDetector, TextDetector,
};

use crate::config::{Config, TextDetectorKind};

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Issue/verify/revoke service
    pub service: Arc<FingerprintService>,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
}

impl AppState {
    /// State backed by a fresh in-memory registry and the default extractor.
    pub fn from_config(config: &Config) -> Self {
        Self::with_registry(config, Arc::new(InMemoryRegistry::new()))
    }

    /// State backed by the given registry.
    pub fn with_registry(config: &Config, registry: Arc<dyn FingerprintRegistry>) -> Self {
        let detector: Arc<dyn TextDetector> = match config.text_detector {
            TextDetectorKind::Contrast => Arc::new(ContrastTextDetector::default()),
            TextDetectorKind::None => Arc::new(NoTextDetector),
        };
        let extractor: Arc<dyn FeatureExtractor> =
            Arc::new(ImageFeatureExtractor::with_text_detector(detector));

        let mut service = FingerprintService::new(registry, extractor)
            .with_rules(config.brand_rules())
            .with_extraction_timeout(Duration::from_secs(config.extraction_timeout_secs));
        if let Some(url) = &config.public_verify_url {
            service = service.with_public_verify_url(url.clone());
        }

        Self {
            service: Arc::new(service),
            max_file_size: config.max_file_size(),
        }
    }
}
