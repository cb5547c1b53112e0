//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::net::{Ipv4Addr, SocketAddr};

use adna_core::compliance::{parse_brand_colors, DEFAULT_BRAND_COLORS, DEFAULT_BRAND_RULE_VERSION};
use adna_core::{BrandRules, Rgb};

/// Text detector used by the default feature extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDetectorKind {
    /// Local-contrast heuristic
    Contrast,
    /// Never detects text; safe-zone checks always pass
    None,
}

impl TextDetectorKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "contrast" => Some(Self::Contrast),
            "none" | "off" => Some(Self::None),
            _ => None,
        }
    }
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Allowed CORS origins, comma-separated (default: allow all in dev)
    pub allowed_origins: Option<Vec<String>>,
    /// Request body limit in MB (default: 20)
    pub body_limit_mb: usize,
    /// Maximum file size per upload in MB (default: 10)
    pub max_file_size_mb: usize,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Upper bound on a single feature extraction in seconds (default: 10)
    pub extraction_timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 20)
    pub rate_limit_burst: u32,
    /// Base URL embedded in each certificate's verify link
    pub public_verify_url: Option<String>,
    /// Brand rule version tag (default: v1)
    pub brand_rule_version: String,
    /// Reference brand colors
    pub brand_colors: Vec<Rgb>,
    pub text_detector: TextDetectorKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: [127, 0, 0, 1],
            allowed_origins: None, // None = allow all (dev mode)
            body_limit_mb: 20,
            max_file_size_mb: 10,
            timeout_secs: 30,
            extraction_timeout_secs: 10,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
            public_verify_url: None,
            brand_rule_version: DEFAULT_BRAND_RULE_VERSION.to_string(),
            brand_colors: DEFAULT_BRAND_COLORS.to_vec(),
            text_detector: TextDetectorKind::Contrast,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("HOST")
            .ok()
            .and_then(|h| h.trim().parse::<Ipv4Addr>().ok())
            .map(|addr| addr.octets())
            .unwrap_or(defaults.host);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS").ok().map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Rate limiting enabled by default in production, can be disabled with RATE_LIMIT_ENABLED=false
        let rate_limit_enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let public_verify_url = std::env::var("PUBLIC_VERIFY_URL")
            .ok()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        let brand_colors = match std::env::var("BRAND_COLORS") {
            Ok(raw) => parse_brand_colors(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Ignoring invalid BRAND_COLORS, using defaults");
                defaults.brand_colors.clone()
            }),
            Err(_) => defaults.brand_colors.clone(),
        };

        let text_detector = match std::env::var("TEXT_DETECTOR") {
            Ok(raw) => TextDetectorKind::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unknown TEXT_DETECTOR, using contrast");
                TextDetectorKind::Contrast
            }),
            Err(_) => defaults.text_detector,
        };

        Self {
            port: env_parse("PORT").unwrap_or(defaults.port),
            host,
            allowed_origins,
            body_limit_mb: env_parse("BODY_LIMIT_MB").unwrap_or(defaults.body_limit_mb),
            max_file_size_mb: env_parse("MAX_FILE_SIZE_MB").unwrap_or(defaults.max_file_size_mb),
            timeout_secs: env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(defaults.timeout_secs),
            extraction_timeout_secs: env_parse("EXTRACTION_TIMEOUT_SECS")
                .unwrap_or(defaults.extraction_timeout_secs),
            rate_limit_enabled,
            rate_limit_per_sec: env_parse("RATE_LIMIT_PER_SEC")
                .unwrap_or(defaults.rate_limit_per_sec),
            rate_limit_burst: env_parse("RATE_LIMIT_BURST").unwrap_or(defaults.rate_limit_burst),
            public_verify_url,
            brand_rule_version: std::env::var("BRAND_RULE_VERSION")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.brand_rule_version),
            brand_colors,
            text_detector,
        }
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    /// Maximum accepted upload size in bytes
    pub fn max_file_size(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Brand rule set built from the configured version and colors
    pub fn brand_rules(&self) -> BrandRules {
        BrandRules::new(self.brand_rule_version.clone(), self.brand_colors.clone())
    }
}
