//! Fingerprint command: local DNA derivation and compliance, no registry.

use std::path::PathBuf;
use std::sync::Arc;

use adna_core::compliance::{parse_brand_colors, DEFAULT_BRAND_COLORS};
use adna_core::{
    BrandRules, FingerprintService, ImageFeatureExtractor, InMemoryRegistry, NoTextDetector,
};
use anyhow::Result;
use colored::{Color, Colorize};
use tracing::debug;

use crate::exit_codes::InputError;
use crate::utils::{format_palette, print_banner, print_compliance, print_json, read_creative};
use crate::GlobalOpts;

/// Execute the fingerprint command.
pub async fn execute(
    file: PathBuf,
    rule_version: String,
    brand_colors: Option<String>,
    no_text_detection: bool,
    opts: &GlobalOpts,
) -> Result<()> {
    let brand_colors = match brand_colors {
        Some(raw) => parse_brand_colors(&raw)
            .ok_or_else(|| InputError(format!("Invalid brand colors: {}", raw)))?,
        None => DEFAULT_BRAND_COLORS.to_vec(),
    };
    let creative = read_creative(&file)?;

    let extractor = if no_text_detection {
        ImageFeatureExtractor::with_text_detector(Arc::new(NoTextDetector))
    } else {
        ImageFeatureExtractor::new()
    };
    let service = FingerprintService::new(Arc::new(InMemoryRegistry::new()), Arc::new(extractor))
        .with_rules(BrandRules::new(rule_version, brand_colors));

    let fingerprint = service.fingerprint(creative.data, creative.mime_type).await?;
    let compliance = service.rules().evaluate(&fingerprint.features);
    let features = &fingerprint.features;

    debug!(dna = %fingerprint.dna, "Computed fingerprint");

    if opts.json {
        return print_json(&serde_json::json!({
            "dna": fingerprint.dna,
            "mime_type": fingerprint.mime_type,
            "brand_rule_version": service.rules().version,
            "perceptual_hash": features.perceptual_hash,
            "color_palette": features.palette,
            "width": features.width,
            "height": features.height,
            "text_regions": features.text_regions,
            "compliance": compliance,
        }));
    }

    if !opts.quiet {
        print_banner("FINGERPRINT", Color::Cyan);
        println!("   {} {}", "File:".dimmed(), file.display());
        println!("   {} {}", "DNA:".dimmed(), fingerprint.dna.bold());
        println!(
            "   {} {}x{} {}",
            "Image:".dimmed(),
            features.width,
            features.height,
            fingerprint.mime_type
        );
        println!("   {} {}", "Perceptual hash:".dimmed(), features.perceptual_hash);
        println!("   {} {}", "Palette:".dimmed(), format_palette(&features.palette));
        println!("   {} {}", "Text regions:".dimmed(), features.text_regions.len());
        print_compliance("Compliance", &compliance);
    }

    Ok(())
}
