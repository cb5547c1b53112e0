//! Brand compliance evaluation.
//!
//! Two independent rules, each graded PASS / WARN / FAIL:
//!
//! - **Color rule**: is a brand color present in the dominant palette?
//! - **Safe zone**: does detected text keep clear of the image edges?
//!
//! The same [`BrandRules`] must be used at issuance and at verification,
//! otherwise stored and current verdicts are not comparable.

use serde::{Deserialize, Serialize};

use crate::extract::{ImageFeatures, Rgb, TextRegion};

/// Default brand rule version tag, mixed into every DNA token.
pub const DEFAULT_BRAND_RULE_VERSION: &str = "v1";

/// Reference brand colors used by the default rules.
pub const DEFAULT_BRAND_COLORS: [Rgb; 3] = [Rgb(0, 83, 159), Rgb(237, 28, 36), Rgb(255, 255, 255)];

/// Three-level compliance verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComplianceLevel {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Warn => write!(f, "WARN"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Result of a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub level: ComplianceLevel,
    pub notes: Vec<String>,
}

impl RuleOutcome {
    fn new(level: ComplianceLevel, note: &str) -> Self {
        Self {
            level,
            notes: vec![note.to_string()],
        }
    }
}

/// Combined verdict of both rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub color_rule: ComplianceLevel,
    pub safe_zone: ComplianceLevel,
    /// Color-rule notes first, then safe-zone notes
    pub notes: Vec<String>,
}

/// Brand rule set: reference colors, thresholds and version tag.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandRules {
    /// Version tag mixed into DNA tokens
    pub version: String,
    /// Reference brand colors
    pub brand_colors: Vec<Rgb>,
    /// Maximum brand-color distance still graded PASS (inclusive)
    pub color_pass_max: f64,
    /// Maximum brand-color distance still graded WARN (inclusive)
    pub color_warn_max: f64,
    /// Minimum text margin in pixels graded PASS (inclusive)
    pub safe_zone_pass_min: i64,
    /// Minimum text margin in pixels graded WARN (inclusive)
    pub safe_zone_warn_min: i64,
}

impl Default for BrandRules {
    fn default() -> Self {
        Self {
            version: DEFAULT_BRAND_RULE_VERSION.to_string(),
            brand_colors: DEFAULT_BRAND_COLORS.to_vec(),
            color_pass_max: 40.0,
            color_warn_max: 80.0,
            safe_zone_pass_min: 20,
            safe_zone_warn_min: 10,
        }
    }
}

impl BrandRules {
    /// Default thresholds with a custom version tag and brand colors.
    pub fn new(version: impl Into<String>, brand_colors: Vec<Rgb>) -> Self {
        Self {
            version: version.into(),
            brand_colors,
            ..Self::default()
        }
    }

    /// Minimum distance over all (palette, brand) pairs.
    ///
    /// `f64::INFINITY` when either side is empty.
    pub fn min_brand_distance(&self, palette: &[Rgb]) -> f64 {
        palette
            .iter()
            .flat_map(|color| self.brand_colors.iter().map(move |brand| color.distance(*brand)))
            .fold(f64::INFINITY, f64::min)
    }

    /// Grade a brand-color distance. Boundaries belong to the stricter bucket.
    pub fn classify_color_distance(&self, distance: f64) -> RuleOutcome {
        if distance <= self.color_pass_max {
            RuleOutcome::new(ComplianceLevel::Pass, "Brand color strongly present")
        } else if distance <= self.color_warn_max {
            RuleOutcome::new(ComplianceLevel::Warn, "Brand color weak / subtle")
        } else {
            RuleOutcome::new(ComplianceLevel::Fail, "No brand color detected")
        }
    }

    pub fn check_color_rule(&self, palette: &[Rgb]) -> RuleOutcome {
        self.classify_color_distance(self.min_brand_distance(palette))
    }

    /// Grade the smallest text margin; `None` means no text was detected.
    pub fn classify_text_margin(&self, margin: Option<i64>) -> RuleOutcome {
        match margin {
            None => RuleOutcome::new(ComplianceLevel::Pass, "No text detected"),
            Some(m) if m >= self.safe_zone_pass_min => {
                RuleOutcome::new(ComplianceLevel::Pass, "Comfortable safe zone")
            }
            Some(m) if m >= self.safe_zone_warn_min => {
                RuleOutcome::new(ComplianceLevel::Warn, "Text close to edge")
            }
            Some(_) => RuleOutcome::new(ComplianceLevel::Fail, "Text too close to edge"),
        }
    }

    pub fn check_safe_zone(&self, regions: &[TextRegion], width: u32, height: u32) -> RuleOutcome {
        self.classify_text_margin(min_text_margin(regions, width, height))
    }

    /// Evaluate both rules against extracted features.
    pub fn evaluate(&self, features: &ImageFeatures) -> ComplianceSummary {
        let color = self.check_color_rule(&features.palette);
        let safe_zone =
            self.check_safe_zone(&features.text_regions, features.width, features.height);

        let mut notes = color.notes;
        notes.extend(safe_zone.notes);

        ComplianceSummary {
            color_rule: color.level,
            safe_zone: safe_zone.level,
            notes,
        }
    }
}

/// Smallest edge margin across all text regions, `None` without text.
pub fn min_text_margin(regions: &[TextRegion], width: u32, height: u32) -> Option<i64> {
    regions
        .iter()
        .map(|region| region.min_edge_margin(width, height))
        .min()
}

/// Parse a comma-separated list of hex colors, e.g. `00539f,#ed1c24`.
///
/// Returns `None` if any entry is malformed or the list is empty.
pub fn parse_brand_colors(raw: &str) -> Option<Vec<Rgb>> {
    let colors: Option<Vec<Rgb>> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Rgb::from_hex)
        .collect();

    colors.filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(palette: Vec<Rgb>, text_regions: Vec<TextRegion>) -> ImageFeatures {
        ImageFeatures {
            perceptual_hash: "00".into(),
            palette,
            width: 200,
            height: 100,
            text_regions,
        }
    }

    #[test]
    fn test_color_thresholds() {
        let rules = BrandRules::default();
        assert_eq!(rules.classify_color_distance(0.0).level, ComplianceLevel::Pass);
        assert_eq!(rules.classify_color_distance(40.0).level, ComplianceLevel::Pass);
        assert_eq!(rules.classify_color_distance(40.01).level, ComplianceLevel::Warn);
        assert_eq!(rules.classify_color_distance(80.0).level, ComplianceLevel::Warn);
        assert_eq!(rules.classify_color_distance(80.01).level, ComplianceLevel::Fail);
    }

    #[test]
    fn test_color_rule_from_palette_boundaries() {
        let rules = BrandRules::default();
        // 40 away from brand blue
        assert_eq!(rules.check_color_rule(&[Rgb(0, 83, 199)]).level, ComplianceLevel::Pass);
        // 80 away from brand blue
        assert_eq!(rules.check_color_rule(&[Rgb(0, 83, 239)]).level, ComplianceLevel::Warn);
        // 81 away from brand blue
        assert_eq!(rules.check_color_rule(&[Rgb(0, 83, 240)]).level, ComplianceLevel::Fail);
    }

    #[test]
    fn test_color_rule_uses_closest_pair() {
        let rules = BrandRules::default();
        let outcome = rules.check_color_rule(&[Rgb(10, 200, 10), Rgb(250, 250, 250)]);
        assert_eq!(outcome.level, ComplianceLevel::Pass);
        assert_eq!(outcome.notes, vec!["Brand color strongly present"]);
    }

    #[test]
    fn test_empty_palette_fails() {
        let rules = BrandRules::default();
        assert_eq!(rules.min_brand_distance(&[]), f64::INFINITY);
        assert_eq!(rules.check_color_rule(&[]).level, ComplianceLevel::Fail);
    }

    #[test]
    fn test_no_brand_colors_fails() {
        let rules = BrandRules::new("v2", Vec::new());
        assert_eq!(rules.check_color_rule(&[Rgb(0, 83, 159)]).level, ComplianceLevel::Fail);
    }

    #[test]
    fn test_safe_zone_no_text() {
        let outcome = BrandRules::default().check_safe_zone(&[], 100, 100);
        assert_eq!(outcome.level, ComplianceLevel::Pass);
        assert_eq!(outcome.notes, vec!["No text detected"]);
    }

    #[test]
    fn test_safe_zone_thresholds() {
        let rules = BrandRules::default();
        assert_eq!(rules.classify_text_margin(Some(20)).level, ComplianceLevel::Pass);
        assert_eq!(rules.classify_text_margin(Some(19)).level, ComplianceLevel::Warn);
        assert_eq!(rules.classify_text_margin(Some(10)).level, ComplianceLevel::Warn);
        assert_eq!(rules.classify_text_margin(Some(9)).level, ComplianceLevel::Fail);
        assert_eq!(rules.classify_text_margin(Some(-5)).level, ComplianceLevel::Fail);
    }

    #[test]
    fn test_safe_zone_takes_worst_box() {
        let regions = [TextRegion::new(50, 50, 60, 60), TextRegion::new(12, 40, 30, 50)];
        assert_eq!(min_text_margin(&regions, 100, 100), Some(12));
        let outcome = BrandRules::default().check_safe_zone(&regions, 100, 100);
        assert_eq!(outcome.level, ComplianceLevel::Warn);
        assert_eq!(outcome.notes, vec!["Text close to edge"]);
    }

    #[test]
    fn test_evaluate_note_order() {
        let summary = BrandRules::default().evaluate(&features(
            vec![Rgb(120, 120, 120)],
            vec![TextRegion::new(2, 2, 50, 20)],
        ));
        assert_eq!(summary.color_rule, ComplianceLevel::Fail);
        assert_eq!(summary.safe_zone, ComplianceLevel::Fail);
        assert_eq!(
            summary.notes,
            vec!["No brand color detected", "Text too close to edge"]
        );
    }

    #[test]
    fn test_compliance_level_serialization() {
        assert_eq!(serde_json::to_string(&ComplianceLevel::Warn).unwrap(), "\"WARN\"");
        assert_eq!(ComplianceLevel::Fail.to_string(), "FAIL");
    }

    #[test]
    fn test_parse_brand_colors() {
        assert_eq!(
            parse_brand_colors("00539f, #ED1C24"),
            Some(vec![Rgb(0, 83, 159), Rgb(237, 28, 36)])
        );
        assert_eq!(parse_brand_colors("00539f,nothex"), None);
        assert_eq!(parse_brand_colors(" , "), None);
    }
}
