//! Common utility functions shared across CLI commands.

use std::path::Path;

use adna_core::{ComplianceLevel, ComplianceSummary, Rgb};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::{Color, ColoredString, Colorize};
use tracing::info;

use crate::exit_codes::InputError;

/// A creative read from disk.
pub struct Creative {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
    pub file_name: String,
}

/// MIME type implied by the file extension (`.jpg`, `.jpeg`, `.png`).
pub fn mime_for_path(path: &Path) -> Result<&'static str, InputError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        Some("png") => Ok("image/png"),
        _ => Err(InputError(format!(
            "Unsupported file type: {} (expected .jpg, .jpeg or .png)",
            path.display()
        ))),
    }
}

/// Read a creative, resolving its MIME type from the extension.
pub fn read_creative(path: &Path) -> Result<Creative> {
    let mime_type = mime_for_path(path)?;
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

    info!(path = %path.display(), bytes = data.len(), mime_type, "Read file");

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    Ok(Creative {
        data,
        mime_type,
        file_name,
    })
}

/// Format a timestamp as a human-readable UTC string.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Space-separated `#rrggbb` list.
pub fn format_palette(palette: &[Rgb]) -> String {
    if palette.is_empty() {
        return "(none)".to_string();
    }
    palette
        .iter()
        .map(|c| format!("#{}", c.to_hex()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn level_colored(level: ComplianceLevel) -> ColoredString {
    let label = level.to_string();
    match level {
        ComplianceLevel::Pass => label.green(),
        ComplianceLevel::Warn => label.yellow(),
        ComplianceLevel::Fail => label.red(),
    }
}

/// Print a boxed status banner.
pub fn print_banner(label: &str, color: Color) {
    const WIDTH: usize = 40;
    let pad = WIDTH.saturating_sub(label.len());
    let left = pad / 2;
    let line = format!("║{}{}{}║", " ".repeat(left), label, " ".repeat(pad - left));

    println!();
    println!("{}", format!("╔{}╗", "═".repeat(WIDTH)).color(color));
    println!("{}", line.color(color).bold());
    println!("{}", format!("╚{}╝", "═".repeat(WIDTH)).color(color));
    println!();
}

/// Print both compliance verdicts and their notes.
pub fn print_compliance(title: &str, compliance: &ComplianceSummary) {
    println!(
        "   {} color {} / safe zone {}",
        format!("{}:", title).dimmed(),
        level_colored(compliance.color_rule),
        level_colored(compliance.safe_zone)
    );
    for note in &compliance.notes {
        println!("      - {}", note);
    }
}

/// Print a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("ad.PNG")).unwrap(), "image/png");
        assert_eq!(mime_for_path(Path::new("ad.jpeg")).unwrap(), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a/b/ad.jpg")).unwrap(), "image/jpeg");
        assert!(mime_for_path(Path::new("ad.gif")).is_err());
        assert!(mime_for_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 45).unwrap();
        assert_eq!(format_timestamp(&at), "2024-01-15 12:30:45 UTC");
    }

    #[test]
    fn test_format_palette() {
        assert_eq!(
            format_palette(&[Rgb(0, 83, 159), Rgb(255, 255, 255)]),
            "#00539f #ffffff"
        );
        assert_eq!(format_palette(&[]), "(none)");
    }
}
