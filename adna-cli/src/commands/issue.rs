//! Issue command implementation.

use std::path::PathBuf;

use anyhow::Result;
use colored::{Color, Colorize};
use tracing::info;

use crate::client::ApiClient;
use crate::utils::{format_palette, format_timestamp, print_banner, print_compliance, print_json, read_creative};
use crate::GlobalOpts;

/// Execute the issue command.
pub async fn execute(file: PathBuf, opts: &GlobalOpts) -> Result<()> {
    let creative = read_creative(&file)?;
    let client = ApiClient::new(&opts.server)?;

    let certificate = client
        .issue(creative.data, &creative.file_name, creative.mime_type)
        .await?;

    info!(dna = %certificate.dna, certificate_id = %certificate.certificate_id, "Issued");

    if opts.json {
        return print_json(&certificate);
    }

    if !opts.quiet {
        print_banner("ISSUED", Color::Green);
        println!("   {} {}", "DNA:".dimmed(), certificate.dna.bold());
        println!("   {} {}", "Certificate:".dimmed(), certificate.certificate_id);
        println!("   {} {}", "File:".dimmed(), certificate.filename);
        println!(
            "   {} {}x{} {}",
            "Image:".dimmed(),
            certificate.metadata.width,
            certificate.metadata.height,
            certificate.metadata.mime_type
        );
        println!(
            "   {} {}",
            "Palette:".dimmed(),
            format_palette(&certificate.metadata.color_palette)
        );
        print_compliance("Compliance", &certificate.compliance);
        println!(
            "   {} {}",
            "Issued at:".dimmed(),
            format_timestamp(&certificate.created_at)
        );
        if let Some(url) = &certificate.verify_url {
            println!("   {} {}", "Verify at:".dimmed(), url);
        }
    }

    Ok(())
}
