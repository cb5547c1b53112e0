//! Revoke command implementation.

use anyhow::Result;
use colored::{Color, Colorize};
use tracing::info;

use crate::client::ApiClient;
use crate::utils::print_banner;
use crate::GlobalOpts;

/// Execute the revoke command.
pub async fn execute(dna: String, opts: &GlobalOpts) -> Result<()> {
    let client = ApiClient::new(&opts.server)?;
    let response = client.revoke(&dna).await?;

    info!(dna = %response.dna, success = response.success, "Revoked");

    if opts.json {
        println!(
            "{}",
            serde_json::json!({
                "success": response.success,
                "message": response.message,
                "dna": response.dna,
            })
        );
    } else if !opts.quiet {
        print_banner("REVOKED", Color::Yellow);
        println!("   {} {}", "DNA:".dimmed(), response.dna.bold());
        println!("   {} {}", "Server:".dimmed(), response.message);
    }

    Ok(())
}
