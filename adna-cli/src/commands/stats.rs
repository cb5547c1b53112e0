//! Stats command implementation.

use anyhow::Result;
use colored::{Color, Colorize};

use crate::client::ApiClient;
use crate::utils::{print_banner, print_json};
use crate::GlobalOpts;

/// Execute the stats command.
pub async fn execute(opts: &GlobalOpts) -> Result<()> {
    let client = ApiClient::new(&opts.server)?;
    let stats = client.stats().await?;

    if opts.json {
        return print_json(&stats);
    }

    if !opts.quiet {
        print_banner("REGISTRY", Color::Cyan);
        println!("   {} {}", "Approved:".dimmed(), stats.total_approved);
        println!("   {} {}", "Revoked:".dimmed(), stats.total_revoked);
        println!("   {} {}", "Verifications:".dimmed(), stats.total_verifications);
        println!("   {} {}", "Tamper flags:".dimmed(), stats.total_tamper_flags);
    }

    Ok(())
}
