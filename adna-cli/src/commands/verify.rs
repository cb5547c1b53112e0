//! Verify command implementation.

use std::path::PathBuf;

use adna_core::{VerificationResult, VerificationStatus};
use anyhow::Result;
use colored::{Color, Colorize};
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::exit_codes::VerificationFailed;
use crate::utils::{format_timestamp, print_banner, print_compliance, print_json, read_creative};
use crate::GlobalOpts;

fn status_color(status: VerificationStatus) -> Color {
    match status {
        VerificationStatus::Valid => Color::Green,
        VerificationStatus::Tampered | VerificationStatus::Revoked => Color::Red,
        VerificationStatus::Unregistered => Color::Yellow,
    }
}

fn print_result(result: &VerificationResult) {
    print_banner(&result.status.to_string(), status_color(result.status));

    println!("   {} {}", "Candidate DNA:".dimmed(), result.candidate_dna);
    println!(
        "   {} {}",
        "Exact match:".dimmed(),
        if result.dna_match { "yes".green() } else { "no".red() }
    );

    if let Some(stored) = &result.stored_certificate {
        let label = if result.dna_match {
            "Registered as:"
        } else {
            "Closest original:"
        };
        println!("   {} {} ({})", label.dimmed(), stored.dna, stored.filename);
        if let Some(revoked_at) = &stored.revoked_at {
            println!("   {} {}", "Revoked at:".dimmed(), format_timestamp(revoked_at));
        }
    }

    if let Some(delta) = &result.delta {
        println!("   {} {}", "Hash distance:".dimmed(), delta.phash_distance);
        println!(
            "   {} {:.2}",
            "Color deviation:".dimmed(),
            delta.dominant_color_deviation
        );
        if delta.color_rule_changed {
            println!("   {}", "Color rule verdict changed".red());
        }
        if delta.safe_zone_changed {
            println!("   {}", "Safe zone verdict changed".red());
        }
    }

    if let Some(stored) = &result.stored_compliance {
        print_compliance("Stored compliance", stored);
    }
    if let Some(current) = &result.current_compliance {
        print_compliance("Current compliance", current);
    }
}

/// Execute the verify command.
///
/// Any outcome other than `VALID` is returned as an error so the process
/// exits with a verification failure code.
pub async fn execute(file: Option<PathBuf>, dna: Option<String>, opts: &GlobalOpts) -> Result<()> {
    let client = ApiClient::new(&opts.server)?;

    let result = match (file, dna) {
        (_, Some(dna)) => client.verify_dna(&dna).await?,
        (Some(file), None) => {
            let creative = read_creative(&file)?;
            client
                .verify(creative.data, &creative.file_name, creative.mime_type)
                .await?
        }
        (None, None) => anyhow::bail!("Either FILE or --dna is required"),
    };

    if opts.json {
        print_json(&result)?;
    } else if !opts.quiet {
        print_result(&result);
    }

    if result.status == VerificationStatus::Valid {
        info!(dna = %result.candidate_dna, "Verification successful");
        Ok(())
    } else {
        warn!(dna = %result.candidate_dna, status = %result.status, "Verification not valid");
        Err(VerificationFailed {
            status: result.status,
        }
        .into())
    }
}
