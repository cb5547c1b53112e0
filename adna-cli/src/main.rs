//! adna CLI - issue and verify ad-creative DNA fingerprints.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod client;
mod commands;
mod exit_codes;
mod utils;

use client::DEFAULT_SERVER;
use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "Exit codes:
  0   Success (verification: VALID)
  1   General error
  64  Usage error
  65  Verification not VALID (TAMPERED, REVOKED or UNREGISTERED)
  66  Input error (missing file, unsupported type, unknown DNA)
  69  Server unavailable";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Parser)]
#[command(name = "adna")]
#[command(author, version, about = "Tamper-evident DNA fingerprints for ad creatives", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Server base URL for registry commands
    #[arg(long, global = true, env = "ADNA_SERVER", default_value = DEFAULT_SERVER)]
    server: String,

    /// Print machine-readable JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    /// Suppress formatted output (exit code only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, value_enum, default_value = "auto")]
    color: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a creative's DNA and compliance locally (no server)
    Fingerprint {
        /// Path to a JPEG or PNG creative
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Brand rule version tag mixed into the DNA
        #[arg(long, default_value = adna_core::compliance::DEFAULT_BRAND_RULE_VERSION)]
        rule_version: String,

        /// Comma-separated brand colors as hex, e.g. 00539f,ed1c24
        #[arg(long)]
        brand_colors: Option<String>,

        /// Skip text detection (safe-zone rule always passes)
        #[arg(long)]
        no_text_detection: bool,
    },

    /// Register a creative with the server
    Issue {
        /// Path to a JPEG or PNG creative
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Verify a creative (or a DNA token) against the registry
    Verify {
        /// Path to a JPEG or PNG creative
        #[arg(value_name = "FILE", required_unless_present = "dna", conflicts_with = "dna")]
        file: Option<PathBuf>,

        /// Look up a DNA token instead of uploading a file
        #[arg(long, value_name = "DNA")]
        dna: Option<String>,
    },

    /// Revoke a registered creative
    Revoke {
        /// DNA token to revoke
        #[arg(value_name = "DNA")]
        dna: String,
    },

    /// Show registry statistics
    Stats,
}

/// Options shared by every command.
pub struct GlobalOpts {
    pub server: String,
    pub json: bool,
    pub quiet: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "adna=debug,adna_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let opts = GlobalOpts {
        server: cli.server,
        json: cli.json,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Fingerprint {
            file,
            rule_version,
            brand_colors,
            no_text_detection,
        } => {
            commands::fingerprint::execute(
                file,
                rule_version,
                brand_colors,
                no_text_detection,
                &opts,
            )
            .await
        }
        Commands::Issue { file } => commands::issue::execute(file, &opts).await,
        Commands::Verify { file, dna } => commands::verify::execute(file, dna, &opts).await,
        Commands::Revoke { dna } => commands::revoke::execute(dna, &opts).await,
        Commands::Stats => commands::stats::execute(&opts).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported as "errors" that go to stdout
            let code = if e.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    match cli.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }
    init_tracing(cli.verbose);

    let exit = match run(cli).await {
        Ok(()) => ExitCode::success(),
        Err(err) => ExitCode::from_anyhow(&err),
    };

    if let Some(message) = &exit.message {
        eprintln!("Error: {}", message);
    }
    std::process::exit(exit.code);
}
