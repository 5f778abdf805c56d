//! gltf-check - validate glTF 2.0 documents
//!
//! # Usage
//!
//! ```bash
//! # Check a document, resolving external buffers next to it
//! gltf-check scene.gltf
//!
//! # Supply the binary payload for a buffer without a uri
//! gltf-check scene.gltf --bin scene.bin
//!
//! # Machine-readable report
//! gltf-check scene.gltf --format json
//!
//! # Print the canonical form of a valid document
//! gltf-check scene.gltf --canonical
//! ```
//!
//! Exits with 0 when the document is valid, 1 when it is not, and 2 when it
//! could not be read.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use gltf_cli::{canonical_json, check_file, render_json, render_text, CheckConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gltf-check")]
#[command(about = "Validate glTF 2.0 documents")]
#[command(version)]
struct Cli {
    /// Path to the .gltf document
    file: PathBuf,

    /// Binary payload for buffer 0 when it has no uri
    #[arg(long)]
    bin: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print the canonical JSON of a valid document instead of a report
    #[arg(long)]
    canonical: bool,

    /// Refuse documents larger than this many bytes
    #[arg(long)]
    max_size: Option<usize>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<bool> {
    let config = CheckConfig {
        path: cli.file,
        bin: cli.bin,
        max_size: cli.max_size,
    };
    let outcome = check_file(&config)?;

    let mut stdout = std::io::stdout().lock();
    if cli.canonical {
        if let Some(json) = canonical_json(&outcome)? {
            stdout.write_all(&json)?;
            writeln!(stdout)?;
            return Ok(true);
        }
    }
    match cli.format {
        Format::Text => write!(stdout, "{}", render_text(&outcome))?,
        Format::Json => writeln!(stdout, "{}", render_json(&outcome)?)?,
    }
    Ok(outcome.valid)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
