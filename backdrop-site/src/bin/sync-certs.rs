//! Sync certifications from a LinkedIn data export.
//!
//! Get the export from LinkedIn: Settings & Privacy, Data Privacy, "Get a
//! copy of your data", select Certifications. Unzip it and point this tool
//! at the folder or at the CSV inside it.
//!
//! Usage: `sync-certs ./LinkedIn_Data_Export [--output public/data/certifications.json]`

use anyhow::Context;
use backdrop_site::sync;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sync-certs", version, about = "Merge LinkedIn certifications into the site data file")]
struct Args {
    /// LinkedIn export folder or certifications CSV
    input: PathBuf,

    /// Certifications JSON to merge into and overwrite
    #[arg(short, long, default_value = "public/data/certifications.json")]
    output: PathBuf,

    /// Report what would change without writing
    #[arg(long)]
    dry_run: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let report = sync::run(&args.input, &args.output, args.dry_run)
        .with_context(|| format!("syncing from {}", args.input.display()))?;

    println!("LinkedIn certifications found: {}", report.found);
    println!("Added {}, updated {}", report.added, report.updated);
    if report.written {
        println!("Wrote {} certifications to {}", report.total, report.output.display());
    } else {
        println!("Dry run: {} certifications, nothing written", report.total);
    }
    Ok(())
}
