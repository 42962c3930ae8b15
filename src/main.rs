//! Command-line entry point: list a keyring and print the roster as HTML.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use partytable::{DEFAULT_KEY_LISTER, DEFAULT_TITLE, Keyring, ListOptions, RosterOptions};
use tracing_subscriber::EnvFilter;

/// Generate an HTML key-signing party roster from a public keyring.
#[derive(Parser, Debug)]
#[command(name = "partytable", version)]
struct Args {
    /// Public keyring file to list.
    keyring: String,

    /// Key lister to run; must accept gpg2's arguments.
    #[arg(long, env = "PARTYTABLE_GPG", default_value = DEFAULT_KEY_LISTER)]
    gpg: String,

    /// Heading printed above the table.
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// Write the roster to this file instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Give up if the key lister has not finished after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they never end up inside the HTML.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let keyring = Keyring::new(&args.keyring).with_program(&args.gpg);
    let options = ListOptions {
        timeout_secs: args.timeout,
    };
    let listing = keyring
        .list_keys(&options)
        .await
        .with_context(|| format!("failed to list keyring {}", args.keyring))?;

    if listing.malformed_lines > 0 {
        tracing::warn!(
            count = listing.malformed_lines,
            "skipped malformed lines in key listing"
        );
    }
    if listing.discarded_records > 0 {
        tracing::warn!(
            count = listing.discarded_records,
            "dropped keys missing a fingerprint or user id"
        );
    }
    tracing::info!(keys = listing.records.len(), "rendering roster");

    let roster = RosterOptions { title: args.title };
    let generated = chrono::Local::now().naive_local();
    let html = partytable::render_roster(&listing.records, generated, &roster)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_document(BufWriter::new(file), &html)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            write_document(io::stdout().lock(), &html).context("failed to write roster")?;
        }
    }

    Ok(())
}

fn write_document<W: Write>(mut out: W, html: &str) -> io::Result<()> {
    out.write_all(html.as_bytes())?;
    out.flush()
}
