use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use invoice_flattener::{
    flatten,
    io::{load_expired, load_invoices, write_rows, InputFormat},
    summarize,
};

/// Flattens invoice line items into a delimited table
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the invoice records
    #[clap(env = "INVOICES_PATH")]
    invoices: PathBuf,
    /// The path to the comma separated list of expired invoice ids
    #[clap(env = "EXPIRED_INVOICES_PATH")]
    expired: PathBuf,
    /// Where to write the table to, stdout if omitted
    #[clap(short, long, env = "OUTPUT_PATH")]
    output: Option<PathBuf>,
    /// The encoding of the invoice records, `json` or `json-lines`
    #[clap(short, long, default_value = "json")]
    format: InputFormat,
    /// The column delimiter of the table
    #[clap(short, long, default_value = ",")]
    delimiter: char,
}

fn main() -> anyhow::Result<()> {
    // logs go to stderr, stdout may carry the table
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    anyhow::ensure!(
        args.delimiter.is_ascii(),
        "The delimiter must be an ASCII character, got `{}`",
        args.delimiter,
    );
    let delimiter = args.delimiter as u8;

    let expired = load_expired(&args.expired)
        .with_context(|| format!("Failed to load expired invoices from {}", args.expired.display()))?;
    let invoices = load_invoices(&args.invoices, args.format)
        .with_context(|| format!("Failed to load invoices from {}", args.invoices.display()))?;

    let rows = flatten(invoices, &expired)?;
    let summaries = summarize(&rows);
    tracing::info!(
        invoices = summaries.len(),
        rows = rows.len(),
        expired = summaries.values().filter(|summary| summary.is_expired()).count(),
        "flattened invoices"
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_rows(BufWriter::new(file), &rows, delimiter)?;
        }
        None => write_rows(std::io::stdout(), &rows, delimiter)?,
    }

    Ok(())
}
