//! Reading invoices and expired invoice lists, and writing the flattened table

use std::{
    fs::File,
    io::{BufRead, BufReader, Read, Write},
    path::Path,
    str::FromStr,
};

use crate::{ExpiredListError, ExpiredSet, Invoice, OutputRow};

/// Possible errors to occur while loading inputs
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid invoice records: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid invoice record on line {line}: {source}")]
    JsonLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    ExpiredList(#[from] ExpiredListError),
}

/// Possible errors to occur while writing the flattened table
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The supported encodings of invoice records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    /// One JSON array holding all invoices
    Json,
    /// One JSON invoice object per line
    JsonLines,
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "json-lines" | "jsonl" | "ndjson" => Ok(Self::JsonLines),
            _ => Err(format!("unknown input format `{}`, expected `json` or `json-lines`", s)),
        }
    }
}

/// Reads all invoices from `reader`
pub fn read_invoices<R: Read>(reader: R, format: InputFormat) -> Result<Vec<Invoice>, LoadError> {
    match format {
        InputFormat::Json => Ok(serde_json::from_reader(reader)?),
        InputFormat::JsonLines => {
            let mut invoices = Vec::new();
            for (index, line) in BufReader::new(reader).lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }

                let invoice = serde_json::from_str(&line)
                    .map_err(|source| LoadError::JsonLine { line: index + 1, source })?;
                invoices.push(invoice);
            }
            Ok(invoices)
        }
    }
}

/// Reads all invoices from the file at `path`
pub fn load_invoices(path: impl AsRef<Path>, format: InputFormat) -> Result<Vec<Invoice>, LoadError> {
    let path = path.as_ref();
    let invoices = read_invoices(BufReader::new(File::open(path)?), format)?;
    tracing::info!(path = %path.display(), invoices = invoices.len(), "loaded invoices");

    Ok(invoices)
}

/// Reads the comma separated list of expired invoices at `path`
pub fn load_expired(path: impl AsRef<Path>) -> Result<ExpiredSet, LoadError> {
    let path = path.as_ref();
    let expired = ExpiredSet::parse(&std::fs::read_to_string(path)?)?;
    tracing::info!(path = %path.display(), expired = expired.len(), "loaded expired invoices");

    Ok(expired)
}

/// Writes `rows` as a delimited table, header first
///
/// The header is written even if there are no rows.
pub fn write_rows<W: Write>(writer: W, rows: &[OutputRow], delimiter: u8) -> Result<(), WriteError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .from_writer(writer);

    writer.write_record(OutputRow::HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
