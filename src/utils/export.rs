//! Serialization of converted records for downstream consumers.
//!
//! The converter itself only returns records; these writers are used by the
//! command line tool and by callers that need a tabular or JSON export.

use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

use crate::models::ArticleRecord;

/// Errors that can occur while writing records
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Record output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Article text only
    #[default]
    Text,
    /// Pretty-printed JSON array
    Json,
    /// Header row plus one row per record
    Csv,
}

impl ExportFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "md",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Write records in the requested format
pub fn write_records<W: Write>(
    records: &[ArticleRecord],
    format: ExportFormat,
    writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Text => write_text(records, writer),
        ExportFormat::Json => write_json(records, writer),
        ExportFormat::Csv => write_csv(records, writer),
    }
}

/// Column order of the CSV export, matching the field order of [`ArticleRecord`]
pub const CSV_HEADER: [&str; 8] = [
    "title",
    "language",
    "publisher",
    "journal",
    "release_year",
    "doi",
    "referencecount",
    "text",
];

/// CSV with the record's field names as header, also when there are no rows
pub fn write_csv<W: Write>(records: &[ArticleRecord], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if records.is_empty() {
        csv_writer.write_record(CSV_HEADER)?;
    }
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Pretty JSON array followed by a newline
pub fn write_json<W: Write>(records: &[ArticleRecord], mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// The article text of each record, one after another
pub fn write_text<W: Write>(records: &[ArticleRecord], mut writer: W) -> Result<(), ExportError> {
    for record in records {
        writer.write_all(record.text.as_bytes())?;
        if !record.text.ends_with('\n') {
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;
    Ok(())
}
