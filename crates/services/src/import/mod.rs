//! Source parsers that turn raw files into normalized entries.

mod archive;
mod delimited;
mod plain;
mod spreadsheet;

use std::path::Path;
use std::sync::Arc;

use vocab_core::model::Entry;
use vocab_core::normalize::normalize;

use crate::error::ImportError;

pub use archive::{extract_collection, parse_archive};
pub use delimited::parse_delimited;
pub use plain::parse_plain_run;
pub use spreadsheet::{CalamineReader, WorkbookReader, parse_rows};

/// Source encodings recognised by [`Importer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited { delimiter: char },
    Spreadsheet,
    Archive,
    PlainRun,
}

impl SourceFormat {
    /// Pick a format from a file extension. `.txt` uses `text_delimiter`.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::UnsupportedFormat` for unknown extensions.
    pub fn from_file_name(name: &str, text_delimiter: char) -> Result<Self, ImportError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(Self::Delimited { delimiter: ',' }),
            "tsv" => Ok(Self::Delimited { delimiter: '\t' }),
            "txt" => Ok(Self::Delimited {
                delimiter: text_delimiter,
            }),
            "xlsx" | "xls" => Ok(Self::Spreadsheet),
            "apkg" | "colpkg" => Ok(Self::Archive),
            "json" => Ok(Self::PlainRun),
            _ => Err(ImportError::UnsupportedFormat(name.to_owned())),
        }
    }
}

/// Dispatches raw bytes to the matching parser and normalizes the result.
#[derive(Clone)]
pub struct Importer {
    text_delimiter: char,
    workbook: Arc<dyn WorkbookReader>,
}

impl Default for Importer {
    fn default() -> Self {
        Self {
            text_delimiter: ',',
            workbook: Arc::new(CalamineReader),
        }
    }
}

impl Importer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_text_delimiter(mut self, delimiter: char) -> Self {
        self.text_delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_workbook_reader(mut self, reader: Arc<dyn WorkbookReader>) -> Self {
        self.workbook = reader;
        self
    }

    /// # Errors
    ///
    /// Returns `ImportError` for unknown formats, parse failures, or when no
    /// usable entry survives normalization.
    pub async fn import_file(&self, file_name: &str, bytes: &[u8]) -> Result<Vec<Entry>, ImportError> {
        let format = SourceFormat::from_file_name(file_name, self.text_delimiter)?;
        self.import(format, bytes).await
    }

    /// # Errors
    ///
    /// See [`Importer::import_file`].
    pub async fn import(&self, format: SourceFormat, bytes: &[u8]) -> Result<Vec<Entry>, ImportError> {
        let raw = match format {
            SourceFormat::Delimited { delimiter } => parse_delimited(decode_text(bytes)?, delimiter),
            SourceFormat::PlainRun => parse_plain_run(decode_text(bytes)?)?,
            SourceFormat::Spreadsheet => parse_rows(self.workbook.first_sheet_rows(bytes)?),
            SourceFormat::Archive => parse_archive(bytes).await?,
        };

        let entries = normalize(raw);
        if entries.is_empty() {
            return Err(ImportError::Empty);
        }
        tracing::info!(?format, entries = entries.len(), "source imported");
        Ok(entries)
    }
}

fn decode_text(bytes: &[u8]) -> Result<&str, ImportError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ImportError::parse("text", e))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}
