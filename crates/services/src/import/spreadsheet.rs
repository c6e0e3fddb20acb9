use std::io::Cursor;

use calamine::{Reader, open_workbook_auto_from_rs};
use vocab_core::normalize::RawEntry;

use crate::error::ImportError;

/// Decodes the first sheet of a workbook into rows of cell text.
pub trait WorkbookReader: Send + Sync {
    /// # Errors
    ///
    /// Returns `ImportError::Parse` if the workbook cannot be read.
    fn first_sheet_rows(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>, ImportError>;
}

/// `.xlsx` / `.xls` / `.ods` reader. Every cell is rendered as text; empty
/// cells become empty strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineReader;

impl WorkbookReader for CalamineReader {
    fn first_sheet_rows(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>, ImportError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| ImportError::parse("spreadsheet", e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::parse("spreadsheet", "workbook has no sheets"))?
            .map_err(|e| ImportError::parse("spreadsheet", e))?;

        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        tracing::debug!(rows = rows.len(), "first worksheet read");
        Ok(rows)
    }
}

/// Columns A, B and C map to word, phonetic and meaning. Rows with fewer than
/// three cells or a blank word are skipped.
#[must_use]
pub fn parse_rows(rows: Vec<Vec<String>>) -> Vec<RawEntry> {
    rows.into_iter()
        .filter(|row| row.len() >= 3 && !row[0].trim().is_empty())
        .map(|row| {
            let mut cells = row.into_iter();
            let mut next = || cells.next().unwrap_or_default();
            RawEntry::new(next(), next(), next())
        })
        .collect()
}
