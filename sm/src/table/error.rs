//! Tabular loading errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning an uploaded file into a table
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file format '{extension}' for {file} (expected csv, tsv, xlsx, xlsm, xlsb, xls or ods)")]
    UnsupportedFormat { file: String, extension: String },

    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("{file} has {} sheets, select one of: {}", sheets.len(), sheets.join(", "))]
    SheetSelectionRequired { file: String, sheets: Vec<String> },

    #[error("sheet '{sheet}' not found in {file} (available: {})", available.join(", "))]
    SheetNotFound {
        file: String,
        sheet: String,
        available: Vec<String>,
    },

    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub(crate) fn parse(file: &str, message: impl ToString) -> Self {
        Self::Parse {
            file: file.to_string(),
            message: message.to_string(),
        }
    }

    /// Sheets to choose from when the error is a pending sheet selection
    pub fn pending_sheets(&self) -> Option<&[String]> {
        match self {
            Self::SheetSelectionRequired { sheets, .. } => Some(sheets),
            _ => None,
        }
    }
}
