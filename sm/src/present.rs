//! Result presentation and export
//!
//! Turns a mapping result into a row-per-key table for display and into an
//! indented JSON document for download.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::mapping::MappingResult;
use crate::table::Table;

/// File name of the exported mapping document
pub const EXPORT_FILE_NAME: &str = "mapping_results.json";

/// MIME type of the exported mapping document
pub const EXPORT_MIME_TYPE: &str = "application/json";

/// Header of the key column in a presented mapping
pub const KEY_HEADER: &str = "column";

/// Header used for mapping entries that are not JSON objects
pub const VALUE_HEADER: &str = "value";

/// Display-ready table of text cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularView {
    /// First `rows` rows of an uploaded table
    pub fn preview(table: &Table, rows: usize) -> Self {
        let headers = table.columns().iter().map(|c| c.name.clone()).collect();
        let rows = (0..table.row_count().min(rows))
            .filter_map(|idx| table.row(idx))
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect();
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Aligned plain-text rendering
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(idx) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        out.push_str(&render_line(&self.headers, &widths));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&render_line(&rule, &widths));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_line(row, &widths));
            out.push('\n');
        }
        out
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    line.join("  ").trim_end().to_string()
}

/// One row per mapping key, one column per field of the per-key records
///
/// Fields appear in first-seen order across all records. Entries that are not
/// objects go into a single `value` column.
pub fn present(result: &MappingResult) -> TabularView {
    debug!(entries = result.len(), "present: called");
    let mut fields: Vec<String> = Vec::new();
    let mut has_scalars = false;

    for (_, value) in result.iter() {
        match value {
            Value::Object(record) => {
                for field in record.keys() {
                    if !fields.contains(field) {
                        fields.push(field.clone());
                    }
                }
            }
            _ => has_scalars = true,
        }
    }

    let mut headers = vec![KEY_HEADER.to_string()];
    headers.extend(fields.iter().cloned());
    if has_scalars {
        headers.push(VALUE_HEADER.to_string());
    }

    let rows = result
        .iter()
        .map(|(key, value)| {
            let mut row = vec![key.clone()];
            match value {
                Value::Object(record) => {
                    row.extend(fields.iter().map(|f| record.get(f).map(cell_text).unwrap_or_default()));
                    if has_scalars {
                        row.push(String::new());
                    }
                }
                other => {
                    row.extend(fields.iter().map(|_| String::new()));
                    row.push(cell_text(other));
                }
            }
            row
        })
        .collect();

    TabularView { headers, rows }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A downloadable document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Export {
    /// Write the document into `dir`, creating it if needed
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name);
        fs::write(&path, &self.bytes)?;
        info!(path = %path.display(), bytes = self.bytes.len(), "Mapping results exported");
        Ok(path)
    }
}

/// Serialize the `mappings` object verbatim as 2-space indented JSON
pub fn export(result: &MappingResult) -> Result<Export, serde_json::Error> {
    debug!(entries = result.len(), "export: called");
    let bytes = serde_json::to_vec_pretty(result.as_map())?;
    Ok(Export {
        file_name: EXPORT_FILE_NAME,
        mime_type: EXPORT_MIME_TYPE,
        bytes,
    })
}
