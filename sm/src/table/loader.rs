//! Tabular loader: delimited text and spreadsheet documents into [`Table`]s
//!
//! Every cell is coerced to text right after parsing, so nothing downstream
//! ever sees a typed value.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use calamine::{Data, Reader, Sheets, open_workbook_auto_from_rs};
use chrono::{NaiveTime, Timelike};
use tracing::{debug, info};

use super::{ColumnList, LoadError, Table, UploadedFile};

/// Input formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimiter-separated text with a header row
    Delimited(u8),
    /// Workbook with one or more named sheets
    Spreadsheet,
}

impl FileFormat {
    /// Detect the format from a lower-cased file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "csv" => Some(Self::Delimited(b',')),
            "tsv" => Some(Self::Delimited(b'\t')),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Detect the format of an uploaded file
    pub fn detect(file: &UploadedFile) -> Result<Self, LoadError> {
        let extension = file.extension();
        Self::from_extension(&extension).ok_or_else(|| LoadError::UnsupportedFormat {
            file: file.name().to_string(),
            extension,
        })
    }
}

/// List the declared sheets of a file
///
/// Delimited files have no sheets and yield an empty list.
pub fn sheet_names(file: &UploadedFile) -> Result<Vec<String>, LoadError> {
    debug!(file = %file.name(), "sheet_names: called");
    match FileFormat::detect(file)? {
        FileFormat::Delimited(_) => Ok(Vec::new()),
        FileFormat::Spreadsheet => Ok(open_workbook(file)?.sheet_names()),
    }
}

/// Parse `file` into a text-only [`Table`]
///
/// `sheet` selects the worksheet of a spreadsheet. It is required when the
/// workbook declares more than one sheet and ignored for delimited files.
pub fn load(file: &UploadedFile, sheet: Option<&str>) -> Result<Table, LoadError> {
    info!(file = %file.name(), sheet = ?sheet, "Loading file: {}", file.name());

    let table = match FileFormat::detect(file)? {
        FileFormat::Delimited(delimiter) => load_delimited(file, delimiter)?,
        FileFormat::Spreadsheet => load_spreadsheet(file, sheet)?,
    };

    info!(
        file = %file.name(),
        rows = table.row_count(),
        "File processed with columns: {}",
        ColumnList::extract(&table)
    );
    Ok(table)
}

fn load_delimited(file: &UploadedFile, delimiter: u8) -> Result<Table, LoadError> {
    debug!(file = %file.name(), delimiter = %(delimiter as char).escape_default(), "load_delimited: called");
    let data = file.bytes();
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::parse(file.name(), e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| LoadError::parse(file.name(), e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(columns = headers.len(), rows = rows.len(), "load_delimited: parsed");
    Table::from_rows(normalize_headers(headers), rows).map_err(|e| LoadError::parse(file.name(), e))
}

fn open_workbook(file: &UploadedFile) -> Result<Sheets<Cursor<Vec<u8>>>, LoadError> {
    open_workbook_auto_from_rs(Cursor::new(file.bytes().to_vec())).map_err(|e| LoadError::parse(file.name(), e))
}

fn load_spreadsheet(file: &UploadedFile, sheet: Option<&str>) -> Result<Table, LoadError> {
    debug!(file = %file.name(), ?sheet, "load_spreadsheet: called");
    let mut workbook = open_workbook(file)?;
    let sheets = workbook.sheet_names();
    let selected = select_sheet(file.name(), &sheets, sheet)?;

    let range = workbook
        .worksheet_range(&selected)
        .map_err(|e| LoadError::parse(file.name(), e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let body: Vec<Vec<String>> = rows.map(|row| row.iter().map(cell_to_string).collect()).collect();

    debug!(sheet = %selected, columns = headers.len(), rows = body.len(), "load_spreadsheet: parsed");
    Table::from_rows(normalize_headers(headers), body).map_err(|e| LoadError::parse(file.name(), e))
}

/// Resolve which sheet to read; never defaults to the first of several
fn select_sheet(file: &str, sheets: &[String], requested: Option<&str>) -> Result<String, LoadError> {
    match requested {
        Some(name) if sheets.iter().any(|s| s == name) => Ok(name.to_string()),
        Some(name) => Err(LoadError::SheetNotFound {
            file: file.to_string(),
            sheet: name.to_string(),
            available: sheets.to_vec(),
        }),
        None => match sheets {
            [] => Err(LoadError::parse(file, "workbook contains no sheets")),
            [only] => Ok(only.clone()),
            _ => Err(LoadError::SheetSelectionRequired {
                file: file.to_string(),
                sheets: sheets.to_vec(),
            }),
        },
    }
}

/// Text form of a spreadsheet cell
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if !dt.is_duration() => {
                if ndt.time() == NaiveTime::MIN {
                    ndt.format("%Y-%m-%d").to_string()
                } else if ndt.nanosecond() == 0 {
                    ndt.format("%Y-%m-%d %H:%M:%S").to_string()
                } else {
                    ndt.format("%Y-%m-%d %H:%M:%S%.f").to_string()
                }
            }
            _ => format_float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Integral floats lose their fraction (`3.0` -> `3`)
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Make header names unique and non-blank
///
/// Blank names become `Unnamed: <index>`; repeats get `.1`, `.2`, ... suffixes.
pub fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() { format!("Unnamed: {}", idx) } else { name };
        let mut candidate = base.clone();
        while seen.contains(&candidate) {
            let n = counters.entry(base.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{}.{}", base, n);
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}
