//! Tabular data types shared by the loader and the pipeline

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use super::LoadError;

/// A file handed to the loader: its name and raw bytes
#[derive(Clone)]
pub struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    /// Wrap bytes already in memory
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its file name
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { name, bytes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lower-cased extension without the dot, empty if there is none
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A named column of text cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<String>,
}

/// Column-oriented table in which every cell is already text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table from a header row and data rows
    ///
    /// Every row must have exactly as many cells as the header.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, String> {
        let width = headers.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column {
                name,
                cells: Vec::with_capacity(rows.len()),
            })
            .collect();

        let row_count = rows.len();
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(format!(
                    "row {} has {} fields, expected {}",
                    idx + 1,
                    row.len(),
                    width
                ));
            }
            for (column, cell) in columns.iter_mut().zip(row) {
                column.cells.push(cell);
            }
        }

        Ok(Self { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Cells of row `idx` in column order
    pub fn row(&self, idx: usize) -> Option<Vec<&str>> {
        if idx >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| c.cells[idx].as_str()).collect())
    }
}

/// Ordered column names of one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnList(Vec<String>);

impl ColumnList {
    /// Column names of `table` in file order
    pub fn extract(table: &Table) -> Self {
        Self(table.columns.iter().map(|c| c.name.clone()).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }
}

impl From<Vec<String>> for ColumnList {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<&[&str]> for ColumnList {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl fmt::Display for ColumnList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_from_rows_column_major() {
        let table = Table::from_rows(s(&["a", "b"]), vec![s(&["1", "2"]), s(&["3", "4"])]).unwrap();
        assert_eq!(table.width(), 2);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns()[1].cells, s(&["2", "4"]));
        assert_eq!(table.row(1), Some(vec!["3", "4"]));
        assert_eq!(table.row(2), None);
    }

    #[test]
    fn test_from_rows_rejects_ragged_row() {
        let err = Table::from_rows(s(&["a", "b"]), vec![s(&["1"])]).unwrap_err();
        assert!(err.contains("row 1"));
    }

    #[test]
    fn test_extract_preserves_order() {
        let table = Table::from_rows(s(&["SKU", "Name", "Price"]), vec![]).unwrap();
        let columns = ColumnList::extract(&table);
        assert_eq!(columns.as_slice(), &s(&["SKU", "Name", "Price"])[..]);
        assert!(columns.contains("Name"));
    }

    #[test]
    fn test_extract_empty_table() {
        let columns = ColumnList::extract(&Table::default());
        assert!(columns.is_empty());
    }

    #[test]
    fn test_uploaded_file_extension() {
        assert_eq!(UploadedFile::new("Products.XLSX", Vec::<u8>::new()).extension(), "xlsx");
        assert_eq!(UploadedFile::new("data.csv", Vec::<u8>::new()).extension(), "csv");
        assert_eq!(UploadedFile::new("README", Vec::<u8>::new()).extension(), "");
    }

    #[test]
    fn test_column_list_display() {
        let columns = ColumnList::from(&["SKU", "Name"][..]);
        assert_eq!(columns.to_string(), "[SKU, Name]");
    }
}
