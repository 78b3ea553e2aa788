//! Tabular ingestion: uploaded files into string-celled tables and column lists

mod error;
pub mod loader;
mod types;

pub use error::LoadError;
pub use loader::{FileFormat, load, sheet_names};
pub use types::{Column, ColumnList, Table, UploadedFile};

/// Column names of `table` in file order
pub fn extract(table: &Table) -> ColumnList {
    ColumnList::extract(table)
}
