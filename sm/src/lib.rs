//! schemamap - AI-assisted column mapping between two tables
//!
//! Upload a source and a destination file (CSV, TSV or a spreadsheet
//! workbook), extract their column names and ask a remote mapping service
//! how the destination columns correspond to the source ones.
//!
//! # Modules
//!
//! - [`table`] - File loading, sheet selection and column extraction
//! - [`mapping`] - Mapping request/response types and the HTTP client
//! - [`present`] - Tabular rendering and JSON export of a mapping
//! - [`pipeline`] - Per-session state machine tying the steps together
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`repl`] - Interactive session

pub mod cli;
pub mod config;
pub mod mapping;
pub mod pipeline;
pub mod present;
pub mod repl;
pub mod table;

pub use config::{ApiSettings, Config, ConfigError};
pub use mapping::{HttpMappingClient, MappingClient, MappingError, MappingRequest, MappingResult};
pub use pipeline::{MappingReport, Pipeline, PipelineError, Phase, Slot};
pub use present::{Export, TabularView};
pub use table::{ColumnList, LoadError, Table, UploadedFile};
