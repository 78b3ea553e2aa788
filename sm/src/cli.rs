//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::{API_KEY_ENV, API_URL_ENV, LoggingConfig};

/// schemamap - AI column mapping between two tabular files
#[derive(Parser)]
#[command(
    name = "sm",
    about = "Map the columns of a source file onto a destination schema using an AI mapping service",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Map a source file onto a destination file (one-shot)
    Map {
        /// Source file (csv, tsv, xlsx, xlsm, xlsb, xls, ods)
        source: PathBuf,

        /// Destination file (csv, tsv, xlsx, xlsm, xlsb, xls, ods)
        destination: PathBuf,

        /// Sheet to read from a multi-sheet source workbook
        #[arg(long)]
        source_sheet: Option<String>,

        /// Sheet to read from a multi-sheet destination workbook
        #[arg(long)]
        destination_sheet: Option<String>,

        /// Directory to write mapping_results.json into
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a file's preview and extracted columns (no API call)
    Columns {
        /// File to inspect
        file: PathBuf,

        /// Sheet to read from a multi-sheet workbook
        #[arg(short, long)]
        sheet: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the sheets of a workbook
    Sheets {
        /// Workbook to inspect
        file: PathBuf,
    },

    /// Interactive session: upload, pick sheets, map, save
    Repl,

    /// Show the application log
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },
}

/// Help footer with the environment the tool expects
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();
    help.push_str("Environment:\n");
    help.push_str(&format!("  {:10} Mapping service endpoint (required)\n", API_URL_ENV));
    help.push_str(&format!("  {:10} Mapping service credential (required)\n", API_KEY_ENV));
    help.push('\n');
    help.push_str(&format!(
        "Logs are written to: {} (configurable)\n",
        LoggingConfig::default().path().display()
    ));
    help
}

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" | "table" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
