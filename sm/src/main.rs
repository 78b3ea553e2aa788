//! schemamap - AI column mapping between two tabular files
//!
//! CLI entry point: one-shot mapping, file inspection and the interactive session.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, error, info};

use schemamap::cli::{Cli, Command, OutputFormat, generate_after_help};
use schemamap::config::{ApiSettings, Config, LoggingConfig};
use schemamap::mapping::{HttpMappingClient, MappingClient};
use schemamap::pipeline::{Pipeline, Slot};
use schemamap::present::TabularView;
use schemamap::repl;
use schemamap::table::{self, UploadedFile};

fn parse_level(level: &str) -> tracing::Level {
    match level.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "INFO" => tracing::Level::INFO,
        "WARN" | "WARNING" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", level);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, logging: &LoggingConfig) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    fs::create_dir_all(&logging.dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = parse_level(cli_log_level.unwrap_or(&logging.level));

    // Appended so earlier sessions stay readable through `sm logs`
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(logging.path())
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Mapping app initialized. (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Logging first so problems with the full config load end up in the log
    let logging = Config::load_logging(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), &logging).context("Failed to setup logging")?;

    let config = match Config::load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e).context("Failed to load configuration");
        }
    };

    let result = dispatch(cli.command, &config).await;
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

async fn dispatch(command: Option<Command>, config: &Config) -> Result<()> {
    debug!(?command, "dispatch: called");
    match command {
        Some(Command::Map {
            source,
            destination,
            source_sheet,
            destination_sheet,
            output,
            format,
        }) => {
            let client = build_client(config)?;
            let inputs = MapInputs {
                source: &source,
                destination: &destination,
                source_sheet: source_sheet.as_deref(),
                destination_sheet: destination_sheet.as_deref(),
            };
            cmd_map(client, inputs, output.as_deref(), format).await
        }
        Some(Command::Columns { file, sheet, format }) => {
            require_api_settings(config)?;
            cmd_columns(&file, sheet.as_deref(), format, config.preview.rows)
        }
        Some(Command::Sheets { file }) => {
            require_api_settings(config)?;
            cmd_sheets(&file)
        }
        Some(Command::Repl) => {
            let client = build_client(config)?;
            repl::run_interactive(config, client).await
        }
        Some(Command::Logs { lines }) => cmd_logs(&config.logging.path(), lines),
        None => {
            Cli::command().after_help(generate_after_help()).print_help()?;
            Ok(())
        }
    }
}

/// Missing API settings are fatal at startup, before any file is read
fn require_api_settings(config: &Config) -> Result<ApiSettings> {
    let settings = config
        .api_settings()
        .context("Mapping service not configured. Set API_URL and API_KEY.")?;
    info!(endpoint = %settings.url, "Mapping service configured");
    Ok(settings)
}

/// Resolve API settings and build the HTTP mapping client
fn build_client(config: &Config) -> Result<Arc<dyn MappingClient>> {
    let settings = require_api_settings(config)?;
    let client = HttpMappingClient::new(&settings).context("Failed to create mapping client")?;
    Ok(Arc::new(client))
}

struct MapInputs<'a> {
    source: &'a Path,
    destination: &'a Path,
    source_sheet: Option<&'a str>,
    destination_sheet: Option<&'a str>,
}

/// Upload both files, request the mapping and print it
async fn cmd_map(
    client: Arc<dyn MappingClient>,
    inputs: MapInputs<'_>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    debug!(source = ?inputs.source, destination = ?inputs.destination, ?format, "cmd_map: called");
    let mut pipeline = Pipeline::new(client);

    for (slot, path, sheet) in [
        (Slot::Source, inputs.source, inputs.source_sheet),
        (Slot::Destination, inputs.destination, inputs.destination_sheet),
    ] {
        let file = UploadedFile::from_path(path)?;
        let columns = pipeline.upload(slot, file, sheet)?;
        if format == OutputFormat::Text {
            println!("{} {}", format!("{} Columns:", slot.title()).bold(), columns);
        }
    }

    let report = pipeline.generate_mapping().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", String::from_utf8_lossy(&report.export.bytes));
        }
        OutputFormat::Text => {
            println!();
            println!("{}", "Mapping Results".bright_cyan());
            print!("{}", report.view.render());
        }
    }

    if let Some(dir) = output {
        let path = report
            .export
            .write_to(dir)
            .context("Failed to write mapping results")?;
        eprintln!("{} Saved {}", "✓".green(), path.display());
    }

    Ok(())
}

/// Print a file's preview and column list
fn cmd_columns(path: &Path, sheet: Option<&str>, format: OutputFormat, preview_rows: usize) -> Result<()> {
    debug!(?path, ?sheet, ?format, "cmd_columns: called");
    let file = UploadedFile::from_path(path)?;
    let table = table::load(&file, sheet)?;
    let columns = table::extract(&table);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&columns)?);
        }
        OutputFormat::Text => {
            println!("{}", format!("{} Preview", file.name()).bright_cyan());
            print!("{}", TabularView::preview(&table, preview_rows).render());
            println!();
            println!("{} {}", "Columns:".bold(), columns);
        }
    }
    Ok(())
}

/// List the sheets of a workbook
fn cmd_sheets(path: &Path) -> Result<()> {
    debug!(?path, "cmd_sheets: called");
    let file = UploadedFile::from_path(path)?;
    let sheets = table::sheet_names(&file)?;

    if sheets.is_empty() {
        println!("{} is not a workbook; it has no sheets", file.name());
    }
    for (idx, sheet) in sheets.iter().enumerate() {
        println!("{:>3}. {}", idx + 1, sheet);
    }
    Ok(())
}

/// Show the last `lines` lines of the log file
fn cmd_logs(log_path: &Path, lines: usize) -> Result<()> {
    debug!(?log_path, lines, "cmd_logs: called");
    if !log_path.exists() {
        println!("No log file found at: {}", log_path.display());
        return Ok(());
    }

    let file = fs::File::open(log_path).context("Failed to open log file")?;
    let reader = BufReader::new(file);
    let all_lines: Vec<String> = reader.lines().map_while(Result::ok).collect();

    let start = all_lines.len().saturating_sub(lines);
    for line in &all_lines[start..] {
        println!("{}", line);
    }
    Ok(())
}
