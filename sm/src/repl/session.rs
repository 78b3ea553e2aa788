//! REPL session management

use std::path::{Path, PathBuf};

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::pipeline::{Pipeline, PipelineError, Slot, SlotState};
use crate::present::{self, Export, TabularView};
use crate::table::UploadedFile;

/// Interactive mapping session
pub struct ReplSession {
    pipeline: Pipeline,
    preview_rows: usize,
    output_dir: PathBuf,
}

/// What a parsed input line asks for
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReplCommand {
    Upload { slot: Slot, path: PathBuf, sheet: Option<String> },
    Sheet { slot: Slot, sheet: String },
    Map,
    Save { dir: Option<PathBuf> },
    Status,
    Reset,
    Help,
    Quit,
    Unknown(String),
    Usage(&'static str),
}

impl ReplSession {
    /// Create a new session around `pipeline`
    pub fn new(pipeline: Pipeline, preview_rows: usize, output_dir: PathBuf) -> Self {
        Self {
            pipeline,
            preview_rows,
            output_dir,
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        // Create readline editor for proper line editing
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    match parse_command(input) {
                        ReplCommand::Quit => break,
                        command => self.dispatch(command, &mut rl).await,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - exit
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn dispatch(&mut self, command: ReplCommand, rl: &mut DefaultEditor) {
        debug!(?command, "dispatch: called");
        match command {
            ReplCommand::Upload { slot, path, sheet } => self.upload(slot, &path, sheet.as_deref(), rl),
            ReplCommand::Sheet { slot, sheet } => {
                let outcome = self.pipeline.select_sheet(slot, &sheet);
                self.report_upload(slot, outcome, rl);
            }
            ReplCommand::Map => self.generate().await,
            ReplCommand::Save { dir } => self.save(dir.as_deref()),
            ReplCommand::Status => self.print_status(),
            ReplCommand::Reset => {
                self.pipeline.reset();
                println!("{}", "Session cleared.".dimmed());
            }
            ReplCommand::Help => self.print_help(),
            ReplCommand::Quit => {}
            ReplCommand::Unknown(cmd) => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
            ReplCommand::Usage(usage) => println!("{} {}", "Usage:".yellow(), usage),
        }
    }

    /// Print welcome message
    fn print_welcome(&self) {
        println!();
        println!("{}", "Schema Mapping".bright_cyan().bold());
        println!("Upload source and destination files to extract column names and map them using AI.");
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    /// Print help message
    fn print_help(&self) {
        println!();
        println!("{}", "Step 1: Upload Source and Destination Files".bright_cyan());
        println!("  {:28} Load the source file (CSV/Excel)", "/source <file> [sheet]".yellow());
        println!("  {:28} Load the destination file (CSV/Excel)", "/dest <file> [sheet]".yellow());
        println!("  {:28} Pick the sheet of a pending workbook", "/sheet <source|dest> <name>".yellow());
        println!();
        println!("{}", "Step 2: Generate Mapping".bright_cyan());
        println!("  {:28} Send both column lists to the mapping service", "/map".yellow());
        println!("  {:28} Write mapping_results.json", "/save [dir]".yellow());
        println!();
        println!("  {:28} Show what is loaded", "/status".yellow());
        println!("  {:28} Forget both files and the mapping", "/reset".yellow());
        println!("  {:28} Exit", "/quit".yellow());
        println!();
    }

    fn upload(&mut self, slot: Slot, path: &Path, sheet: Option<&str>, rl: &mut DefaultEditor) {
        let file = match UploadedFile::from_path(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("{} file not uploaded: {}", slot.title(), e);
                println!("{} Please upload a valid {} file: {}", "Warning:".yellow(), slot, e);
                return;
            }
        };

        let outcome = self.pipeline.upload(slot, file, sheet);
        self.report_upload(slot, outcome, rl);
    }

    /// Show the outcome of an upload, prompting for a sheet when one is needed
    fn report_upload(
        &mut self,
        slot: Slot,
        outcome: Result<crate::table::ColumnList, PipelineError>,
        rl: &mut DefaultEditor,
    ) {
        match outcome {
            Ok(columns) => {
                if let Some(table) = self.pipeline.state().slot(slot).table() {
                    println!();
                    println!("{}", format!("{} File Preview", slot.title()).bright_cyan());
                    print!("{}", TabularView::preview(table, self.preview_rows).render());
                }
                println!("{} {}", format!("{} Columns:", slot.title()).bold(), columns);
                println!();
            }
            Err(err) => {
                if let Some((_, sheets)) = err.pending_sheets() {
                    let sheets = sheets.to_vec();
                    if let Some(choice) = prompt_sheet(slot, &sheets, rl) {
                        let outcome = self.pipeline.select_sheet(slot, &choice);
                        self.report_upload(slot, outcome, rl);
                    } else {
                        println!(
                            "{} Use {} to continue.",
                            "No sheet selected.".dimmed(),
                            format!("/sheet {} <name>", slot).yellow()
                        );
                    }
                    return;
                }
                if let PipelineError::Load {
                    source: crate::table::LoadError::SheetNotFound { .. },
                    ..
                } = &err
                {
                    println!("{} {}", "Error:".red(), err);
                    println!("Use {} to pick one of the listed sheets.", format!("/sheet {} <name>", slot).yellow());
                    return;
                }
                println!("{} {}", "Error:".red(), err);
            }
        }
    }

    async fn generate(&mut self) {
        println!("{}", "Processing... Please wait.".dimmed());
        match self.pipeline.generate_mapping().await {
            Ok(report) => {
                println!();
                println!("{}", "Mapping Results".bright_cyan());
                print!("{}", report.view.render());
                println!();
                println!(
                    "Use {} to download the results as {}",
                    "/save [dir]".yellow(),
                    report.export.file_name
                );
            }
            Err(err @ PipelineError::MissingInput { .. }) => {
                println!("{} {}", "Warning:".yellow(), err);
            }
            Err(err) => {
                println!("{} {}", "Error:".red(), err);
            }
        }
    }

    /// Export of the mapping the pipeline currently holds, if any
    pub(crate) fn current_export(&self) -> Option<Result<Export, serde_json::Error>> {
        self.pipeline.state().mapping_result().map(present::export)
    }

    fn save(&self, dir: Option<&Path>) {
        let export = match self.current_export() {
            Some(Ok(export)) => export,
            Some(Err(e)) => {
                tracing::error!("Failed to serialize mapping results: {}", e);
                println!("{} Failed to serialize mapping results: {}", "Error:".red(), e);
                return;
            }
            None => {
                println!("{} Generate a mapping with {} first.", "Nothing to save.".yellow(), "/map".yellow());
                return;
            }
        };

        let dir = dir.unwrap_or(&self.output_dir);
        match export.write_to(dir) {
            Ok(path) => println!("{} Saved {} ({})", "✓".green(), path.display(), export.mime_type),
            Err(e) => {
                tracing::error!("Failed to write mapping results: {}", e);
                println!("{} Failed to write mapping results: {}", "Error:".red(), e);
            }
        }
    }

    fn print_status(&self) {
        let state = self.pipeline.state();
        println!();
        println!("{} {}", "Phase:".bright_cyan(), state.phase());
        for slot in Slot::ALL {
            let line = match state.slot(slot) {
                SlotState::Empty => "not uploaded".dimmed().to_string(),
                SlotState::AwaitingSheet { file, sheets } => {
                    format!("{} (choose a sheet: {})", file.name(), sheets.join(", "))
                }
                SlotState::Loaded {
                    file_name,
                    sheet,
                    columns,
                    ..
                } => match sheet {
                    Some(sheet) => format!("{} [{}] {}", file_name, sheet, columns),
                    None => format!("{} {}", file_name, columns),
                },
                SlotState::Failed { file_name, error } => format!("{} {}", file_name, error.red()),
            };
            println!("  {:12} {}", format!("{}:", slot.title()), line);
        }
        if let Some(result) = state.mapping_result() {
            println!("  {:12} {} entries", "Mapping:", result.len());
        }
        println!();
    }
}

/// Ask the user to pick a sheet by number or name; `None` if they decline
fn prompt_sheet(slot: Slot, sheets: &[String], rl: &mut DefaultEditor) -> Option<String> {
    println!();
    println!("{}", format!("Select Sheet for {} File", slot.title()).bright_cyan());
    for (idx, sheet) in sheets.iter().enumerate() {
        println!("  {}. {}", idx + 1, sheet);
    }

    loop {
        let line = rl.readline(&format!("{} ", "sheet>".bright_green())).ok()?;
        let input = line.trim();
        if input.is_empty() {
            return None;
        }
        match resolve_sheet_choice(input, sheets) {
            Some(sheet) => return Some(sheet),
            None => println!("{} Enter a number between 1 and {} or a sheet name", "?".yellow(), sheets.len()),
        }
    }
}

/// Accept a 1-based index or an exact sheet name
pub(crate) fn resolve_sheet_choice(input: &str, sheets: &[String]) -> Option<String> {
    if let Some(sheet) = sheets.iter().find(|s| s.as_str() == input) {
        return Some(sheet.clone());
    }
    input
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=sheets.len()).contains(n))
        .map(|n| sheets[n - 1].clone())
}

/// Split a line on whitespace, keeping single- or double-quoted runs together
pub(crate) fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if in_token {
        args.push(current);
    }
    args
}

/// Parse one input line into a command
///
/// Paths and sheet names containing spaces must be quoted.
pub(crate) fn parse_command(input: &str) -> ReplCommand {
    let parts = split_args(input);
    let cmd = parts.first().map(String::as_str).unwrap_or("");
    let args = &parts[parts.len().min(1)..];

    match cmd {
        "/source" | "/src" | "/dest" | "/destination" => {
            let slot = if cmd.starts_with("/s") { Slot::Source } else { Slot::Destination };
            match args {
                [path] => ReplCommand::Upload {
                    slot,
                    path: PathBuf::from(path),
                    sheet: None,
                },
                [path, sheet @ ..] if !sheet.is_empty() => ReplCommand::Upload {
                    slot,
                    path: PathBuf::from(path),
                    sheet: Some(sheet.join(" ")),
                },
                _ => ReplCommand::Usage("/source <file> [sheet] | /dest <file> [sheet]"),
            }
        }
        "/sheet" => match args {
            [slot, sheet @ ..] if !sheet.is_empty() => match slot.parse::<Slot>() {
                Ok(slot) => ReplCommand::Sheet {
                    slot,
                    sheet: sheet.join(" "),
                },
                Err(_) => ReplCommand::Usage("/sheet <source|dest> <name>"),
            },
            _ => ReplCommand::Usage("/sheet <source|dest> <name>"),
        },
        "/map" | "/generate" => ReplCommand::Map,
        "/save" | "/download" => ReplCommand::Save {
            dir: args.first().map(PathBuf::from),
        },
        "/status" | "/s" => ReplCommand::Status,
        "/reset" | "/clear" | "/c" => ReplCommand::Reset,
        "/help" | "/h" => ReplCommand::Help,
        "/quit" | "/q" | "/exit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}
