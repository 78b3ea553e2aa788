//! Pipeline orchestrator: upload -> normalize -> extract -> request -> render
//!
//! Each step runs only after the previous one succeeded. Errors are logged
//! where they happen, recorded in the session state and returned to the
//! front end as [`PipelineError`]s.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::{MappingState, PipelineError, PipelineState, Slot, SlotState};
use crate::mapping::{MappingClient, MappingRequest, MappingResult};
use crate::present::{self, Export, TabularView};
use crate::table::{self, ColumnList, LoadError, UploadedFile};

/// Everything the front end needs after a successful mapping
#[derive(Debug, Clone)]
pub struct MappingReport {
    pub result: MappingResult,
    pub view: TabularView,
    pub export: Export,
}

/// One user session's pipeline
pub struct Pipeline {
    client: Arc<dyn MappingClient>,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(client: Arc<dyn MappingClient>) -> Self {
        Self {
            client,
            state: PipelineState::default(),
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Forget both uploads and any mapping result
    pub fn reset(&mut self) {
        info!("Pipeline state reset");
        self.state = PipelineState::default();
    }

    /// Load `file` into `slot` and extract its columns
    ///
    /// Only `slot` is touched. A workbook with several sheets and no (or an
    /// unknown) `sheet` leaves the slot waiting for [`Pipeline::select_sheet`].
    pub fn upload(&mut self, slot: Slot, file: UploadedFile, sheet: Option<&str>) -> Result<ColumnList, PipelineError> {
        info!("{} file uploaded: {}", slot.title(), file.name());
        self.state.mapping = MappingState::NotRun;

        match table::load(&file, sheet) {
            Ok(table) => {
                let columns = table::extract(&table);
                info!("{} file processed with columns: {}", slot.title(), columns);
                *self.state.slot_mut(slot) = SlotState::Loaded {
                    file_name: file.name().to_string(),
                    sheet: sheet.map(str::to_string),
                    table,
                    columns: columns.clone(),
                };
                Ok(columns)
            }
            Err(err) => {
                *self.state.slot_mut(slot) = match &err {
                    LoadError::SheetSelectionRequired { sheets, .. } => {
                        info!("{} file {} needs a sheet selection", slot.title(), file.name());
                        SlotState::AwaitingSheet {
                            sheets: sheets.clone(),
                            file,
                        }
                    }
                    LoadError::SheetNotFound { available, .. } => {
                        warn!("Error reading {} file: {}", slot, err);
                        SlotState::AwaitingSheet {
                            sheets: available.clone(),
                            file,
                        }
                    }
                    _ => {
                        error!("Error reading {} file: {}", slot, err);
                        SlotState::Failed {
                            file_name: file.name().to_string(),
                            error: err.to_string(),
                        }
                    }
                };
                Err(PipelineError::Load { slot, source: err })
            }
        }
    }

    /// Complete a pending upload with the chosen sheet
    pub fn select_sheet(&mut self, slot: Slot, sheet: &str) -> Result<ColumnList, PipelineError> {
        debug!(%slot, %sheet, "select_sheet: called");
        match std::mem::take(self.state.slot_mut(slot)) {
            SlotState::AwaitingSheet { file, .. } => self.upload(slot, file, Some(sheet)),
            other => {
                *self.state.slot_mut(slot) = other;
                Err(PipelineError::NoPendingSheet(slot))
            }
        }
    }

    /// Request a mapping for the two loaded column lists
    ///
    /// A no-op (apart from a warning) unless both slots hold a non-empty
    /// column list; the mapping client is not contacted in that case.
    pub async fn generate_mapping(&mut self) -> Result<MappingReport, PipelineError> {
        let missing = self.state.missing_slots();
        if !missing.is_empty() {
            warn!(?missing, "Attempt to generate mapping without both files uploaded.");
            return Err(PipelineError::MissingInput { missing });
        }

        let empty = ColumnList::default();
        let source = self.state.source.columns().unwrap_or(&empty);
        let destination = self.state.destination.columns().unwrap_or(&empty);
        let request = match MappingRequest::build(source, destination) {
            Ok(request) => request,
            Err(err) => {
                error!("Mapping request rejected despite loaded inputs: {}", err);
                self.state.mapping = MappingState::Failed(err.to_string());
                return Err(err.into());
            }
        };

        self.state.mapping = MappingState::Pending;
        let result = match self.client.submit(&request).await {
            Ok(result) => result,
            Err(err) => {
                self.state.mapping = MappingState::Failed(err.to_string());
                return Err(err.into());
            }
        };

        let export = match present::export(&result) {
            Ok(export) => export,
            Err(e) => {
                let err = PipelineError::Export(e.to_string());
                error!("{}", err);
                self.state.mapping = MappingState::Failed(err.to_string());
                return Err(err);
            }
        };
        let view = present::present(&result);

        self.state.mapping = MappingState::Mapped(result.clone());
        info!(entries = result.len(), "Mapping results displayed and download option enabled.");

        Ok(MappingReport { result, view, export })
    }
}
