//! Pipeline error types

use thiserror::Error;

use super::Slot;
use crate::mapping::MappingError;
use crate::table::LoadError;

/// Errors surfaced by the orchestrator, one per failed step
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Error reading {slot} file: {source}")]
    Load {
        slot: Slot,
        #[source]
        source: LoadError,
    },

    #[error(
        "Please upload both source and destination files before generating mapping (missing: {})",
        join_slots(missing)
    )]
    MissingInput { missing: Vec<Slot> },

    #[error("no sheet selection is pending for the {0} file")]
    NoPendingSheet(Slot),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("failed to serialize mapping results: {0}")]
    Export(String),
}

impl PipelineError {
    /// Sheets to choose from when a workbook is waiting for a selection
    pub fn pending_sheets(&self) -> Option<(Slot, &[String])> {
        match self {
            PipelineError::Load { slot, source } => source.pending_sheets().map(|sheets| (*slot, sheets)),
            _ => None,
        }
    }
}

fn join_slots(slots: &[Slot]) -> String {
    slots.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
}
