//! Per-session pipeline state

use std::fmt;

use crate::mapping::MappingResult;
use crate::table::{ColumnList, Table, UploadedFile};

/// Which of the two uploaded files an action refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Source,
    Destination,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Source, Slot::Destination];

    /// Capitalized label for log and user messages
    pub fn title(&self) -> &'static str {
        match self {
            Slot::Source => "Source",
            Slot::Destination => "Destination",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Source => write!(f, "source"),
            Slot::Destination => write!(f, "destination"),
        }
    }
}

impl std::str::FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "source" | "src" => Ok(Slot::Source),
            "destination" | "dest" | "dst" => Ok(Slot::Destination),
            _ => Err(format!("Unknown slot: {}. Use: source or dest", s)),
        }
    }
}

/// State of one upload slot
#[derive(Debug, Clone, Default)]
pub enum SlotState {
    /// Nothing uploaded yet
    #[default]
    Empty,
    /// A multi-sheet workbook is waiting for the user to pick a sheet
    AwaitingSheet { file: UploadedFile, sheets: Vec<String> },
    /// File parsed and columns extracted
    Loaded {
        file_name: String,
        sheet: Option<String>,
        table: Table,
        columns: ColumnList,
    },
    /// Loading failed; the message is what the user was shown
    Failed { file_name: String, error: String },
}

impl SlotState {
    /// Extracted columns, if the slot loaded successfully
    pub fn columns(&self) -> Option<&ColumnList> {
        match self {
            SlotState::Loaded { columns, .. } => Some(columns),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            SlotState::Loaded { table, .. } => Some(table),
            _ => None,
        }
    }

    /// Loaded with at least one column
    pub fn is_ready(&self) -> bool {
        self.columns().is_some_and(|c| !c.is_empty())
    }
}

/// State of the mapping step
#[derive(Debug, Clone, Default)]
pub enum MappingState {
    #[default]
    NotRun,
    /// Request issued, waiting for the service
    Pending,
    Mapped(MappingResult),
    Failed(String),
}

/// Coarse position in the upload -> map state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    SourceLoaded,
    DestinationLoaded,
    ReadyToMap,
    Mapping,
    Mapped,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Idle => "idle",
            Phase::SourceLoaded => "source loaded",
            Phase::DestinationLoaded => "destination loaded",
            Phase::ReadyToMap => "ready to map",
            Phase::Mapping => "mapping",
            Phase::Mapped => "mapped",
            Phase::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// Everything one session knows; never shared between sessions
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub source: SlotState,
    pub destination: SlotState,
    pub mapping: MappingState,
}

impl PipelineState {
    pub fn slot(&self, slot: Slot) -> &SlotState {
        match slot {
            Slot::Source => &self.source,
            Slot::Destination => &self.destination,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut SlotState {
        match slot {
            Slot::Source => &mut self.source,
            Slot::Destination => &mut self.destination,
        }
    }

    /// Slots that still lack a usable column list
    pub fn missing_slots(&self) -> Vec<Slot> {
        Slot::ALL.into_iter().filter(|s| !self.slot(*s).is_ready()).collect()
    }

    pub fn mapping_result(&self) -> Option<&MappingResult> {
        match &self.mapping {
            MappingState::Mapped(result) => Some(result),
            _ => None,
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.mapping {
            MappingState::Pending => return Phase::Mapping,
            MappingState::Mapped(_) => return Phase::Mapped,
            MappingState::Failed(_) => return Phase::Failed,
            MappingState::NotRun => {}
        }

        if matches!(self.source, SlotState::Failed { .. }) || matches!(self.destination, SlotState::Failed { .. }) {
            return Phase::Failed;
        }

        match (self.source.is_ready(), self.destination.is_ready()) {
            (true, true) => Phase::ReadyToMap,
            (true, false) => Phase::SourceLoaded,
            (false, true) => Phase::DestinationLoaded,
            (false, false) => Phase::Idle,
        }
    }
}
