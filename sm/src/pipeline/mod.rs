//! Session pipeline: slot state and the orchestrator that drives it

mod error;
mod orchestrator;
mod state;

pub use error::PipelineError;
pub use orchestrator::{MappingReport, Pipeline};
pub use state::{MappingState, Phase, PipelineState, Slot, SlotState};
