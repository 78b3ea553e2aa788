//! Interactive REPL for schemamap
//!
//! Walks the user through the two uploads, optional sheet selection,
//! mapping and saving the results, one slash command at a time.

mod session;

pub use session::ReplSession;

use std::sync::Arc;

use eyre::Result;

use crate::config::Config;
use crate::mapping::MappingClient;
use crate::pipeline::Pipeline;

/// Run the interactive REPL
///
/// This is the main entry point for `sm repl`.
pub async fn run_interactive(config: &Config, client: Arc<dyn MappingClient>) -> Result<()> {
    // Results are saved next to where the session was started unless /save names a directory
    let output_dir = std::env::current_dir()?;

    let mut session = ReplSession::new(Pipeline::new(client), config.preview.rows, output_dir);
    session.run().await
}
