//! CLI command dispatch and handlers.
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod contributors;
pub mod headings;
pub mod render;
pub mod scan;
pub mod theme;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use crate::cli::args::{Cli, Commands};
use crate::error::{BooknavError, StoreError};
use crate::store::{FileStore, MemoryStore, PreferenceStore};

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), BooknavError> {
    match cli.command {
        Commands::Scan(args) => scan::run(&args),
        Commands::Headings(args) => headings::run(&args).await,
        Commands::Render(args) => render::run(&args).await,
        Commands::Contributors(args) => contributors::run(&args).await,
        Commands::Theme(args) => theme::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Opens the file-backed store at `path`, or an in-memory store.
fn open_store(path: Option<&Path>) -> Result<Arc<dyn PreferenceStore>, StoreError> {
    Ok(match path {
        Some(path) => Arc::new(FileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    })
}
