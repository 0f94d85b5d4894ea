mod check;
mod demo;
mod root;

pub use check::CheckCommand;
pub use demo::DemoCommand;
pub use root::Cli;

use anyhow::{Context, Result};
use dialogq::dialogs::{parse_definitions, DialogDefinition};
use std::path::Path;
use tracing::debug;

/// Read and parse a dialog definitions file
pub fn load_definitions(path: &Path) -> Result<Vec<DialogDefinition>> {
    debug!("Loading dialog definitions from: {}", path.display());
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read definitions file {}", path.display()))?;
    parse_definitions(&json).with_context(|| format!("Invalid definitions file {}", path.display()))
}
