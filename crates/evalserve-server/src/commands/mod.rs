//! CLI command implementations

pub mod dataset;
pub mod list;
pub mod run;
pub mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use evalserve_core::Registry;

/// Built-in registry extended with configured and command-line paths
pub fn load_registry(configured: &[PathBuf], extra: &[PathBuf]) -> Result<Registry> {
    let mut registry = Registry::builtin().context("Failed to load the built-in registry")?;
    let paths: Vec<PathBuf> = configured.iter().chain(extra).cloned().collect();
    if !paths.is_empty() {
        registry.add_registry_paths(&paths);
    }
    Ok(registry)
}
