//! Dataset enumeration command

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use evalserve_core::{StubCompletionFn, gather_samples};
use evalserve_server::ServerConfig;

use super::load_registry;

/// Print the samples of `eval` as a JSON array
pub async fn execute(
    config: &ServerConfig,
    eval: &str,
    max_samples: Option<usize>,
    registry_path: &[PathBuf],
) -> Result<()> {
    let registry = load_registry(&config.registry_paths, registry_path)?;
    let mut args = config.session_args(eval);
    args.max_samples = max_samples.or(config.max_samples);

    let samples = gather_samples(&args, Arc::new(StubCompletionFn::new()), Some(registry))
        .await
        .with_context(|| format!("Failed to collect samples for {}", eval))?;

    let output = serde_json::to_string_pretty(&samples).context("Failed to encode samples")?;
    println!("{}", output);
    Ok(())
}
