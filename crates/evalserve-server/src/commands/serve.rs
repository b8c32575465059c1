//! HTTP server command

use anyhow::{Context, Result};
use evalserve_server::{ApiState, ServerConfig, app};
use tokio::net::TcpListener;

use super::load_registry;
use crate::console::CliConsole;

/// Serve the API until the process is stopped
pub async fn execute(config: ServerConfig) -> Result<()> {
    let console = CliConsole::new(true);
    let registry = load_registry(&config.registry_paths, &[])?;
    tracing::info!(
        evals = registry.eval_names().len(),
        "Registry loaded from {} path(s)",
        registry.paths().len()
    );

    let bind_addr = config.bind_addr.clone();
    let state = ApiState::new(registry, config);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    console.success(&format!("Listening on http://{}", bind_addr));

    axum::serve(listener, app(state))
        .await
        .context("Server terminated")?;
    Ok(())
}
