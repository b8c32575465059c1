//! Registry listing command

use std::path::PathBuf;

use anyhow::Result;
use evalserve_server::ServerConfig;

use super::load_registry;
use crate::console::CliConsole;

pub fn execute(config: &ServerConfig, registry_path: &[PathBuf]) -> Result<()> {
    let console = CliConsole::new(true);
    let registry = load_registry(&config.registry_paths, registry_path)?;

    console.print_header("Registered evals");
    for name in registry.eval_names() {
        match registry.get_eval(&name) {
            Some(spec) if spec.key != name => println!("  {} -> {}", name, spec.key),
            _ => println!("  {}", name),
        }
    }
    Ok(())
}
