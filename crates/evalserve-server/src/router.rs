//! Command routing logic for CLI

use anyhow::Result;
use evalserve_server::ServerConfig;

use crate::args::{Cli, Commands};
use crate::commands;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> Result<()> {
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            bind,
            default_eval,
            registry_path,
        } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(default_eval) = default_eval {
                config.default_eval = default_eval;
            }
            config.registry_paths.extend(registry_path);
            commands::serve::execute(config).await
        }
        Commands::Run(args) => commands::run::execute(args, &config).await,
        Commands::Dataset {
            eval,
            max_samples,
            registry_path,
        } => commands::dataset::execute(&config, &eval, max_samples, &registry_path).await,
        Commands::List { registry_path } => commands::list::execute(&config, &registry_path),
    }
}
