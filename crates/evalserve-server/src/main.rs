//! Evalserve command-line application
//!
//! ```bash
//! evalserve serve --bind 0.0.0.0:8000
//! evalserve run test-match --max-samples 2
//! evalserve dataset test-match
//! ```
//!
//! Set `RUST_LOG=debug` for verbose logging.

mod args;
mod commands;
mod console;
mod router;

use clap::Parser;

use crate::args::Cli;
use crate::console::CliConsole;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    evalserve_server::init_tracing(cli.log_format);

    if let Err(e) = router::route(cli).await {
        CliConsole::new(true).error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
