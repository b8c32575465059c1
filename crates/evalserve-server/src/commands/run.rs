//! Full-batch eval command

use std::sync::Arc;

use anyhow::{Context, Result};
use evalserve_core::harness::{ProgressCallback, SampleProgress};
use evalserve_core::{StubCompletionFn, build_session, run_all};
use evalserve_server::ServerConfig;

use crate::args::RunArgs;
use crate::console::CliConsole;

/// Grade every sample of the eval with the dummy completion function
///
/// Flags not given on the command line come from `config`.
pub async fn execute(args: RunArgs, config: &ServerConfig) -> Result<()> {
    let session_args = args.into_session_args(config);

    let stub = Arc::new(StubCompletionFn::new());
    let (session, recorder) = build_session(&session_args, stub.clone(), None)
        .with_context(|| format!("Failed to build session for {}", session_args.eval))?;

    let console = CliConsole::new(session.visible());
    if session_args.dry_run {
        console.warn("Dry run requested; results are still recorded locally");
    }
    console.print_header(&format!("Eval: {}", session.eval().name()));
    console.info(&format!("Run ID: {}", session.run_id()));

    let bar = console.sample_progress(0);
    let progress_bar = bar.clone();
    let callback: ProgressCallback = Box::new(move |progress: SampleProgress| {
        progress_bar.set_length(progress.total as u64);
        progress_bar.set_position(progress.current as u64);
        progress_bar.set_message(progress.sample_id);
    });

    let result = run_all(&session, Some(&callback)).await;
    bar.finish_and_clear();
    let report = result?;

    console.print_header("Final report");
    console.print_report(&report);
    console.success(&format!(
        "Graded with {} completion call(s), {} event(s) recorded",
        stub.call_count(),
        recorder.event_count()
    ));
    if let Some(path) = recorder.log_path() {
        console.info(&format!("Events written to {}", path.display()));
    }
    Ok(())
}
