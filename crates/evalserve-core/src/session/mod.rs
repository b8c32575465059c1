//! Eval sessions
//!
//! A session binds one eval to one completion function and one recorder.
//! [`run_one`] grades a single caller-supplied sample, [`collect_samples`]
//! enumerates the eval's dataset without grading and [`run_all`] grades the
//! whole dataset.

mod args;
mod builder;
mod params;
mod run_spec;

use std::sync::Arc;

use tracing::info;

pub use args::{DEFAULT_SEED, EvalSessionArguments};
pub use builder::{EvalSession, RESERVED_PARAMS, build_session};
pub use params::{ExtraEvalParams, ParamValue, parse_extra_eval_params};
pub use run_spec::{COMPLETION_FN_NAME, InitialSettings, RunDescriptor, RunSpec};

use crate::completion::CompletionFn;
use crate::error::SessionResult;
use crate::harness::{ExecutionMode, ProgressCallback, RunOutcome, run_eval};
use crate::registry::Registry;
use crate::report::Report;
use crate::sample::Sample;

impl EvalSession {
    /// Drive the eval under `mode`
    pub async fn run(
        &self,
        mode: ExecutionMode,
        progress: Option<&ProgressCallback>,
    ) -> SessionResult<RunOutcome> {
        run_eval(
            self.eval.as_ref(),
            &self.recorder,
            mode,
            self.options.clone(),
            progress,
        )
        .await
    }
}

/// Grade exactly one sample, ignoring the eval's dataset
///
/// Returns the raw report; the recorder receives it as the final report.
pub async fn run_one(session: &EvalSession, sample: Sample) -> SessionResult<Report> {
    let outcome = session.run(ExecutionMode::SingleSample(sample), None).await?;
    session.recorder.record_final_report(&outcome.report)?;
    Ok(outcome.report)
}

/// Enumerate the eval's samples, tagged with the requested eval name
///
/// Grades nothing and never calls the completion function.
pub async fn collect_samples(session: &EvalSession) -> SessionResult<Vec<Sample>> {
    let mode = ExecutionMode::CollectOnly {
        eval: session.requested_eval.clone(),
    };
    let outcome = session.run(mode, None).await?;
    Ok(outcome.collected)
}

/// Grade the eval's whole dataset
pub async fn run_all(
    session: &EvalSession,
    progress: Option<&ProgressCallback>,
) -> SessionResult<Report> {
    let outcome = session.run(ExecutionMode::FullBatch, progress).await?;
    info!(
        run_id = %session.run_id(),
        graded = outcome.graded,
        "Final report: {}",
        outcome.report
    );
    session.recorder.record_final_report(&outcome.report)?;
    Ok(outcome.report)
}

/// Build a session and grade one sample with it
pub async fn evaluate_sample(
    args: &EvalSessionArguments,
    completion_fn: Arc<dyn CompletionFn>,
    sample: Sample,
    registry: Option<Registry>,
) -> SessionResult<Report> {
    let (session, _recorder) = build_session(args, completion_fn, registry)?;
    run_one(&session, sample).await
}

/// Build a session and enumerate its samples
pub async fn gather_samples(
    args: &EvalSessionArguments,
    completion_fn: Arc<dyn CompletionFn>,
    registry: Option<Registry>,
) -> SessionResult<Vec<Sample>> {
    let (session, _recorder) = build_session(args, completion_fn, registry)?;
    collect_samples(&session).await
}
