//! Evalserve core: drive batch evals one sample at a time
//!
//! This crate adapts a batch evaluation harness (a registry of evals, each
//! a dataset plus grading logic) to a request/response model.
//!
//! # Features
//!
//! - **Session setup**: resolve an eval by name, parse extra parameters and
//!   wire a pluggable completion function into the eval
//! - **Execution modes**: full batch, a single caller-supplied sample, or
//!   sample collection without grading
//! - **Completion stub**: records every prompt and answers with a dummy
//!   completion
//! - **Report sanitation**: drop non-finite metrics before serialization
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use evalserve_core::{EvalSessionArguments, StubCompletionFn, build_session, run_one};
//!
//! let args = EvalSessionArguments::new("test-match");
//! let (session, _recorder) = build_session(&args, Arc::new(StubCompletionFn::new()), None)?;
//! let report = run_one(&session, sample).await?;
//! let clean = evalserve_core::sanitize(&report);
//! ```

pub mod completion;
pub mod error;
pub mod evals;
pub mod harness;
pub mod metrics;
pub mod recorder;
pub mod registry;
pub mod report;
pub mod sample;
pub mod session;

// Re-exports for convenience
pub use completion::{
    ChatMessage, CompletionError, CompletionFn, CompletionParams, CompletionResult, Prompt,
    StubCompletionFn,
};
pub use error::{GradingError, SessionError, SessionResult};
pub use harness::{Eval, EvalBase, EvalInit, EvalRun, ExecutionMode, RunOptions, SampleContext};
pub use recorder::{EventKind, RecordedEvent, Recorder};
pub use registry::{EvalSpec, Registry};
pub use report::{MetricValue, Report, sanitize, wire_response};
pub use sample::Sample;
pub use session::{
    EvalSession, EvalSessionArguments, RunDescriptor, RunSpec, build_session, collect_samples,
    evaluate_sample, gather_samples, parse_extra_eval_params, run_all, run_one,
};
