//! Evalserve
//!
//! Drives batch LLM evals one sample at a time. The [`core`] crate holds the
//! registry, harness and session layer; [`server`] exposes them over HTTP.

pub use evalserve_core as core;
pub use evalserve_server as server;

pub use evalserve_core::{
    CompletionFn, EvalSession, EvalSessionArguments, Registry, Report, Sample, SessionError,
    StubCompletionFn, build_session, collect_samples, run_all, run_one, sanitize, wire_response,
};
