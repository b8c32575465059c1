//! Session construction

use std::sync::Arc;

use serde_json::Map;
use tracing::{debug, info};

use super::args::EvalSessionArguments;
use super::params::{ExtraEvalParams, parse_extra_eval_params};
use super::run_spec::{RunDescriptor, RunSpec};
use crate::completion::CompletionFn;
use crate::error::{SessionError, SessionResult};
use crate::harness::{Eval, EvalInit, RunOptions};
use crate::recorder::Recorder;
use crate::registry::{EvalSpec, Registry};

/// Keyword names the session injects itself; extra params may not use them
pub const RESERVED_PARAMS: [&str; 5] = ["completion_fns", "seed", "name", "registry", "max_samples"];

/// A configured eval, ready to run in any execution mode
pub struct EvalSession {
    pub(super) eval: Box<dyn Eval>,
    pub(super) recorder: Recorder,
    pub(super) run_spec: RunSpec,
    pub(super) requested_eval: String,
    pub(super) options: RunOptions,
}

impl EvalSession {
    pub fn eval(&self) -> &dyn Eval {
        self.eval.as_ref()
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn run_spec(&self) -> &RunSpec {
        &self.run_spec
    }

    pub fn run_id(&self) -> &str {
        &self.run_spec.run_id
    }

    /// Eval name as requested, before alias resolution
    pub fn requested_eval(&self) -> &str {
        &self.requested_eval
    }

    pub fn visible(&self) -> bool {
        self.options.show_progress
    }
}

impl std::fmt::Debug for EvalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalSession")
            .field("eval", &self.eval.name())
            .field("run_id", &self.run_spec.run_id)
            .field("requested_eval", &self.requested_eval)
            .finish()
    }
}

/// Build a session for `args.eval` around the given completion function
///
/// Uses `registry` if supplied, the built-in registry otherwise; either way
/// extended with `args.registry_path`. Returns the session together with a
/// handle to its recorder.
pub fn build_session(
    args: &EvalSessionArguments,
    completion_fn: Arc<dyn CompletionFn>,
    registry: Option<Registry>,
) -> SessionResult<(EvalSession, Recorder)> {
    let visible = args.resolved_visible();

    let mut registry = match registry {
        Some(registry) => registry,
        None => Registry::builtin()?,
    };
    if !args.registry_path.is_empty() {
        registry.add_registry_paths(&args.registry_path);
    }

    let eval_spec = registry
        .get_eval(&args.eval)
        .ok_or_else(|| SessionError::EvalNotFound {
            name: args.eval.clone(),
            available: registry.eval_names(),
        })?;
    debug!("Resolved eval {} to {}", args.eval, eval_spec.key);

    let extra_params = parse_extra_eval_params(&args.extra_eval_params)?;

    let descriptor = RunDescriptor::new(eval_spec.clone(), args.seed, args.max_samples, visible);
    let run_spec = RunSpec::new(descriptor, &args.user)?;

    let recorder = match &args.log_to_file {
        Some(path) => Recorder::with_log_file(&run_spec, path)?,
        None => Recorder::new(&run_spec),
    };
    info!(run_id = %run_spec.run_id, "Run started: {}", run_spec.run_id);

    let class = registry.get_class(&eval_spec)?;
    let params = merge_params(&eval_spec, &extra_params)?;
    let init = EvalInit {
        completion_fns: vec![completion_fn],
        seed: args.seed,
        name: eval_spec.key.clone(),
        registry: Arc::new(registry),
        max_samples: args.max_samples,
        params,
    };
    let eval = class.instantiate(init)?;

    let session = EvalSession {
        eval,
        recorder: recorder.clone(),
        run_spec,
        requested_eval: args.eval.clone(),
        options: RunOptions {
            show_progress: visible,
            record_raw_sample: true,
        },
    };
    Ok((session, recorder))
}

/// Registry args overlaid with the extra params
fn merge_params(
    spec: &EvalSpec,
    extra: &ExtraEvalParams,
) -> SessionResult<Map<String, serde_json::Value>> {
    let mut params = spec.args.clone();
    for (key, value) in extra {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            return Err(SessionError::construction(
                &spec.key,
                format!("got multiple values for keyword argument '{key}'"),
            ));
        }
        params.insert(key.clone(), value.to_json());
    }
    Ok(params)
}
