//! Built-in eval classes
//!
//! Each class pairs a name, as referenced by registry entries, with a
//! constructor. Constructors deserialize their typed configuration from
//! the merged registry args and extra parameters, so an unknown key or a
//! mistyped value fails construction.

mod fuzzy_match;
mod includes;
mod match_eval;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};

pub use fuzzy_match::{FuzzyMatchConfig, FuzzyMatchEval};
pub use includes::{IncludesConfig, IncludesEval};
pub use match_eval::{MatchConfig, MatchEval};

use crate::completion::{CompletionParams, Prompt};
use crate::error::{GradingError, SessionResult};
use crate::harness::{Eval, EvalBase, EvalInit, SampleContext};
use crate::metrics::{accuracy, bootstrap_std};
use crate::recorder::{EventKind, Recorder};
use crate::report::Report;
use crate::sample::Sample;

/// Constructor of an eval class
pub type EvalConstructor = fn(EvalInit) -> SessionResult<Box<dyn Eval>>;

/// A named eval implementation
#[derive(Debug, Clone, Copy)]
pub struct EvalClass {
    pub name: &'static str,
    pub construct: EvalConstructor,
}

impl EvalClass {
    pub fn instantiate(&self, init: EvalInit) -> SessionResult<Box<dyn Eval>> {
        (self.construct)(init)
    }
}

/// Classes available in every registry
pub fn builtin_classes() -> Vec<EvalClass> {
    vec![MatchEval::CLASS, IncludesEval::CLASS, FuzzyMatchEval::CLASS]
}

fn default_max_tokens() -> u64 {
    500
}

fn completion_params(max_tokens: u64, temperature: f64) -> CompletionParams {
    let mut params = CompletionParams::new();
    params.insert("temperature".to_string(), json!(temperature));
    params.insert("max_tokens".to_string(), json!(max_tokens));
    params
}

/// The sample's `input` field as a prompt
fn prompt_of(sample: &Sample, ctx: &SampleContext<'_>) -> Result<Prompt, GradingError> {
    sample
        .get("input")
        .map(Prompt::from_value)
        .ok_or_else(|| GradingError::MissingField {
            sample_id: ctx.sample_id().to_string(),
            field: "input".to_string(),
        })
}

/// The sample's `ideal` field, a string or a list of strings
fn ideal_of(sample: &Sample, ctx: &SampleContext<'_>) -> Result<Vec<String>, GradingError> {
    let invalid = |message: &str| GradingError::InvalidField {
        sample_id: ctx.sample_id().to_string(),
        field: "ideal".to_string(),
        message: message.to_string(),
    };

    match sample.get("ideal") {
        Some(Value::String(ideal)) => Ok(vec![ideal.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("expected a list of strings"))
            })
            .collect(),
        Some(_) => Err(invalid("expected a string or a list of strings")),
        None => Err(GradingError::MissingField {
            sample_id: ctx.sample_id().to_string(),
            field: "ideal".to_string(),
        }),
    }
}

/// Prompt the completion function and record the sampled text
async fn sample_completion(
    base: &EvalBase,
    prompt: &Prompt,
    params: &CompletionParams,
    ctx: &SampleContext<'_>,
) -> Result<String, GradingError> {
    let result = base.completion_fn().complete(prompt, params).await?;
    let sampled = result
        .first()
        .ok_or(crate::completion::CompletionError::Empty)?
        .to_string();
    ctx.record_sampling(prompt, &sampled);
    Ok(sampled)
}

/// Accuracy and bootstrap deviation over the run's match events
fn accuracy_report(recorder: &Recorder, seed: u64) -> Report {
    let events = recorder.events_of(EventKind::Match);
    let mut rng = StdRng::seed_from_u64(seed);
    Report::new()
        .with("accuracy", accuracy(&events))
        .with("bootstrap_std", bootstrap_std(&events, &mut rng))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use serde_json::{Map, Value};

    use crate::completion::CompletionFn;
    use crate::harness::EvalInit;
    use crate::registry::Registry;

    pub fn init(
        name: &str,
        completion_fn: Arc<dyn CompletionFn>,
        params: Value,
    ) -> EvalInit {
        let params: Map<String, Value> = match params {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        EvalInit {
            completion_fns: vec![completion_fn],
            seed: 20220722,
            name: name.to_string(),
            registry: Arc::new(Registry::builtin().unwrap()),
            max_samples: None,
            params,
        }
    }
}
