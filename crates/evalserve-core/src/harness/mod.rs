//! Eval harness
//!
//! An [`Eval`] owns its dataset and grading logic. Its `run` method loads
//! samples and hands them to [`EvalRun::eval_all_samples`], which decides
//! what actually happens to them according to the run's
//! [`ExecutionMode`]:
//!
//! - `FullBatch` grades the whole dataset in shuffled order
//! - `SingleSample` ignores the dataset and grades one supplied sample
//! - `CollectOnly` grades nothing and collects tagged copies of the samples
//!
//! Evals are written once against the bulk interface and work unchanged in
//! every mode.

mod context;
mod run;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use context::SampleContext;
pub use run::{EvalRun, ProgressCallback, RunOptions, RunOutcome, SampleProgress, run_eval};

use crate::completion::CompletionFn;
use crate::error::{SessionError, SessionResult};
use crate::registry::Registry;
use crate::report::Report;
use crate::sample::Sample;

/// Seed of the dataset shuffle in full-batch runs
pub const SHUFFLE_SEED: u64 = 123;

/// How an eval run treats the samples it is given
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionMode {
    /// Grade every sample of the dataset
    FullBatch,
    /// Grade exactly this sample instead of the dataset
    SingleSample(Sample),
    /// Collect samples tagged with the requested eval name, grading nothing
    CollectOnly { eval: String },
}

/// Everything an eval class receives at construction
#[derive(Clone)]
pub struct EvalInit {
    pub completion_fns: Vec<Arc<dyn CompletionFn>>,
    pub seed: u64,
    /// Resolved eval key
    pub name: String,
    pub registry: Arc<Registry>,
    pub max_samples: Option<usize>,
    /// Registry args merged with caller-supplied extra parameters
    pub params: Map<String, Value>,
}

impl EvalInit {
    /// Deserialize `params` into an eval's typed configuration
    pub fn config<T: DeserializeOwned>(&self) -> SessionResult<T> {
        serde_json::from_value(Value::Object(self.params.clone()))
            .map_err(|e| SessionError::construction(&self.name, e.to_string()))
    }
}

/// State shared by every eval implementation
#[derive(Clone)]
pub struct EvalBase {
    name: String,
    seed: u64,
    max_samples: Option<usize>,
    registry: Arc<Registry>,
    completion_fn: Arc<dyn CompletionFn>,
}

impl EvalBase {
    /// Take the common fields from an [`EvalInit`]
    ///
    /// Built-in evals expect exactly one completion function.
    pub fn from_init(init: &EvalInit) -> SessionResult<Self> {
        let [completion_fn] = init.completion_fns.as_slice() else {
            return Err(SessionError::construction(
                &init.name,
                format!(
                    "expected exactly 1 completion function, got {}",
                    init.completion_fns.len()
                ),
            ));
        };

        Ok(Self {
            name: init.name.clone(),
            seed: init.seed,
            max_samples: init.max_samples,
            registry: init.registry.clone(),
            completion_fn: completion_fn.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn max_samples(&self) -> Option<usize> {
        self.max_samples
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn completion_fn(&self) -> &dyn CompletionFn {
        self.completion_fn.as_ref()
    }

    /// Dot-separated `(base, split)` of the eval name
    pub fn base_and_split(&self) -> (&str, &str) {
        let mut parts = self.name.split('.');
        let base = parts.next().unwrap_or_default();
        let split = parts.next().unwrap_or_default();
        (base, split)
    }

    /// Load a data file through the registry
    pub fn load_samples(&self, relative: &str) -> SessionResult<Vec<Sample>> {
        self.registry.load_samples(relative)
    }
}

impl std::fmt::Debug for EvalBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalBase")
            .field("name", &self.name)
            .field("seed", &self.seed)
            .field("max_samples", &self.max_samples)
            .finish_non_exhaustive()
    }
}

/// An eval: a dataset plus grading logic
#[async_trait]
pub trait Eval: Send + Sync {
    fn base(&self) -> &EvalBase;

    /// Grade one sample, recording events through `ctx`
    async fn eval_sample(&self, sample: &Sample, ctx: &mut SampleContext<'_>) -> SessionResult<()>;

    /// Load the dataset, pass it to `run.eval_all_samples` and compute
    /// the final report
    async fn run(&self, run: &mut EvalRun<'_>) -> SessionResult<Report>;

    fn name(&self) -> &str {
        self.base().name()
    }
}
