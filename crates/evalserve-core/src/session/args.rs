//! Session arguments

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default seed for eval runs
pub const DEFAULT_SEED: u64 = 20220722;

/// Arguments for building an eval session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSessionArguments {
    /// Eval name to resolve in the registry
    pub eval: String,

    /// Comma-separated `key=value` pairs passed to the eval class
    #[serde(default)]
    pub extra_eval_params: String,

    /// Cap on the number of samples visited
    #[serde(default)]
    pub max_samples: Option<usize>,

    /// Show per-sample progress; `None` means visible unless capped
    #[serde(default)]
    pub visible: Option<bool>,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Recorded as the creator of every event
    #[serde(default)]
    pub user: String,

    /// Additional registry directories, later ones take precedence
    #[serde(default)]
    pub registry_path: Vec<PathBuf>,

    /// Write recorded events to this JSONL file
    #[serde(default)]
    pub log_to_file: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub local_run: bool,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_true")]
    pub dry_run_logging: bool,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_true() -> bool {
    true
}

impl EvalSessionArguments {
    /// Arguments for `eval` with every other field at its default
    pub fn new(eval: impl Into<String>) -> Self {
        Self {
            eval: eval.into(),
            extra_eval_params: String::new(),
            max_samples: None,
            visible: None,
            seed: DEFAULT_SEED,
            user: String::new(),
            registry_path: Vec::new(),
            log_to_file: None,
            local_run: true,
            dry_run: false,
            dry_run_logging: true,
        }
    }

    pub fn with_extra_eval_params(mut self, params: impl Into<String>) -> Self {
        self.extra_eval_params = params.into();
        self
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = Some(max_samples);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path.push(path.into());
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_to_file = Some(path.into());
        self
    }

    /// Effective visibility: explicit value, else visible when uncapped
    pub fn resolved_visible(&self) -> bool {
        self.visible.unwrap_or(self.max_samples.is_none())
    }
}
