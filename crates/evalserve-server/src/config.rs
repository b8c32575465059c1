//! Server configuration
//!
//! Loaded in layers: built-in defaults, then an optional TOML file, then
//! `EVALSERVE_*` environment variables. Command-line flags are applied on
//! top by the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use evalserve_core::session::DEFAULT_SEED;
use evalserve_core::EvalSessionArguments;
use serde::{Deserialize, Serialize};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "EVALSERVE_";

/// Configuration of the HTTP service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server listens on
    pub bind_addr: String,
    /// Eval used by `/dataset` when the request names none
    pub default_eval: String,
    /// Registry directories loaded at startup
    pub registry_paths: Vec<PathBuf>,
    pub seed: u64,
    pub max_samples: Option<usize>,
    pub extra_eval_params: String,
    pub user: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            default_eval: "test-match".to_string(),
            registry_paths: Vec::new(),
            seed: DEFAULT_SEED,
            max_samples: None,
            extra_eval_params: String::new(),
            user: String::new(),
        }
    }
}

impl ServerConfig {
    /// Defaults, overlaid with `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Apply `EVALSERVE_*` variables from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(bind_addr) = var("BIND_ADDR") {
            self.bind_addr = bind_addr;
        }
        if let Some(default_eval) = var("DEFAULT_EVAL") {
            self.default_eval = default_eval;
        }
        if let Some(paths) = var("REGISTRY_PATH") {
            self.registry_paths = std::env::split_paths(&paths).collect();
        }
        if let Some(seed) = var("SEED") {
            match seed.parse() {
                Ok(seed) => self.seed = seed,
                Err(e) => tracing::warn!("Ignoring {}SEED={:?}: {}", ENV_PREFIX, seed, e),
            }
        }
        if let Some(max_samples) = var("MAX_SAMPLES") {
            match max_samples.parse() {
                Ok(max_samples) => self.max_samples = Some(max_samples),
                Err(e) => tracing::warn!(
                    "Ignoring {}MAX_SAMPLES={:?}: {}",
                    ENV_PREFIX,
                    max_samples,
                    e
                ),
            }
        }
        if let Some(params) = var("EXTRA_EVAL_PARAMS") {
            self.extra_eval_params = params;
        }
        if let Some(user) = var("USER") {
            self.user = user;
        }
    }

    /// Session arguments for one request against `eval`
    ///
    /// Registry paths are left empty; the service loads them once at startup.
    pub fn session_args(&self, eval: &str) -> EvalSessionArguments {
        let mut args = EvalSessionArguments::new(eval)
            .with_seed(self.seed)
            .with_user(self.user.clone())
            .with_extra_eval_params(self.extra_eval_params.clone());
        args.max_samples = self.max_samples;
        args
    }
}
