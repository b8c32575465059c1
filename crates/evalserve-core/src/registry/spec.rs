//! Registry entry types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fully resolved eval registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSpec {
    /// Concrete eval key, `<base>.<split>[.<version>]`
    pub key: String,
    /// Name of the eval class that implements it
    pub class: String,
    /// Constructor arguments from the registry file
    #[serde(default)]
    pub args: Map<String, Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
    /// Registry directory the entry was loaded from, `None` for built-ins
    #[serde(default)]
    pub registry_path: Option<PathBuf>,
}

impl EvalSpec {
    /// First dot-separated component of the key
    pub fn base_eval(&self) -> &str {
        self.key.split('.').next().unwrap_or(&self.key)
    }

    /// Second dot-separated component of the key, if any
    pub fn split(&self) -> Option<&str> {
        self.key.split('.').nth(1)
    }
}

/// One entry of a registry YAML file
///
/// Either an alias (`id`) pointing at another entry, or a concrete eval
/// (`class` plus `args`).
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RegistryEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub args: Map<String, Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
}
