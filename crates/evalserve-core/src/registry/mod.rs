//! Eval registry
//!
//! Maps eval names to [`EvalSpec`]s and class names to constructors.
//!
//! Registrations come from the built-in registry compiled into the crate
//! and from registry directories on disk. A registry directory holds
//! `evals/**/*.yaml` files with the registrations and a `data/` tree with
//! the sample files they reference. Directories added later override
//! earlier ones, both for registrations and for data files.

mod builtin;
mod loader;
mod spec;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub use spec::EvalSpec;
use spec::RegistryEntry;

use crate::error::{SessionError, SessionResult};
use crate::evals::{EvalClass, builtin_classes};
use crate::sample::Sample;

/// Maximum number of alias hops followed when resolving a name
pub const MAX_ALIAS_DEPTH: usize = 8;

#[derive(Debug, Clone)]
struct LoadedEntry {
    entry: RegistryEntry,
    source: Option<PathBuf>,
}

/// Eval registry
#[derive(Debug, Clone)]
pub struct Registry {
    paths: Vec<PathBuf>,
    entries: BTreeMap<String, LoadedEntry>,
    classes: BTreeMap<String, EvalClass>,
}

impl Registry {
    /// Registry with the built-in eval classes and no registrations
    pub fn empty() -> Self {
        let classes = builtin_classes()
            .into_iter()
            .map(|class| (class.name.to_string(), class))
            .collect();
        Self {
            paths: Vec::new(),
            entries: BTreeMap::new(),
            classes,
        }
    }

    /// Registry with the built-in registrations
    pub fn builtin() -> SessionResult<Self> {
        let mut registry = Self::empty();
        for (name, content) in builtin::BUILTIN_EVALS {
            let entries = loader::parse_entries(content)
                .map_err(|message| SessionError::registry(format!("built-in {name}: {message}")))?;
            registry.insert_entries(entries, None);
        }
        Ok(registry)
    }

    /// Built-in registry extended with the given directories
    pub fn with_paths(paths: &[PathBuf]) -> SessionResult<Self> {
        let mut registry = Self::builtin()?;
        registry.add_registry_paths(paths);
        Ok(registry)
    }

    /// Load registrations from additional registry directories
    pub fn add_registry_paths(&mut self, paths: &[PathBuf]) {
        for path in paths {
            let entries = loader::load_registry_dir(path);
            debug!("Registry path {:?}: {} entries", path, entries.len());
            self.insert_entries(entries, Some(path));
            self.paths.push(path.clone());
        }
    }

    fn insert_entries(
        &mut self,
        entries: impl IntoIterator<Item = (String, RegistryEntry)>,
        source: Option<&Path>,
    ) {
        for (name, entry) in entries {
            self.entries.insert(
                name,
                LoadedEntry {
                    entry,
                    source: source.map(Path::to_path_buf),
                },
            );
        }
    }

    /// Registry directories added so far, in order
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Make an eval class available to registrations
    pub fn register_class(&mut self, class: EvalClass) {
        self.classes.insert(class.name.to_string(), class);
    }

    /// Resolve an eval name, following aliases
    ///
    /// An alias's description and metrics fill in whatever the concrete
    /// entry leaves empty.
    pub fn get_eval(&self, name: &str) -> Option<EvalSpec> {
        let mut key = name;
        let mut description: Option<String> = None;
        let mut metrics: Vec<String> = Vec::new();

        for _ in 0..=MAX_ALIAS_DEPTH {
            let loaded = self.entries.get(key)?;
            let entry = &loaded.entry;

            if let Some(target) = &entry.id {
                if description.is_none() {
                    description = entry.description.clone();
                }
                if metrics.is_empty() {
                    metrics = entry.metrics.clone();
                }
                key = target;
                continue;
            }

            let Some(class) = &entry.class else {
                warn!("Registry entry {} has neither id nor class", key);
                return None;
            };

            return Some(EvalSpec {
                key: key.to_string(),
                class: class.clone(),
                args: entry.args.clone(),
                description: entry.description.clone().or(description),
                metrics: if entry.metrics.is_empty() {
                    metrics
                } else {
                    entry.metrics.clone()
                },
                registry_path: loaded.source.clone(),
            });
        }

        warn!("Alias chain for {} exceeds {} hops", name, MAX_ALIAS_DEPTH);
        None
    }

    /// Look up the class implementing an eval
    pub fn get_class(&self, spec: &EvalSpec) -> SessionResult<EvalClass> {
        self.classes.get(&spec.class).copied().ok_or_else(|| {
            SessionError::construction(&spec.key, format!("unknown eval class '{}'", spec.class))
        })
    }

    /// Every registered eval name, aliases included, sorted ascending
    pub fn eval_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Load the samples of a data file
    ///
    /// `relative` is resolved against each registry directory's `data/`
    /// tree, most recently added first, then against the built-in data.
    /// Absolute paths are read directly.
    pub fn load_samples(&self, relative: &str) -> SessionResult<Vec<Sample>> {
        let direct = Path::new(relative);
        if direct.is_absolute() {
            return read_samples(direct);
        }

        for registry in self.paths.iter().rev() {
            let candidate = registry.join("data").join(relative);
            if candidate.is_file() {
                return read_samples(&candidate);
            }
        }

        match builtin::builtin_data(relative) {
            Some(content) => loader::parse_samples(content, relative),
            None => Err(SessionError::registry_at(
                "sample file not found in any registry",
                relative,
            )),
        }
    }
}

fn read_samples(path: &Path) -> SessionResult<Vec<Sample>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SessionError::registry_at(format!("failed to read samples: {e}"), path))?;
    loader::parse_samples(&content, &path.to_string_lossy())
}
