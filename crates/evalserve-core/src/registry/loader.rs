//! Loading registry directories from disk

use std::collections::BTreeMap;
use std::path::Path;

use walkdir::WalkDir;

use super::spec::RegistryEntry;
use crate::error::{SessionError, SessionResult};
use crate::sample::Sample;

/// Load every eval registration under `<registry>/evals`
///
/// Files that fail to parse are skipped with a warning. A missing
/// directory yields no entries.
pub(crate) fn load_registry_dir(registry: &Path) -> Vec<(String, RegistryEntry)> {
    let evals_dir = registry.join("evals");
    let mut entries = Vec::new();

    if !evals_dir.exists() {
        tracing::warn!("Registry path {:?} has no evals directory", registry);
        return entries;
    }

    for entry in WalkDir::new(&evals_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !is_registry_file(path) {
            continue;
        }
        match load_registry_file(path) {
            Ok(parsed) => {
                tracing::debug!("Loaded {} registry entries from {:?}", parsed.len(), path);
                entries.extend(parsed);
            }
            Err(e) => {
                tracing::warn!("Failed to load registry file {:?}: {}", path, e);
            }
        }
    }

    entries
}

fn load_registry_file(path: &Path) -> SessionResult<BTreeMap<String, RegistryEntry>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SessionError::registry_at(format!("failed to read file: {e}"), path))?;
    parse_entries(&content).map_err(|message| SessionError::registry_at(message, path))
}

/// Parse the YAML body of a registry file
pub(crate) fn parse_entries(content: &str) -> Result<BTreeMap<String, RegistryEntry>, String> {
    // An empty file parses as null
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_yaml::from_str(content).map_err(|e| format!("invalid registry YAML: {e}"))
}

/// Parse JSON lines into samples, skipping blank lines
pub(crate) fn parse_samples(content: &str, source: &str) -> SessionResult<Vec<Sample>> {
    let mut samples = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
            SessionError::registry_at(format!("line {}: invalid JSON: {}", line_no + 1, e), source)
        })?;
        let sample = Sample::from_value(value).ok_or_else(|| {
            SessionError::registry_at(
                format!("line {}: sample is not a JSON object", line_no + 1),
                source,
            )
        })?;
        samples.push(sample);
    }

    Ok(samples)
}

fn is_registry_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_samples_skips_blank_lines() {
        let content = "{\"input\": \"a\"}\n\n   \n{\"input\": \"b\"}\n";
        let samples = parse_samples(content, "mem").unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].get("input"), Some(&serde_json::json!("b")));
    }

    #[test]
    fn test_parse_samples_rejects_non_objects() {
        let err = parse_samples("{\"input\": \"a\"}\n[1, 2]\n", "mem").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_registry_dir_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        let evals = dir.path().join("evals").join("nested");
        fs::create_dir_all(&evals).unwrap();
        fs::write(
            evals.join("good.yaml"),
            "mine.dev.v0:\n  class: match\n  args:\n    samples_jsonl: mine.jsonl\n",
        )
        .unwrap();
        fs::write(evals.join("bad.yaml"), "mine: [unclosed").unwrap();
        fs::write(evals.join("notes.txt"), "ignored").unwrap();

        let entries = load_registry_dir(dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "mine.dev.v0");
    }

    #[test]
    fn test_missing_evals_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_registry_dir(dir.path()).is_empty());
    }

    #[test]
    fn test_parse_entries_empty_file() {
        assert!(parse_entries("").unwrap().is_empty());
    }
}
