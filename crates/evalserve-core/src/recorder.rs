//! Event recorder
//!
//! Every eval run writes its events (sampled completions, match outcomes,
//! per-sample metrics) to a [`Recorder`]. The recorder is cheap to clone;
//! clones share the same event log. When constructed with a log file it
//! also streams events to disk as JSON lines, starting with the run spec
//! and ending with the final report.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::completion::Prompt;
use crate::error::SessionResult;
use crate::report::{Report, sanitize};
use crate::sample::Sample;
use crate::session::RunSpec;

/// Kind of a recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RawSample,
    Sampling,
    Match,
    Metrics,
}

/// A single recorded event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub run_id: String,
    pub event_id: usize,
    pub sample_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub data: Value,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct RecorderState {
    events: Vec<RecordedEvent>,
    final_report: Option<Report>,
}

struct RecorderInner {
    run_id: String,
    created_by: String,
    run_spec: Option<RunSpec>,
    log_path: Option<PathBuf>,
    state: Mutex<RecorderState>,
}

/// Collects the events of one eval run
#[derive(Clone)]
pub struct Recorder {
    inner: Arc<RecorderInner>,
}

impl Recorder {
    /// In-memory recorder for a run
    pub fn new(run_spec: &RunSpec) -> Self {
        Self::build(run_spec.run_id.clone(), run_spec.created_by.clone(), Some(run_spec.clone()), None)
    }

    /// Recorder that also writes JSON lines to `path`
    ///
    /// The file is truncated and the run spec written as its first line.
    pub fn with_log_file(run_spec: &RunSpec, path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(&path)?;
        writeln!(file, "{}", json!({ "spec": run_spec }))?;
        debug!("Recording run {} to {}", run_spec.run_id, path.display());

        Ok(Self::build(
            run_spec.run_id.clone(),
            run_spec.created_by.clone(),
            Some(run_spec.clone()),
            Some(path),
        ))
    }

    /// Recorder with no run spec and no log file
    pub fn detached(run_id: &str) -> Self {
        Self::build(run_id.to_string(), String::new(), None, None)
    }

    fn build(
        run_id: String,
        created_by: String,
        run_spec: Option<RunSpec>,
        log_path: Option<PathBuf>,
    ) -> Self {
        Self {
            inner: Arc::new(RecorderInner {
                run_id,
                created_by,
                run_spec,
                log_path,
                state: Mutex::new(RecorderState::default()),
            }),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.inner.run_id
    }

    pub fn run_spec(&self) -> Option<&RunSpec> {
        self.inner.run_spec.as_ref()
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.inner.log_path.as_deref()
    }

    /// Append an event
    pub fn record_event(&self, kind: EventKind, sample_id: Option<&str>, data: Value) {
        let mut state = self.inner.state.lock();
        let event = RecordedEvent {
            run_id: self.inner.run_id.clone(),
            event_id: state.events.len(),
            sample_id: sample_id.map(str::to_string),
            kind,
            data,
            created_by: self.inner.created_by.clone(),
            created_at: Utc::now(),
        };

        match serde_json::to_value(&event) {
            Ok(line) => self.append_line(&line),
            Err(e) => warn!("Failed to serialize event: {}", e),
        }
        state.events.push(event);
    }

    /// Record the raw sample before grading
    pub fn record_raw(&self, sample_id: &str, sample: &Sample) {
        self.record_event(EventKind::RawSample, Some(sample_id), sample.clone().into_value());
    }

    /// Record a prompt and the completion sampled for it
    pub fn record_sampling(&self, sample_id: &str, prompt: &Prompt, sampled: &str) {
        self.record_event(
            EventKind::Sampling,
            Some(sample_id),
            json!({ "prompt": prompt.to_value(), "sampled": [sampled] }),
        );
    }

    /// Record a grading outcome
    ///
    /// `extra` fields are merged into the event data.
    pub fn record_match(
        &self,
        sample_id: &str,
        correct: bool,
        expected: &[String],
        picked: Option<&str>,
        extra: Map<String, Value>,
    ) {
        let mut data = Map::new();
        data.insert("correct".to_string(), Value::Bool(correct));
        data.insert("expected".to_string(), json!(expected));
        data.insert("picked".to_string(), json!(picked));
        data.extend(extra);
        self.record_event(EventKind::Match, Some(sample_id), Value::Object(data));
    }

    /// Record per-sample metrics
    pub fn record_metrics(&self, sample_id: &str, metrics: Map<String, Value>) {
        self.record_event(EventKind::Metrics, Some(sample_id), Value::Object(metrics));
    }

    /// Store the final report of the run
    ///
    /// Written to the log file, if any, with NaN metrics removed. A report
    /// that still cannot be serialized is kept in memory only.
    pub fn record_final_report(&self, report: &Report) -> SessionResult<()> {
        if self.inner.log_path.is_some() {
            match sanitize(report).to_json() {
                Ok(value) => self.try_append_line(&json!({ "final_report": value }))?,
                Err(e) => warn!("Final report not written to log: {}", e),
            }
        }
        self.inner.state.lock().final_report = Some(report.clone());
        Ok(())
    }

    pub fn final_report(&self) -> Option<Report> {
        self.inner.state.lock().final_report.clone()
    }

    /// All events, in recording order
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.inner.state.lock().events.clone()
    }

    /// Events of one kind, in recording order
    pub fn events_of(&self, kind: EventKind) -> Vec<RecordedEvent> {
        self.inner
            .state
            .lock()
            .events
            .iter()
            .filter(|event| event.kind == kind)
            .cloned()
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.inner.state.lock().events.len()
    }

    fn append_line(&self, line: &Value) {
        if let Err(e) = self.try_append_line(line) {
            warn!("Failed to write event log: {}", e);
        }
    }

    fn try_append_line(&self, line: &Value) -> std::io::Result<()> {
        let Some(path) = &self.inner.log_path else {
            return Ok(());
        };
        let mut file = OpenOptions::new().append(true).open(path)?;
        writeln!(file, "{line}")
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("run_id", &self.inner.run_id)
            .field("log_path", &self.inner.log_path)
            .field("events", &self.event_count())
            .finish()
    }
}
