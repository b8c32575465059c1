use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::completion::Prompt;
use crate::recorder::Recorder;

/// Per-sample grading context
///
/// Carries the sample id and a random generator seeded from it, and
/// records events under that id.
pub struct SampleContext<'a> {
    recorder: &'a Recorder,
    sample_id: String,
    rng: StdRng,
}

impl<'a> SampleContext<'a> {
    pub fn new(recorder: &'a Recorder, sample_id: String, seed: u64) -> Self {
        let rng = sample_rng(&sample_id, seed);
        Self {
            recorder,
            sample_id,
            rng,
        }
    }

    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    /// Random generator private to this sample
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn recorder(&self) -> &Recorder {
        self.recorder
    }

    pub fn record_sampling(&self, prompt: &Prompt, sampled: &str) {
        self.recorder.record_sampling(&self.sample_id, prompt, sampled);
    }

    pub fn record_match(
        &self,
        correct: bool,
        expected: &[String],
        picked: Option<&str>,
        extra: Map<String, Value>,
    ) {
        self.recorder
            .record_match(&self.sample_id, correct, expected, picked, extra);
    }

    pub fn record_metrics(&self, metrics: Map<String, Value>) {
        self.recorder.record_metrics(&self.sample_id, metrics);
    }
}

/// Generator seeded from the SHA-256 of `"<sample_id>:<seed>"`
fn sample_rng(sample_id: &str, seed: u64) -> StdRng {
    let digest: [u8; 32] = Sha256::digest(format!("{sample_id}:{seed}").as_bytes()).into();
    StdRng::from_seed(digest)
}
