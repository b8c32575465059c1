use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, json};

use super::{
    EvalClass, completion_params, default_max_tokens, ideal_of, prompt_of, sample_completion,
};
use crate::error::SessionResult;
use crate::harness::{Eval, EvalBase, EvalInit, EvalRun, SampleContext};
use crate::metrics::mean_of;
use crate::recorder::EventKind;
use crate::report::Report;
use crate::sample::Sample;

const ARTICLES: [&str; 3] = ["a", "an", "the"];

/// Configuration of the `fuzzy_match` eval
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FuzzyMatchConfig {
    pub samples_jsonl: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
    #[serde(default)]
    pub temperature: f64,
}

/// Correct when the normalized sampled text and an ideal answer contain
/// one another; also reports token-level F1
pub struct FuzzyMatchEval {
    base: EvalBase,
    config: FuzzyMatchConfig,
}

impl FuzzyMatchEval {
    pub const CLASS: EvalClass = EvalClass {
        name: "fuzzy_match",
        construct: Self::construct,
    };

    pub fn new(init: EvalInit) -> SessionResult<Self> {
        let config = init.config::<FuzzyMatchConfig>()?;
        Ok(Self {
            base: EvalBase::from_init(&init)?,
            config,
        })
    }

    fn construct(init: EvalInit) -> SessionResult<Box<dyn Eval>> {
        Ok(Box::new(Self::new(init)?))
    }
}

/// Lowercase, strip punctuation and articles, collapse whitespace
fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    stripped
        .split_whitespace()
        .filter(|token| !ARTICLES.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn fuzzy_match(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    if a.is_empty() || b.is_empty() {
        return a == b;
    }
    a.contains(&b) || b.contains(&a)
}

/// Token-level F1 between normalized prediction and answer
fn f1_score(prediction: &str, answer: &str) -> f64 {
    let prediction = normalize(prediction);
    let answer = normalize(answer);
    let predicted: Vec<&str> = prediction.split_whitespace().collect();
    let expected: Vec<&str> = answer.split_whitespace().collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in &expected {
        *counts.entry(*token).or_insert(0) += 1;
    }
    let mut common = 0;
    for token in &predicted {
        if let Some(count) = counts.get_mut(token) {
            if *count > 0 {
                *count -= 1;
                common += 1;
            }
        }
    }
    if common == 0 {
        return 0.0;
    }

    let precision = common as f64 / predicted.len() as f64;
    let recall = common as f64 / expected.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

#[async_trait]
impl Eval for FuzzyMatchEval {
    fn base(&self) -> &EvalBase {
        &self.base
    }

    async fn eval_sample(&self, sample: &Sample, ctx: &mut SampleContext<'_>) -> SessionResult<()> {
        let prompt = prompt_of(sample, ctx)?;
        let expected = ideal_of(sample, ctx)?;
        let params = completion_params(self.config.max_tokens, self.config.temperature);

        let sampled = sample_completion(&self.base, &prompt, &params, ctx).await?;
        let picked = expected
            .iter()
            .find(|ideal| fuzzy_match(&sampled, ideal))
            .cloned();
        let f1 = expected
            .iter()
            .map(|ideal| f1_score(&sampled, ideal))
            .fold(0.0, f64::max);

        let mut extra = Map::new();
        extra.insert("sampled".to_string(), json!(sampled));
        ctx.record_match(picked.is_some(), &expected, picked.as_deref(), extra);

        let mut metrics = Map::new();
        metrics.insert("accuracy".to_string(), json!(if picked.is_some() { 1.0 } else { 0.0 }));
        metrics.insert("f1_score".to_string(), json!(f1));
        ctx.record_metrics(metrics);

        Ok(())
    }

    async fn run(&self, run: &mut EvalRun<'_>) -> SessionResult<Report> {
        let samples = self.base.load_samples(&self.config.samples_jsonl)?;
        run.eval_all_samples(self, samples).await?;

        let events = run.recorder().events_of(EventKind::Metrics);
        Ok(Report::new()
            .with("accuracy", mean_of(&events, "accuracy"))
            .with("f1_score", mean_of(&events, "f1_score")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::completion::StubCompletionFn;
    use crate::evals::test_support::init;
    use crate::harness::{ExecutionMode, RunOptions, run_eval};
    use crate::recorder::Recorder;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("The  Quick, brown fox!"), "quick brown fox");
        assert_eq!(normalize("An apple a day"), "apple day");
    }

    #[test]
    fn test_fuzzy_match() {
        assert!(fuzzy_match("It is honey.", "honey"));
        assert!(fuzzy_match("honey", "Honey, of course"));
        assert!(!fuzzy_match("wax", "honey"));
        assert!(fuzzy_match("", "the"));
    }

    #[test]
    fn test_f1_score() {
        assert_eq!(f1_score("george washington", "George Washington"), 1.0);
        assert_eq!(f1_score("john adams", "george washington"), 0.0);
        let partial = f1_score("george", "george washington");
        assert!((partial - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_stub_matches_dummy_answer() {
        let eval = FuzzyMatchEval::new(init(
            "test-fuzzy-match.s1.simple-v0",
            Arc::new(StubCompletionFn::new()),
            json!({"samples_jsonl": "test_fuzzy_match/samples.jsonl"}),
        ))
        .unwrap();

        let recorder = Recorder::detached("run");
        let outcome = run_eval(&eval, &recorder, ExecutionMode::FullBatch, RunOptions::default(), None)
            .await
            .unwrap();

        // "This is a dummy response." contains "a dummy response" after
        // normalization; "honey" does not match
        assert_eq!(outcome.report.get("accuracy").and_then(|v| v.as_f64()), Some(0.5));
        let f1 = outcome.report.get("f1_score").and_then(|v| v.as_f64()).unwrap();
        assert!((f1 - 1.0 / 3.0).abs() < 1e-9);
    }
}
