use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, json};

use super::{
    EvalClass, accuracy_report, completion_params, default_max_tokens, ideal_of, prompt_of,
    sample_completion,
};
use crate::error::SessionResult;
use crate::harness::{Eval, EvalBase, EvalInit, EvalRun, SampleContext};
use crate::report::Report;
use crate::sample::Sample;

fn default_ignore_case() -> bool {
    true
}

/// Configuration of the `includes` eval
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludesConfig {
    pub samples_jsonl: String,
    #[serde(default = "default_ignore_case")]
    pub ignore_case: bool,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
    #[serde(default)]
    pub temperature: f64,
}

/// Correct when the sampled text contains one of the ideal answers
pub struct IncludesEval {
    base: EvalBase,
    config: IncludesConfig,
}

impl IncludesEval {
    pub const CLASS: EvalClass = EvalClass {
        name: "includes",
        construct: Self::construct,
    };

    pub fn new(init: EvalInit) -> SessionResult<Self> {
        let config = init.config::<IncludesConfig>()?;
        Ok(Self {
            base: EvalBase::from_init(&init)?,
            config,
        })
    }

    fn construct(init: EvalInit) -> SessionResult<Box<dyn Eval>> {
        Ok(Box::new(Self::new(init)?))
    }
}

fn includes(sampled: &str, ideal: &str, ignore_case: bool) -> bool {
    if ignore_case {
        sampled.to_lowercase().contains(&ideal.to_lowercase())
    } else {
        sampled.contains(ideal)
    }
}

#[async_trait]
impl Eval for IncludesEval {
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
            .find(|ideal| includes(&sampled, ideal, self.config.ignore_case))
            .cloned();

        let mut extra = Map::new();
        extra.insert("sampled".to_string(), json!(sampled));
        ctx.record_match(picked.is_some(), &expected, picked.as_deref(), extra);

        Ok(())
    }

    async fn run(&self, run: &mut EvalRun<'_>) -> SessionResult<Report> {
        let samples = self.base.load_samples(&self.config.samples_jsonl)?;
        run.eval_all_samples(self, samples).await?;
        Ok(accuracy_report(run.recorder(), self.base.seed()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::completion::{CompletionResult, MockCompletionFn};
    use crate::evals::test_support::init;
    use crate::harness::{ExecutionMode, RunOptions, run_eval};
    use crate::recorder::{EventKind, Recorder};

    #[test]
    fn test_includes() {
        assert!(includes("The capital is PARIS.", "Paris", true));
        assert!(!includes("The capital is PARIS.", "Paris", false));
        assert!(!includes("London", "Paris", true));
    }

    #[tokio::test]
    async fn test_full_batch_with_mock() {
        let mut mock = MockCompletionFn::new();
        mock.expect_complete()
            .times(2)
            .returning(|_, _| Ok(CompletionResult::new(vec!["I think it is paris".to_string()])));

        let eval = IncludesEval::new(init(
            "test-includes.s1.simple-v0",
            Arc::new(mock),
            json!({"samples_jsonl": "test_includes/samples.jsonl"}),
        ))
        .unwrap();

        let recorder = Recorder::detached("run");
        let outcome = run_eval(&eval, &recorder, ExecutionMode::FullBatch, RunOptions::default(), None)
            .await
            .unwrap();

        // one of the two samples asks for Paris
        assert_eq!(outcome.report.get("accuracy").and_then(|v| v.as_f64()), Some(0.5));
        let correct: Vec<bool> = recorder
            .events_of(EventKind::Match)
            .iter()
            .map(|e| e.data["correct"].as_bool().unwrap())
            .collect();
        assert_eq!(correct.iter().filter(|c| **c).count(), 1);
    }
}
