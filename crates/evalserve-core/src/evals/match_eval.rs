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

/// Configuration of the `match` eval
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    /// Data file, relative to a registry's `data/` directory
    pub samples_jsonl: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
    #[serde(default)]
    pub temperature: f64,
}

/// Correct when the sampled text starts with one of the ideal answers
pub struct MatchEval {
    base: EvalBase,
    config: MatchConfig,
}

impl MatchEval {
    pub const CLASS: EvalClass = EvalClass {
        name: "match",
        construct: Self::construct,
    };

    pub fn new(init: EvalInit) -> SessionResult<Self> {
        let config = init.config::<MatchConfig>()?;
        Ok(Self {
            base: EvalBase::from_init(&init)?,
            config,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    fn construct(init: EvalInit) -> SessionResult<Box<dyn Eval>> {
        Ok(Box::new(Self::new(init)?))
    }
}

#[async_trait]
impl Eval for MatchEval {
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
            .find(|option| sampled.starts_with(option.as_str()))
            .cloned();

        let mut extra = Map::new();
        extra.insert("sampled".to_string(), json!(sampled));
        extra.insert("options".to_string(), json!(expected));
        ctx.record_match(picked.is_some(), &expected, picked.as_deref(), extra);

        Ok(())
    }

    async fn run(&self, run: &mut EvalRun<'_>) -> SessionResult<Report> {
        let samples = self.base.load_samples(&self.config.samples_jsonl)?;
        run.eval_all_samples(self, samples).await?;
        Ok(accuracy_report(run.recorder(), self.base.seed()))
    }
}
