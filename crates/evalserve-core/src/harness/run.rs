//! Eval run driver

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use super::{Eval, ExecutionMode, SHUFFLE_SEED, SampleContext};
use crate::error::SessionResult;
use crate::recorder::Recorder;
use crate::report::Report;
use crate::sample::Sample;

/// Progress of a run, reported after each graded sample
#[derive(Debug, Clone)]
pub struct SampleProgress {
    pub current: usize,
    pub total: usize,
    pub sample_id: String,
}

/// Callback invoked with run progress
pub type ProgressCallback = Box<dyn Fn(SampleProgress) + Send + Sync>;

/// Options for an eval run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Log progress at info level instead of debug
    pub show_progress: bool,
    /// Record each raw sample before grading it
    pub record_raw_sample: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            show_progress: true,
            record_raw_sample: true,
        }
    }
}

/// Result of driving an eval
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: Report,
    /// Tagged samples, filled only in collect-only mode
    pub collected: Vec<Sample>,
    /// Number of samples graded
    pub graded: usize,
}

/// A single run of an eval
pub struct EvalRun<'a> {
    recorder: &'a Recorder,
    mode: ExecutionMode,
    options: RunOptions,
    progress: Option<&'a ProgressCallback>,
    collected: Vec<Sample>,
    graded: usize,
}

impl<'a> EvalRun<'a> {
    pub fn new(recorder: &'a Recorder, mode: ExecutionMode) -> Self {
        Self {
            recorder,
            mode,
            options: RunOptions::default(),
            progress: None,
            collected: Vec::new(),
            graded: 0,
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, progress: Option<&'a ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    pub fn recorder(&self) -> &Recorder {
        self.recorder
    }

    pub fn mode(&self) -> &ExecutionMode {
        &self.mode
    }

    /// Process the eval's samples according to the run's mode
    ///
    /// `samples` is the eval's full dataset. In single-sample mode it is
    /// replaced by the supplied sample. The eval's `max_samples` caps how
    /// many samples are visited.
    pub async fn eval_all_samples(&mut self, eval: &dyn Eval, samples: Vec<Sample>) -> SessionResult<()> {
        let samples = match &self.mode {
            ExecutionMode::SingleSample(sample) => vec![sample.clone()],
            _ => samples,
        };

        let work_items = self.work_items(eval, samples);
        let total = work_items.len();
        debug!("Evaluating {} samples of {}", total, eval.name());

        for (position, (idx, sample)) in work_items.into_iter().enumerate() {
            self.visit(eval, idx, sample, position + 1, total).await?;
        }

        Ok(())
    }

    /// Pair samples with their dataset index, shuffled unless collecting,
    /// then cap to `max_samples`
    fn work_items(&self, eval: &dyn Eval, samples: Vec<Sample>) -> Vec<(usize, Sample)> {
        let mut items: Vec<(usize, Sample)> = samples.into_iter().enumerate().collect();

        if !matches!(self.mode, ExecutionMode::CollectOnly { .. }) {
            let mut rng = StdRng::seed_from_u64(SHUFFLE_SEED);
            items.shuffle(&mut rng);
        }
        if let Some(max_samples) = eval.base().max_samples() {
            items.truncate(max_samples);
        }

        items
    }

    async fn visit(
        &mut self,
        eval: &dyn Eval,
        idx: usize,
        sample: Sample,
        position: usize,
        total: usize,
    ) -> SessionResult<()> {
        if let ExecutionMode::CollectOnly { eval: tag } = &self.mode {
            let tagged = sample.tagged("eval", tag);
            self.collected.push(tagged);
            return Ok(());
        }

        let (base, split) = eval.base().base_and_split();
        let sample_id = format!("{base}.{split}.{idx}");

        if self.options.record_raw_sample {
            self.recorder.record_raw(&sample_id, &sample);
        }

        let mut ctx = SampleContext::new(self.recorder, sample_id.clone(), eval.base().seed());
        eval.eval_sample(&sample, &mut ctx).await?;
        self.graded += 1;

        if self.options.show_progress {
            info!("[{}/{}] graded {}", position, total, sample_id);
        } else {
            debug!("[{}/{}] graded {}", position, total, sample_id);
        }
        if let Some(callback) = self.progress {
            callback(SampleProgress {
                current: position,
                total,
                sample_id,
            });
        }

        Ok(())
    }
}

/// Run an eval to completion under the given mode
pub async fn run_eval(
    eval: &dyn Eval,
    recorder: &Recorder,
    mode: ExecutionMode,
    options: RunOptions,
    progress: Option<&ProgressCallback>,
) -> SessionResult<RunOutcome> {
    let mut run = EvalRun::new(recorder, mode)
        .with_options(options)
        .with_progress(progress);

    let report = eval.run(&mut run).await?;

    Ok(RunOutcome {
        report,
        collected: run.collected,
        graded: run.graded,
    })
}
